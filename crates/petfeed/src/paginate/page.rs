/// One bounded slice of an ordered collection plus continuation metadata.
///
/// `C` is the cursor type, normally the record's primary identifier.
///
/// Invariants upheld by [`crate::Paginator`]:
/// - `items.len() <= limit`
/// - `next_cursor` is the identifier of the last item exactly when
///   `has_more` is `true`
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T, C> {
    items: Vec<T>,
    has_more: bool,
    next_cursor: Option<C>,
}

impl<T, C> Page<T, C> {
    pub(crate) const fn new(items: Vec<T>, has_more: bool, next_cursor: Option<C>) -> Self {
        Self {
            items,
            has_more,
            next_cursor,
        }
    }

    /// A page with no items and nothing after it.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), false, None)
    }

    /// The records on this page, in the order they were walked.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether another page exists in the requested direction.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Cursor to pass back to fetch the next page, if any.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<&C> {
        self.next_cursor.as_ref()
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Converts every item while keeping the continuation metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U, C> {
        Page::new(
            self.items.into_iter().map(f).collect(),
            self.has_more,
            self.next_cursor,
        )
    }

    /// Converts the cursor, e.g. to its string form for transport.
    pub fn map_cursor<D>(self, f: impl FnOnce(C) -> D) -> Page<T, D> {
        Page::new(self.items, self.has_more, self.next_cursor.map(f))
    }
}
