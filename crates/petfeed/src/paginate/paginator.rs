#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, Order, Page, Record, Result, Sort};
use core::cmp::Ordering;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Which side of the cursor to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Continue past the cursor in sort order.
    #[default]
    After,
    /// Walk back from the cursor against sort order.
    Before,
}

/// Parameters for a single [`Paginator::paginate`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest<Id> {
    /// Identifier of the last record the caller has seen.
    pub cursor: Option<Id>,
    /// Side of the cursor to read.
    pub direction: Direction,
    /// Sort keys, primary first. A leading `-` means descending.
    pub sorts: Vec<String>,
    /// Maximum number of items on the page. Must be positive.
    pub limit: i64,
}

impl<Id> Default for PageRequest<Id> {
    fn default() -> Self {
        Self {
            cursor: None,
            direction: Direction::After,
            sorts: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl<Id> PageRequest<Id> {
    /// A first-page request of `limit` items with no sorting.
    #[must_use]
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Resumes from `cursor`.
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<Id>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Reads the given side of the cursor.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Replaces the sort keys.
    #[must_use]
    pub fn with_sorts<I>(mut self, sorts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.sorts = sorts.into_iter().map(Into::into).collect();
        self
    }
}

/// Cursor pagination over an already-filtered record collection.
///
/// Records are ordered by the requested sort keys with the primary identifier
/// appended as a final tie-breaker, so the ordering is total. The cursor is
/// always compared against the identifier: when the primary sort key is
/// descending, "after" means identifiers *below* the cursor, otherwise
/// identifiers *above* it. Pages are therefore only gap-free when the primary
/// sort key is monotonic with the identifier (for example a creation time and
/// a time-ordered id).
///
/// `before` pages are returned in walk order, nearest to the cursor first, so
/// that `next_cursor` keeps walking backwards when passed back with the same
/// direction.
///
/// # Example
///
/// ```
/// use core::cmp::Ordering;
/// use petfeed::{PageRequest, Paginator, Record};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Row(u32);
///
/// impl Record for Row {
///     type Id = u32;
///     const SORT_FIELDS: &'static [&'static str] = &["id"];
///     fn id(&self) -> &u32 { &self.0 }
///     fn cmp_field(&self, other: &Self, _: &str) -> Ordering { self.0.cmp(&other.0) }
/// }
///
/// let rows = (1..=5).map(Row);
/// let page = Paginator::new(rows)
///     .paginate(&PageRequest::new(2).with_sorts(["-id"]))
///     .unwrap();
///
/// assert_eq!(page.items(), &[Row(5), Row(4)]);
/// assert_eq!(page.next_cursor(), Some(&4));
/// ```
#[derive(Clone, Debug)]
pub struct Paginator<R: Record> {
    records: Vec<R>,
}

impl<R: Record> Paginator<R> {
    /// Wraps a base collection. Order does not matter.
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Narrows the base collection further.
    #[must_use]
    pub fn filter(mut self, predicate: impl FnMut(&R) -> bool) -> Self {
        self.records.retain(predicate);
        self
    }

    /// Number of records in the (filtered) base collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the base collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Produces one page.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLimit`] if `request.limit <= 0`.
    /// - [`Error::InvalidSortField`] if a sort key is not in
    ///   [`Record::SORT_FIELDS`].
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "trace",
            skip_all,
            fields(limit = request.limit, direction = ?request.direction, sorts = ?request.sorts)
        )
    )]
    pub fn paginate(self, request: &PageRequest<R::Id>) -> Result<Page<R, R::Id>> {
        let limit = checked_limit(request.limit)?;
        let sorts = Sort::parse_all::<R, _>(&request.sorts)?;
        Ok(self.paginate_sorted(&sorts, request.cursor.as_ref(), request.direction, limit))
    }

    fn paginate_sorted(
        self,
        sorts: &[Sort],
        cursor: Option<&R::Id>,
        direction: Direction,
        limit: usize,
    ) -> Page<R, R::Id> {
        let primary = sorts.first().map_or(Order::Asc, Sort::order);
        let backward = direction == Direction::Before;

        // Identifiers walked in this order sit on this side of the cursor.
        let past = match (primary, backward) {
            (Order::Asc, false) | (Order::Desc, true) => Ordering::Greater,
            (Order::Desc, false) | (Order::Asc, true) => Ordering::Less,
        };

        let mut records = self.records;
        if let Some(cursor) = cursor {
            records.retain(|record| record.id().cmp(cursor) == past);
        }

        let walk = |a: &R, b: &R| {
            let ordering = compare(a, b, sorts, primary);
            if backward { ordering.reverse() } else { ordering }
        };

        // Only the first `limit + 1` records in walk order matter.
        let fetch = limit.saturating_add(1);
        if records.len() > fetch {
            records.select_nth_unstable_by(fetch - 1, walk);
            records.truncate(fetch);
        }
        records.sort_unstable_by(walk);

        let has_more = records.len() > limit;
        records.truncate(limit);
        let next_cursor = if has_more {
            records.last().map(|record| record.id().clone())
        } else {
            None
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(returned = records.len(), has_more, "page assembled");

        Page::new(records, has_more, next_cursor)
    }
}

fn checked_limit(limit: i64) -> Result<usize> {
    if limit <= 0 {
        return Err(Error::InvalidLimit { limit });
    }
    Ok(usize::try_from(limit).unwrap_or(usize::MAX))
}

fn compare<R: Record>(a: &R, b: &R, sorts: &[Sort], primary: Order) -> Ordering {
    sorts
        .iter()
        .map(|sort| sort.order().apply(a.cmp_field(b, sort.field())))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| primary.apply(a.id().cmp(b.id())))
}
