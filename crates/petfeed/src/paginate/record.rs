use core::cmp::Ordering;

/// A record that can be sorted and cursored by [`crate::Paginator`].
///
/// # Example
///
/// ```
/// use core::cmp::Ordering;
/// use petfeed::Record;
///
/// struct Comment {
///     comment_id: u64,
///     likes: u32,
/// }
///
/// impl Record for Comment {
///     type Id = u64;
///     const SORT_FIELDS: &'static [&'static str] = &["comment_id", "likes"];
///
///     fn id(&self) -> &u64 {
///         &self.comment_id
///     }
///
///     fn cmp_field(&self, other: &Self, field: &str) -> Ordering {
///         match field {
///             "comment_id" => self.comment_id.cmp(&other.comment_id),
///             "likes" => self.likes.cmp(&other.likes),
///             _ => Ordering::Equal,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Primary identifier, also used as the cursor.
    ///
    /// Identifiers must be unique within a collection; the paginator uses
    /// them as the final tie-breaker to make the ordering total.
    type Id: Ord + Clone;

    /// Field names accepted as sort keys.
    const SORT_FIELDS: &'static [&'static str];

    /// The record's primary identifier.
    fn id(&self) -> &Self::Id;

    /// Compares two records by `field` in ascending order.
    ///
    /// Only ever called with names from [`Self::SORT_FIELDS`].
    fn cmp_field(&self, other: &Self, field: &str) -> Ordering;
}
