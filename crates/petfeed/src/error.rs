use core::convert::Infallible;

/// A result type that is infallible with respect to the store by default.
///
/// Pagination never touches a store directly, so its errors use the default
/// `E = Infallible`. ID generation surfaces lookup failures through
/// [`Error::Lookup`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `petfeed` can produce.
///
/// The generic parameter `E` is the error type of the store consulted by
/// [`crate::SequentialIdGenerator`]. Callers that never consult a store can
/// ignore it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E = Infallible> {
    /// A requested sort key does not exist on the record type.
    #[error("invalid sort field: `{field}`")]
    InvalidSortField {
        /// The field name as requested, without any `-` prefix.
        field: String,
    },

    /// The page size was zero or negative.
    #[error("invalid limit: {limit} (must be greater than 0)")]
    InvalidLimit {
        /// The rejected limit.
        limit: i64,
    },

    /// Every sequence number for this second is already taken.
    ///
    /// The next second starts a fresh sequence, so this is transient from the
    /// caller's perspective.
    #[error("sequence exhausted for timestamp {timestamp}")]
    ExhaustedSequence {
        /// The `YYYYMMDDHHMMSS` component whose sequence space is full.
        timestamp: String,
    },

    /// A string could not be decoded as a [`crate::SequentialId`].
    #[error("invalid sequential id: `{input}`")]
    InvalidId {
        /// The rejected input.
        input: String,
    },

    /// The backing store failed while probing for an existing id.
    #[error("store lookup failed: {0}")]
    Lookup(#[source] E),
}
