#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DEFAULT_TIMEZONE, Error, IdLookup, SequentialId, TimeSource, local_seconds};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// A stateless, collision-checked generator of [`SequentialId`]s.
///
/// Every call stamps the current second in a fixed timezone and checks the
/// store for sequence `0001`, `0002`, ... until it finds a free slot.
///
/// ## Features
/// - ✅ No in-process state, safe to share between requests and processes
/// - ❌ Not race-free: two callers can observe the same free candidate
///
/// The store's primary-key constraint is the real uniqueness guarantee. When
/// an insert fails with a uniqueness violation the caller should generate a
/// fresh id and retry a bounded number of times.
#[derive(Clone, Debug)]
pub struct SequentialIdGenerator<T>
where
    T: TimeSource,
{
    time: T,
    tz: Tz,
}

impl<T> SequentialIdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator stamping ids in [`DEFAULT_TIMEZONE`].
    ///
    /// # Example
    /// ```
    /// use std::collections::HashSet;
    /// use petfeed::{SequentialId, SequentialIdGenerator, SystemClock};
    ///
    /// let generator = SequentialIdGenerator::new(SystemClock);
    /// let taken: HashSet<SequentialId> = HashSet::new();
    ///
    /// let id = generator.try_next_id(&taken).unwrap();
    /// assert_eq!(id.sequence(), 1);
    /// ```
    pub fn new(time: T) -> Self {
        Self::with_timezone(time, DEFAULT_TIMEZONE)
    }

    /// Creates a generator stamping ids in `tz`.
    pub fn with_timezone(time: T, tz: Tz) -> Self {
        Self { time, tz }
    }

    /// The timezone ids are stamped in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// The time source driving [`Self::try_next_id`].
    pub fn time_source(&self) -> &T {
        &self.time
    }

    /// Generates an id for the current instant of the generator's clock.
    ///
    /// # Errors
    ///
    /// - [`Error::ExhaustedSequence`] if all 9999 sequence numbers of the
    ///   current second are taken.
    /// - [`Error::Lookup`] if the store could not be consulted.
    pub fn try_next_id<P>(&self, lookup: &P) -> Result<SequentialId, Error<P::Err>>
    where
        P: IdLookup + ?Sized,
    {
        self.try_next_id_at(self.time.now(), lookup)
    }

    /// Generates an id for an explicit instant.
    ///
    /// Useful when the caller stamps the record's creation time itself and
    /// wants the id to agree with it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, lookup)))]
    pub fn try_next_id_at<P>(
        &self,
        now: DateTime<Utc>,
        lookup: &P,
    ) -> Result<SequentialId, Error<P::Err>>
    where
        P: IdLookup + ?Sized,
    {
        let mut candidate = SequentialId::first(local_seconds(now, self.tz));

        loop {
            if !lookup.contains_id(&candidate).map_err(Error::Lookup)? {
                return Ok(candidate);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(%candidate, "sequential id already taken");

            candidate = candidate
                .checked_increment()
                .ok_or_else(|| Self::cold_exhausted(&candidate))?;
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_exhausted<E>(last: &SequentialId) -> Error<E> {
        #[cfg(feature = "tracing")]
        tracing::warn!(%last, "sequence space exhausted for this second");

        Error::ExhaustedSequence {
            timestamp: last.timestamp_component(),
        }
    }
}
