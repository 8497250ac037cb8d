use crate::SequentialId;
use core::convert::Infallible;
use std::collections::{BTreeSet, HashSet};

/// Existence check against whatever store will eventually hold the id.
///
/// Implementations must be read-only. A `true` answer only reflects the
/// store at the moment of the call; it does not reserve anything.
pub trait IdLookup {
    /// The error type returned when the store cannot be consulted.
    type Err;

    /// Returns `true` if a record with `id` already exists.
    ///
    /// # Errors
    ///
    /// Returns `Self::Err` if the store could not be read.
    fn contains_id(&self, id: &SequentialId) -> Result<bool, Self::Err>;
}

impl<P: IdLookup + ?Sized> IdLookup for &P {
    type Err = P::Err;

    fn contains_id(&self, id: &SequentialId) -> Result<bool, Self::Err> {
        (**self).contains_id(id)
    }
}

impl<S: core::hash::BuildHasher> IdLookup for HashSet<SequentialId, S> {
    type Err = Infallible;

    fn contains_id(&self, id: &SequentialId) -> Result<bool, Self::Err> {
        Ok(self.contains(id))
    }
}

impl IdLookup for BTreeSet<SequentialId> {
    type Err = Infallible;

    fn contains_id(&self, id: &SequentialId) -> Result<bool, Self::Err> {
        Ok(self.contains(id))
    }
}
