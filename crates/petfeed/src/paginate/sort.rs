use crate::{Error, Record, Result};
use core::{cmp::Ordering, fmt};

/// Direction of a single sort key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl Order {
    /// Orients an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A validated sort key: a field of some [`Record`] type plus an [`Order`].
///
/// Parsed from the textual form used by query strings, where a leading `-`
/// selects descending order: `"created_at"`, `"-post_id"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sort {
    field: &'static str,
    order: Order,
}

impl Sort {
    /// Ascending sort on a known field.
    #[must_use]
    pub const fn asc(field: &'static str) -> Self {
        Self {
            field,
            order: Order::Asc,
        }
    }

    /// Descending sort on a known field.
    #[must_use]
    pub const fn desc(field: &'static str) -> Self {
        Self {
            field,
            order: Order::Desc,
        }
    }

    /// Parses `key` and checks the field against `R::SORT_FIELDS`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSortField`] if the field is not sortable on `R`.
    pub fn parse<R: Record>(key: &str) -> Result<Self> {
        let key = key.trim();
        let (name, order) = match key.strip_prefix('-') {
            Some(name) => (name, Order::Desc),
            None => (key, Order::Asc),
        };

        R::SORT_FIELDS
            .iter()
            .copied()
            .find(|field| *field == name)
            .map(|field| Self { field, order })
            .ok_or_else(|| Error::InvalidSortField {
                field: name.to_owned(),
            })
    }

    /// Parses every key in order, failing on the first unknown field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSortField`] for the first unknown field.
    pub fn parse_all<R, I>(keys: I) -> Result<Vec<Self>>
    where
        R: Record,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        keys
            .into_iter()
            .map(|key| Self::parse::<R>(key.as_ref()))
            .collect()
    }

    /// The sorted field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// The sort direction.
    #[must_use]
    pub const fn order(&self) -> Order {
        self.order
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            Order::Asc => f.write_str(self.field),
            Order::Desc => write!(f, "-{}", self.field),
        }
    }
}
