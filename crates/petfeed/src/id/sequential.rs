use crate::{Error, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use core::{fmt, str::FromStr};

/// `strftime` layout of the timestamp component.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of characters in the timestamp component.
pub const TIMESTAMP_LEN: usize = 14;

/// Number of zero-padded digits in the sequence component.
pub const SEQUENCE_DIGITS: usize = 4;

/// Total length of an encoded [`SequentialId`].
pub const SEQUENTIAL_ID_LEN: usize = TIMESTAMP_LEN + SEQUENCE_DIGITS;

/// A time-ordered post identifier: `YYYYMMDDHHMMSS` followed by a 4-digit,
/// zero-padded sequence number starting at `0001`.
///
/// The timestamp is local wall-clock time in the generator's timezone at
/// second granularity. Because both components are fixed width, the derived
/// ordering matches the lexicographic ordering of the encoded strings.
///
/// # Example
///
/// ```
/// use petfeed::SequentialId;
///
/// let id: SequentialId = "202501011200000003".parse().unwrap();
/// assert_eq!(id.sequence(), 3);
/// assert_eq!(id.to_string(), "202501011200000003");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequentialId {
    timestamp: NaiveDateTime,
    sequence: u16,
}

impl SequentialId {
    /// Smallest sequence number handed out within a second.
    pub const MIN_SEQUENCE: u16 = 1;

    /// Largest sequence number that still fits in [`SEQUENCE_DIGITS`] digits.
    pub const MAX_SEQUENCE: u16 = 9999;

    /// The first identifier of the given second.
    ///
    /// Sub-second precision in `timestamp` is discarded.
    #[must_use]
    pub fn first(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp: truncate(timestamp),
            sequence: Self::MIN_SEQUENCE,
        }
    }

    /// Builds an identifier from explicit components.
    ///
    /// Returns `None` if `sequence` is outside
    /// [`Self::MIN_SEQUENCE`]`..=`[`Self::MAX_SEQUENCE`] or the year cannot be
    /// written with four digits.
    #[must_use]
    pub fn from_components(timestamp: NaiveDateTime, sequence: u16) -> Option<Self> {
        if !(Self::MIN_SEQUENCE..=Self::MAX_SEQUENCE).contains(&sequence) {
            return None;
        }
        if !(0..=9999).contains(&timestamp.year()) {
            return None;
        }
        Some(Self {
            timestamp: truncate(timestamp),
            sequence,
        })
    }

    /// The second this identifier was stamped with.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The per-second sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u16 {
        self.sequence
    }

    /// The encoded timestamp component, e.g. `20250101120000`.
    #[must_use]
    pub fn timestamp_component(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Returns `true` if the sequence can be incremented without overflowing
    /// four digits.
    #[must_use]
    pub const fn has_sequence_room(&self) -> bool {
        self.sequence < Self::MAX_SEQUENCE
    }

    /// The next identifier within the same second, or `None` once the
    /// sequence space is exhausted.
    #[must_use]
    pub const fn checked_increment(&self) -> Option<Self> {
        if self.has_sequence_room() {
            Some(Self {
                timestamp: self.timestamp,
                sequence: self.sequence + 1,
            })
        } else {
            None
        }
    }
}

fn truncate(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}

impl fmt::Display for SequentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.sequence,
            width = SEQUENCE_DIGITS
        )
    }
}

impl FromStr for SequentialId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidId {
            input: s.to_owned(),
        };

        if s.len() != SEQUENTIAL_ID_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        // All bytes are ASCII digits, so byte offsets are char boundaries.
        let field = |range: core::ops::Range<usize>| -> Result<u32> {
            s[range].parse().map_err(|_| invalid())
        };

        let year = i32::try_from(field(0..4)?).map_err(|_| invalid())?;
        let timestamp = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)
            .and_then(|date| date.and_hms_opt(field(8..10).ok()?, field(10..12).ok()?, field(12..14).ok()?))
            .ok_or_else(invalid)?;
        let sequence = u16::try_from(field(TIMESTAMP_LEN..SEQUENTIAL_ID_LEN)?).map_err(|_| invalid())?;

        Self::from_components(timestamp, sequence).ok_or_else(invalid)
    }
}

impl TryFrom<&str> for SequentialId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl From<SequentialId> for String {
    fn from(id: SequentialId) -> Self {
        id.to_string()
    }
}
