use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Timezone in which post identifiers are stamped unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// A trait for wall-clock time sources.
///
/// This abstraction allows you to plug in the real system clock, or a mocked
/// time source in tests.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, TimeZone, Utc};
/// use petfeed::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> DateTime<Utc> {
///         Utc.with_ymd_and_hms(2025, 1, 1, 3, 0, 0).unwrap()
///     }
/// }
///
/// assert_eq!(FixedTime.now().timestamp(), 1_735_700_400);
/// ```
pub trait TimeSource {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system's wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Converts an instant to the local wall-clock time of `tz`, truncated to
/// whole seconds.
#[must_use]
pub fn local_seconds(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local().trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn local_seconds_shifts_into_zone_and_drops_subseconds() {
        let instant = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 30, 15)
            .unwrap()
            .checked_add_signed(chrono::TimeDelta::milliseconds(987))
            .unwrap();

        let local = local_seconds(instant, DEFAULT_TIMEZONE);
        let expected = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        assert_eq!(local, expected);
    }

    #[test]
    fn shared_clock_delegates() {
        let clock: Arc<dyn TimeSource + Send + Sync> = Arc::new(SystemClock);
        let before = Utc::now();
        let seen = clock.now();
        assert!(seen >= before);
    }
}
