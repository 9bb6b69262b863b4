//! Business clock used by admission.
//!
//! The desk runs on a single fixed offset with no daylight saving. Callers pass the
//! current UTC instant in; the [`BusinessTimezone`] turns it into the business wall
//! clock that decides what "today" is.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Fixed offset of the business wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessTimezone {
    offset: FixedOffset,
}

impl BusinessTimezone {
    /// India Standard Time, UTC+05:30.
    pub const IST_OFFSET_MINUTES: i32 = 5 * 60 + 30;

    /// Returns `None` when the offset is not strictly within one day of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Render a UTC instant on the business wall clock.
    pub fn shift(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// Business calendar date for a UTC instant.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.shift(now).date_naive()
    }
}

impl Default for BusinessTimezone {
    fn default() -> Self {
        match Self::from_offset_minutes(Self::IST_OFFSET_MINUTES) {
            Some(timezone) => timezone,
            None => Self { offset: Utc.fix() },
        }
    }
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
