//! Admission rules for new appointments.
//!
//! A candidate passes four gates in a fixed order, and the first failure is the one
//! reported:
//!
//! 1. the id is not already stored,
//! 2. the slot is not already stored,
//! 3. the requested date falls between today and `window_days` later (inclusive) on the
//!    business clock,
//! 4. the requested time is on the hour within business hours.
//!
//! Date and hour of the requested time are read in the offset the caller sent. Only
//! "today" is taken from the business clock.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Timelike, Utc};

use super::clock::BusinessTimezone;
use super::domain::{Appointment, AppointmentId, AppointmentRequest};
use super::repository::AppointmentRepository;
use super::service::BookingError;
use crate::config::{BookingConfig, ConfigError};

/// Reason a candidate appointment was turned away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionRejection {
    #[error("Appointment with ID {id} already exists")]
    DuplicateId { id: AppointmentId },
    #[error("Appointment time already exists")]
    SlotTaken { time: DateTime<FixedOffset> },
    #[error("Appointment must be for today or within the next {window_days} days only (inclusive of today).")]
    OutOfWindow {
        requested: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
        window_days: u32,
    },
    #[error("Appointment time must be between {opening} and {closing} with 0 minutes (on the hour).")]
    OffHours {
        time: DateTime<FixedOffset>,
        opening: ClockHour,
        closing: ClockHour,
    },
}

impl AdmissionRejection {
    /// Stable machine-readable reason.
    pub const fn code(&self) -> &'static str {
        match self {
            AdmissionRejection::DuplicateId { .. } => "duplicate_id",
            AdmissionRejection::SlotTaken { .. } => "slot_taken",
            AdmissionRejection::OutOfWindow { .. } => "out_of_window",
            AdmissionRejection::OffHours { .. } => "off_hours",
        }
    }

    /// Whether the rejection stems from another stored appointment rather than the schedule.
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            AdmissionRejection::DuplicateId { .. } | AdmissionRejection::SlotTaken { .. }
        )
    }
}

/// Hour of day rendered as a 12-hour clock label, e.g. `9:00 AM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockHour(pub u32);

impl std::fmt::Display for ClockHour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hour = self.0 % 24;
        let meridiem = if hour < 12 { "AM" } else { "PM" };
        let twelve = match hour % 12 {
            0 => 12,
            other => other,
        };
        write!(f, "{twelve}:00 {meridiem}")
    }
}

/// Scheduling window and business hours enforced at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    pub timezone: BusinessTimezone,
    pub window_days: u32,
    pub opening_hour: u32,
    pub closing_hour: u32,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            timezone: BusinessTimezone::default(),
            window_days: BookingConfig::DEFAULT_WINDOW_DAYS,
            opening_hour: BookingConfig::DEFAULT_OPENING_HOUR,
            closing_hour: BookingConfig::DEFAULT_CLOSING_HOUR,
        }
    }
}

impl AdmissionPolicy {
    pub fn from_config(config: &BookingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let timezone = BusinessTimezone::from_offset_minutes(config.utc_offset_minutes).ok_or(
            ConfigError::InvalidBookingSetting {
                key: "BOOKING_UTC_OFFSET_MINUTES",
                value: config.utc_offset_minutes.to_string(),
            },
        )?;

        Ok(Self {
            timezone,
            window_days: config.window_days,
            opening_hour: config.opening_hour,
            closing_hour: config.closing_hour,
        })
    }

    /// Inclusive range of bookable dates on the business clock.
    pub fn window(&self, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
        let today = self.timezone.today(now);
        let latest = today
            .checked_add_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MAX);
        (today, latest)
    }

    /// Window and business-hour checks, without consulting any stored appointments.
    pub fn check_schedule(
        &self,
        time: &DateTime<FixedOffset>,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionRejection> {
        let (earliest, latest) = self.window(now);
        let requested = time.date_naive();
        if !(earliest <= requested && requested <= latest) {
            return Err(AdmissionRejection::OutOfWindow {
                requested,
                earliest,
                latest,
                window_days: self.window_days,
            });
        }

        let within_hours = (self.opening_hour..self.closing_hour).contains(&time.hour());
        if !(within_hours && time.minute() == 0) {
            return Err(AdmissionRejection::OffHours {
                time: *time,
                opening: ClockHour(self.opening_hour),
                closing: ClockHour(self.closing_hour),
            });
        }

        Ok(())
    }

    /// Decide whether `candidate` may be booked, returning the record to persist.
    ///
    /// The store lookups only produce a precise rejection reason; the store's own
    /// insert remains the guard against concurrent bookings of the same slot.
    pub fn admit<R>(
        &self,
        candidate: &AppointmentRequest,
        now: DateTime<Utc>,
        store: &R,
    ) -> Result<Appointment, BookingError>
    where
        R: AppointmentRepository + ?Sized,
    {
        if store.find_by_id(&candidate.id)?.is_some() {
            return Err(AdmissionRejection::DuplicateId {
                id: candidate.id.clone(),
            }
            .into());
        }

        let created_at = self.timezone.shift(now);

        if store.find_by_time(&candidate.appointment_time)?.is_some() {
            return Err(AdmissionRejection::SlotTaken {
                time: candidate.appointment_time,
            }
            .into());
        }

        self.check_schedule(&candidate.appointment_time, now)?;

        Ok(Appointment {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            appointment_time: candidate.appointment_time,
            status: candidate.status,
            created_at,
        })
    }
}
