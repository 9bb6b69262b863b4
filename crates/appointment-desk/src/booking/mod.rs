//! Appointment booking: admission rules, review lifecycle, and read projections.

pub mod admission;
pub mod clock;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use admission::{AdmissionPolicy, AdmissionRejection, ClockHour};
pub use clock::{BusinessTimezone, Clock, FixedClock, SystemClock};
pub use domain::{
    Appointment, AppointmentId, AppointmentReceipt, AppointmentRequest, AppointmentStatus,
    Decision, UnknownStatus,
};
pub use repository::{AppointmentRepository, InMemoryAppointmentRepository, RepositoryError};
pub use router::appointment_router;
pub use service::{AppointmentService, BookingError, BookingErrorKind};
