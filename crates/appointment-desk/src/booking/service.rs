use std::sync::Arc;

use tracing::{error, info, warn};

use super::admission::{AdmissionPolicy, AdmissionRejection};
use super::clock::Clock;
use super::domain::{Appointment, AppointmentId, AppointmentRequest, AppointmentStatus, Decision};
use super::repository::{AppointmentRepository, RepositoryError};

/// Service composing the admission policy, the business clock, and the repository.
pub struct AppointmentService<R, C> {
    repository: Arc<R>,
    clock: Arc<C>,
    policy: AdmissionPolicy,
}

impl<R, C> AppointmentService<R, C>
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<C>, policy: AdmissionPolicy) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Admit and persist a new appointment.
    pub fn create(&self, request: AppointmentRequest) -> Result<Appointment, BookingError> {
        let now = self.clock.now();
        let appointment = match self.policy.admit(&request, now, self.repository.as_ref()) {
            Ok(appointment) => appointment,
            Err(BookingError::Rejected(rejection)) => {
                warn!(
                    appointment_id = %request.id,
                    appointment_time = %request.appointment_time,
                    reason = rejection.code(),
                    "appointment rejected at admission"
                );
                return Err(rejection.into());
            }
            Err(other) => return Err(self.log_failure(other)),
        };

        match self.repository.insert(appointment) {
            Ok(stored) => {
                info!(
                    appointment_id = %stored.id,
                    appointment_time = %stored.appointment_time,
                    status = stored.status.label(),
                    "appointment booked"
                );
                Ok(stored)
            }
            Err(RepositoryError::DuplicateId) => {
                warn!(appointment_id = %request.id, "lost id race at insert");
                Err(AdmissionRejection::DuplicateId { id: request.id }.into())
            }
            Err(RepositoryError::SlotTaken) => {
                warn!(appointment_time = %request.appointment_time, "lost slot race at insert");
                Err(AdmissionRejection::SlotTaken {
                    time: request.appointment_time,
                }
                .into())
            }
            Err(other) => Err(self.log_failure(other.into())),
        }
    }

    pub fn accept(&self, id: &AppointmentId) -> Result<Appointment, BookingError> {
        self.transition(id, Decision::Approve)
    }

    pub fn reject(&self, id: &AppointmentId) -> Result<Appointment, BookingError> {
        self.transition(id, Decision::Reject)
    }

    /// Apply a review decision. The current status is not consulted, so a decided
    /// appointment can be flipped by a later decision.
    pub fn transition(
        &self,
        id: &AppointmentId,
        decision: Decision,
    ) -> Result<Appointment, BookingError> {
        let mut appointment = self
            .repository
            .find_by_id(id)
            .map_err(|err| self.log_failure(err.into()))?
            .ok_or_else(|| BookingError::NotFound(id.clone()))?;

        let previous = appointment.status;
        let target = decision.target_status();
        if previous != AppointmentStatus::Pending && previous != target {
            warn!(
                appointment_id = %id,
                from = previous.label(),
                to = target.label(),
                "overwriting an earlier review decision"
            );
        }

        appointment.status = target;
        match self.repository.update(appointment.clone()) {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(BookingError::NotFound(id.clone())),
            Err(other) => return Err(self.log_failure(other.into())),
        }

        info!(
            appointment_id = %id,
            status = target.label(),
            "appointment {}",
            decision.past_tense()
        );
        Ok(appointment)
    }

    pub fn get(&self, id: &AppointmentId) -> Result<Appointment, BookingError> {
        self.repository
            .find_by_id(id)
            .map_err(|err| self.log_failure(err.into()))?
            .ok_or_else(|| BookingError::NotFound(id.clone()))
    }

    /// List appointments in store order, optionally restricted to one status.
    pub fn list(&self, status: Option<AppointmentStatus>) -> Result<Vec<Appointment>, BookingError> {
        let listed = match status {
            Some(status) => self.repository.list_by_status(status),
            None => self.repository.list_all(),
        };
        listed.map_err(|err| self.log_failure(err.into()))
    }

    fn log_failure(&self, err: BookingError) -> BookingError {
        if let BookingError::Store(source) = &err {
            error!(error = %source, "appointment store failure");
        }
        err
    }
}

/// Error kinds surfaced to callers of the booking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingErrorKind {
    DuplicateId,
    SlotTaken,
    OutOfWindow,
    OffHours,
    NotFound,
    StoreFailure,
}

impl BookingErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            BookingErrorKind::DuplicateId => "duplicate_id",
            BookingErrorKind::SlotTaken => "slot_taken",
            BookingErrorKind::OutOfWindow => "out_of_window",
            BookingErrorKind::OffHours => "off_hours",
            BookingErrorKind::NotFound => "not_found",
            BookingErrorKind::StoreFailure => "store_failure",
        }
    }
}

/// Error raised by the booking service.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Rejected(#[from] AdmissionRejection),
    #[error("No appointment found with this id")]
    NotFound(AppointmentId),
    #[error("appointment store failure: {0}")]
    Store(#[from] RepositoryError),
}

impl BookingError {
    pub fn kind(&self) -> BookingErrorKind {
        match self {
            BookingError::Rejected(AdmissionRejection::DuplicateId { .. }) => {
                BookingErrorKind::DuplicateId
            }
            BookingError::Rejected(AdmissionRejection::SlotTaken { .. }) => {
                BookingErrorKind::SlotTaken
            }
            BookingError::Rejected(AdmissionRejection::OutOfWindow { .. }) => {
                BookingErrorKind::OutOfWindow
            }
            BookingError::Rejected(AdmissionRejection::OffHours { .. }) => {
                BookingErrorKind::OffHours
            }
            BookingError::NotFound(_) => BookingErrorKind::NotFound,
            BookingError::Store(_) => BookingErrorKind::StoreFailure,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Message safe to show to API callers; store internals are not exposed.
    pub fn public_message(&self) -> String {
        match self {
            BookingError::Store(_) => "The appointment store is unavailable, try again later".to_string(),
            other => other.to_string(),
        }
    }
}
