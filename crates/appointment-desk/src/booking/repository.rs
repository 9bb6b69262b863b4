use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset, Utc};

use super::domain::{Appointment, AppointmentId, AppointmentStatus};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `insert` is the authoritative uniqueness guard: implementations must reject a
/// record whose id or slot is already stored, atomically with the write.
pub trait AppointmentRepository: Send + Sync {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError>;
    fn find_by_id(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError>;
    fn find_by_time(
        &self,
        time: &DateTime<FixedOffset>,
    ) -> Result<Option<Appointment>, RepositoryError>;
    fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError>;
    fn list_by_status(&self, status: AppointmentStatus)
        -> Result<Vec<Appointment>, RepositoryError>;
    fn update(&self, appointment: Appointment) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("an appointment with this id already exists")]
    DuplicateId,
    #[error("an appointment already occupies this slot")]
    SlotTaken,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct Ledger {
    records: Vec<Appointment>,
    by_id: HashMap<AppointmentId, usize>,
    by_slot: HashMap<DateTime<Utc>, usize>,
}

/// Process-local store keeping appointments in insertion order.
///
/// Slots are keyed by instant, so `10:00+05:30` and `04:30Z` occupy the same slot.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAppointmentRepository {
    ledger: Arc<Mutex<Ledger>>,
}

impl InMemoryAppointmentRepository {
    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, RepositoryError> {
        self.ledger
            .lock()
            .map_err(|_| RepositoryError::Unavailable("appointment ledger poisoned".to_string()))
    }
}

fn slot_key(time: &DateTime<FixedOffset>) -> DateTime<Utc> {
    time.with_timezone(&Utc)
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        let mut ledger = self.ledger()?;
        if ledger.by_id.contains_key(&appointment.id) {
            return Err(RepositoryError::DuplicateId);
        }
        let slot = slot_key(&appointment.appointment_time);
        if ledger.by_slot.contains_key(&slot) {
            return Err(RepositoryError::SlotTaken);
        }

        let position = ledger.records.len();
        ledger.by_id.insert(appointment.id.clone(), position);
        ledger.by_slot.insert(slot, position);
        ledger.records.push(appointment.clone());
        Ok(appointment)
    }

    fn find_by_id(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let ledger = self.ledger()?;
        Ok(ledger
            .by_id
            .get(id)
            .map(|&position| ledger.records[position].clone()))
    }

    fn find_by_time(
        &self,
        time: &DateTime<FixedOffset>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let ledger = self.ledger()?;
        Ok(ledger
            .by_slot
            .get(&slot_key(time))
            .map(|&position| ledger.records[position].clone()))
    }

    fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(self.ledger()?.records.clone())
    }

    fn list_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let ledger = self.ledger()?;
        Ok(ledger
            .records
            .iter()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }

    fn update(&self, appointment: Appointment) -> Result<(), RepositoryError> {
        let mut ledger = self.ledger()?;
        let position = *ledger
            .by_id
            .get(&appointment.id)
            .ok_or(RepositoryError::NotFound)?;
        let stored = &mut ledger.records[position];
        if slot_key(&stored.appointment_time) != slot_key(&appointment.appointment_time) {
            return Err(RepositoryError::Unavailable(
                "appointment slots are immutable once booked".to_string(),
            ));
        }
        *stored = appointment;
        Ok(())
    }
}
