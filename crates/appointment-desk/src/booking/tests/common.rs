use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use serde_json::Value;

use crate::booking::clock::{BusinessTimezone, FixedClock};
use crate::booking::domain::{Appointment, AppointmentId, AppointmentRequest, AppointmentStatus};
use crate::booking::repository::{
    AppointmentRepository, InMemoryAppointmentRepository, RepositoryError,
};
use crate::booking::{appointment_router, AdmissionPolicy, AppointmentService};

/// 2025-07-21 09:30 on the business clock.
pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 21, 4, 0, 0).unwrap()
}

/// A slot `days_ahead` of the business "today", expressed in the business offset.
pub(super) fn slot(days_ahead: i64, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    let tz = BusinessTimezone::default();
    let date = tz.today(now()) + Duration::days(days_ahead);
    tz.offset()
        .from_local_datetime(&date.and_hms_opt(hour, minute, 0).expect("valid time"))
        .single()
        .expect("fixed offsets are unambiguous")
}

pub(super) fn request(id: &str, time: DateTime<FixedOffset>) -> AppointmentRequest {
    AppointmentRequest {
        id: AppointmentId::from(id),
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        appointment_time: time,
        status: AppointmentStatus::Pending,
    }
}

pub(super) type MemoryService = AppointmentService<InMemoryAppointmentRepository, FixedClock>;

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryAppointmentRepository>) {
    let repository = Arc::new(InMemoryAppointmentRepository::default());
    let service = AppointmentService::new(
        repository.clone(),
        Arc::new(FixedClock(now())),
        AdmissionPolicy::default(),
    );
    (service, repository)
}

pub(super) fn service_with<R: AppointmentRepository + 'static>(
    repository: R,
) -> AppointmentService<R, FixedClock> {
    AppointmentService::new(
        Arc::new(repository),
        Arc::new(FixedClock(now())),
        AdmissionPolicy::default(),
    )
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    appointment_router(Arc::new(service))
}

/// Lookups see an empty store but the insert reports the slot as taken, as when a
/// concurrent booking commits between the pre-check and the write.
pub(super) struct RacedSlotRepository;

impl AppointmentRepository for RacedSlotRepository {
    fn insert(&self, _appointment: Appointment) -> Result<Appointment, RepositoryError> {
        Err(RepositoryError::SlotTaken)
    }

    fn find_by_id(&self, _id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        Ok(None)
    }

    fn find_by_time(
        &self,
        _time: &DateTime<FixedOffset>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        Ok(None)
    }

    fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn list_by_status(
        &self,
        _status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(Vec::new())
    }

    fn update(&self, _appointment: Appointment) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableRepository;

impl AppointmentRepository for UnavailableRepository {
    fn insert(&self, _appointment: Appointment) -> Result<Appointment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_time(
        &self,
        _time: &DateTime<FixedOffset>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_by_status(
        &self,
        _status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _appointment: Appointment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Wraps the memory store and counts writes so tests can assert nothing was mutated.
#[derive(Default)]
pub(super) struct CountingRepository {
    pub(super) inner: InMemoryAppointmentRepository,
    pub(super) writes: Mutex<usize>,
}

impl CountingRepository {
    pub(super) fn writes(&self) -> usize {
        *self.writes.lock().expect("write counter poisoned")
    }

    fn record_write(&self) {
        *self.writes.lock().expect("write counter poisoned") += 1;
    }
}

impl AppointmentRepository for CountingRepository {
    fn insert(&self, appointment: Appointment) -> Result<Appointment, RepositoryError> {
        self.record_write();
        self.inner.insert(appointment)
    }

    fn find_by_id(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        self.inner.find_by_id(id)
    }

    fn find_by_time(
        &self,
        time: &DateTime<FixedOffset>,
    ) -> Result<Option<Appointment>, RepositoryError> {
        self.inner.find_by_time(time)
    }

    fn list_all(&self) -> Result<Vec<Appointment>, RepositoryError> {
        self.inner.list_all()
    }

    fn list_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        self.inner.list_by_status(status)
    }

    fn update(&self, appointment: Appointment) -> Result<(), RepositoryError> {
        self.record_write();
        self.inner.update(appointment)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
