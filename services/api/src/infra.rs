use appointment_desk::booking::{
    AdmissionPolicy, AppointmentService, InMemoryAppointmentRepository, SystemClock,
};
use appointment_desk::config::BookingConfig;
use appointment_desk::config::ConfigError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type DeskService = AppointmentService<InMemoryAppointmentRepository, SystemClock>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the booking service backed by the process-local store and the wall clock.
pub(crate) fn booking_service(config: &BookingConfig) -> Result<Arc<DeskService>, ConfigError> {
    let policy = AdmissionPolicy::from_config(config)?;
    let repository = Arc::new(InMemoryAppointmentRepository::default());
    Ok(Arc::new(AppointmentService::new(
        repository,
        Arc::new(SystemClock),
        policy,
    )))
}
