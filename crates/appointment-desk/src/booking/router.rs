use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::clock::Clock;
use super::domain::{
    Appointment, AppointmentId, AppointmentReceipt, AppointmentRequest, AppointmentStatus,
    Decision,
};
use super::repository::AppointmentRepository;
use super::service::{AppointmentService, BookingError};

type SharedService<R, C> = Arc<AppointmentService<R, C>>;

/// Router builder exposing the booking endpoints.
pub fn appointment_router<R, C>(service: SharedService<R, C>) -> Router
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/create", post(create_handler::<R, C>))
        .route("/view", get(view_handler::<R, C>))
        .route("/detail/:id", get(detail_handler::<R, C>))
        .route("/accept/:id", put(accept_handler::<R, C>))
        .route("/reject/:id", put(reject_handler::<R, C>))
        .route("/pending", status_route::<R, C>(AppointmentStatus::Pending))
        .route("/approved", status_route::<R, C>(AppointmentStatus::Approved))
        .route("/rejected", status_route::<R, C>(AppointmentStatus::Rejected))
        .with_state(service)
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = match &self {
            BookingError::Rejected(rejection) if rejection.is_conflict() => StatusCode::CONFLICT,
            BookingError::Rejected(_) => StatusCode::BAD_REQUEST,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = json!({
            "error": self.code(),
            "detail": self.public_message(),
        });
        (status, Json(payload)).into_response()
    }
}

pub(crate) async fn create_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    payload: Result<Json<AppointmentRequest>, JsonRejection>,
) -> Response
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_request(rejection),
    };

    match service.create(request) {
        Ok(appointment) => {
            Json(appointment.receipt("Appointment created successfully")).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Malformed bodies still answer with the `{"error", "detail"}` shape.
fn invalid_request(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": "invalid_request",
        "detail": rejection.body_text(),
    });
    (rejection.status(), Json(payload)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewQuery {
    #[serde(default)]
    status: Option<String>,
}

pub(crate) async fn view_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Query(query): Query<ViewQuery>,
) -> Response
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    let status = match query.status.as_deref().map(str::parse::<AppointmentStatus>) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(err)) => {
            let payload = json!({
                "error": "invalid_status",
                "detail": err.to_string(),
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    listing_response(service.list(status))
}

pub(crate) async fn detail_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, BookingError>
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    service.get(&AppointmentId(id)).map(Json)
}

pub(crate) async fn accept_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentReceipt>, BookingError>
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    review(&service, AppointmentId(id), Decision::Approve)
}

pub(crate) async fn reject_handler<R, C>(
    State(service): State<SharedService<R, C>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentReceipt>, BookingError>
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    review(&service, AppointmentId(id), Decision::Reject)
}

fn review<R, C>(
    service: &AppointmentService<R, C>,
    id: AppointmentId,
    decision: Decision,
) -> Result<Json<AppointmentReceipt>, BookingError>
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    let appointment = service.transition(&id, decision)?;
    let message = format!("Appointment {} successfully", decision.past_tense());
    Ok(Json(appointment.receipt(message)))
}

fn status_route<R, C>(status: AppointmentStatus) -> MethodRouter<SharedService<R, C>>
where
    R: AppointmentRepository + 'static,
    C: Clock + 'static,
{
    get(move |State(service): State<SharedService<R, C>>| async move {
        listing_response(service.list(Some(status)))
    })
}

fn listing_response(listed: Result<Vec<Appointment>, BookingError>) -> Response {
    match listed {
        Ok(appointments) => (StatusCode::OK, Json(appointments)).into_response(),
        Err(err) => err.into_response(),
    }
}
