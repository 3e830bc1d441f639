// Event and registration HTTP routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use eventbook_contracts::{
    CreateEventRequest, ErrorResponse, Event, EventCreated, ListEventsQuery, MessageResponse,
    RegisterRequest, StatsResponse,
};
use eventbook_storage::Database;
use std::sync::Arc;

use crate::services::{EventError, EventService};

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EventService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            service: Arc::new(EventService::new(db)),
        }
    }
}

/// Create event routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/events", post(create_event).get(list_events))
        .route("/api/events/{event_id}/register", post(register_attendee))
        .route("/api/events/{event_id}/cancel", post(cancel_event))
        .route("/api/events/{event_id}/stats", get(event_stats))
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map service errors to HTTP responses. Storage failures are logged and
/// hidden behind a generic 500; everything else carries its own message.
fn reject(err: EventError) -> ApiError {
    let (status, message) = match &err {
        EventError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        EventError::Store(e) => {
            tracing::error!("storage failure: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        _ => (StatusCode::BAD_REQUEST, err.to_string()),
    };
    (status, Json(ErrorResponse::new(message)))
}

/// POST /api/events - Create a new event
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event created successfully", body = EventCreated),
        (status = 400, description = "Missing fields or date not in the future", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<EventCreated>, ApiError> {
    let created = state.service.create(req).await.map_err(reject)?;
    Ok(Json(created))
}

/// GET /api/events - List events with search, sort, and pagination
#[utoipa::path(
    get,
    path = "/api/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Matching events, sliced to the requested page", body = Vec<Event>)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.service.list(query).await.map_err(reject)?;
    Ok(Json(events))
}

/// POST /api/events/{event_id}/register - Register an attendee
#[utoipa::path(
    post,
    path = "/api/events/{event_id}/register",
    params(
        ("event_id" = i64, Path, description = "Event ID")
    ),
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered successfully", body = MessageResponse),
        (status = 400, description = "Event cancelled, full, or duplicate email", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn register_attendee(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .service
        .register(event_id, req)
        .await
        .map_err(reject)?;
    Ok(Json(MessageResponse::new("Registered successfully")))
}

/// POST /api/events/{event_id}/cancel - Cancel an event
#[utoipa::path(
    post,
    path = "/api/events/{event_id}/cancel",
    params(
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event cancelled (no-op for unknown ids)", body = MessageResponse)
    ),
    tag = "events"
)]
pub async fn cancel_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.service.cancel(event_id).await.map_err(reject)?;
    Ok(Json(MessageResponse::new("Event cancelled")))
}

/// GET /api/events/{event_id}/stats - Registration count for an event
#[utoipa::path(
    get,
    path = "/api/events/{event_id}/stats",
    params(
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Registration count (zero for unknown ids)", body = StatsResponse)
    ),
    tag = "events"
)]
pub async fn event_stats(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<StatsResponse>, ApiError> {
    let registrations = state.service.stats(event_id).await.map_err(reject)?;
    Ok(Json(StatsResponse { registrations }))
}
