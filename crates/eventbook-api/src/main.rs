// Eventbook API server
// Decision: permissive CORS, the API is open to any origin
// Schema is created idempotently at startup; no migration step needed

mod events;
mod services;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use eventbook_contracts::*;
use eventbook_storage::Database;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        events::create_event,
        events::list_events,
        events::register_attendee,
        events::cancel_event,
        events::event_stats,
    ),
    components(
        schemas(
            Event, EventCreated, CreateEventRequest,
            RegisterRequest, StatsResponse,
            MessageResponse, ErrorResponse,
        )
    ),
    tags(
        (name = "events", description = "Event and registration endpoints")
    ),
    info(
        title = "Eventbook API",
        version = "0.1.0",
        description = "Event registration API: create events, register attendees against capacity limits, cancel events, and report registration counts",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("eventbook-api starting...");

    // Open the embedded store, creating the file and tables if absent
    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "events.db".to_string());
    let db = Database::open(&database_path)
        .await
        .context("Failed to open database")?;
    tracing::info!(path = %database_path, "Database ready");

    let events_state = events::AppState::new(Arc::new(db));

    let app = Router::new()
        .route("/health", get(health))
        .merge(events::routes(events_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_ok() {
        let app = Router::new().route("/health", get(health));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
    }
}
