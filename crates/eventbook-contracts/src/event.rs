// Event and registration DTOs for the public API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A schedulable activity with a capacity limit and a cancellation flag
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub capacity: i64,
    pub is_cancelled: bool,
}

/// Request to create an event
///
/// Fields are optional at the serde level so that absent values surface
/// as a "Missing fields" validation error rather than a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// RFC 3339 date-time, `YYYY-MM-DDTHH:MM:SS`, or a bare `YYYY-MM-DD`
    /// (taken as midnight UTC). Must be strictly in the future.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

/// Response to a successful event creation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventCreated {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub capacity: i64,
}

/// Query parameters for listing events
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListEventsQuery {
    /// Substring match against the event name. Default matches everything.
    pub search: Option<String>,
    /// Sort field, one of `date` or `name`. Anything else falls back to `name`.
    pub sort: Option<String>,
    /// Page number, 1-based. Non-numeric or non-positive values fall back to 1.
    pub page: Option<String>,
    /// Page size. Non-numeric or non-positive values fall back to 5.
    pub limit: Option<String>,
}

/// Request to register an attendee for an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Registration count for an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub registrations: i64,
}
