// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

// ============================================
// Event models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub capacity: i64,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub name: String,
    pub date: DateTime<Utc>,
    pub capacity: i64,
}

/// Sort field for event listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventSort {
    #[default]
    Name,
    Date,
}

/// Filter, ordering, and page window for event listings.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Substring match against the event name. None matches everything.
    pub search: Option<String>,
    pub sort: EventSort,
    pub limit: i64,
    pub offset: i64,
}

// ============================================
// Registration models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRow {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct CreateRegistration {
    pub event_id: i64,
    pub name: String,
    pub email: String,
}

/// Outcome of a checked registration insert.
///
/// Capacity and uniqueness are decided inside the storage transaction,
/// so callers see one of three terminal outcomes rather than racing a
/// separate pre-check against the insert.
#[derive(Debug)]
pub enum RegistrationInsert {
    Created(RegistrationRow),
    CapacityReached,
    DuplicateEmail,
}
