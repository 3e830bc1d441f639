// Event service for business logic
//
// Owns the validation sequence and maps storage rows to public DTOs.
// Capacity and duplicate-email enforcement happen inside the storage
// transaction; this layer handles presence checks, date validation,
// existence, and cancellation gating.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use eventbook_contracts::{
    CreateEventRequest, Event, EventCreated, ListEventsQuery, RegisterRequest,
};
use eventbook_storage::{
    CreateEvent, CreateRegistration, Database, EventFilter, EventRow, EventSort,
    RegistrationInsert,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by event operations.
///
/// The Display strings are the client-facing messages.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Missing fields")]
    MissingFields,

    #[error("Invalid date")]
    InvalidDate,

    #[error("Date must be in the future")]
    DateNotFuture,

    #[error("Event not found")]
    NotFound,

    #[error("Event cancelled")]
    Cancelled,

    #[error("Event full")]
    Full,

    #[error("Duplicate email for this event")]
    DuplicateEmail,

    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

pub struct EventService {
    db: Arc<Database>,
}

impl EventService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateEventRequest) -> Result<EventCreated, EventError> {
        let name = require(req.name)?;
        let raw_date = require(req.date)?;
        let capacity = match req.capacity {
            Some(c) if c > 0 => c,
            _ => return Err(EventError::MissingFields),
        };

        let date = parse_event_date(&raw_date).ok_or(EventError::InvalidDate)?;
        if date <= Utc::now() {
            return Err(EventError::DateNotFuture);
        }

        let row = self
            .db
            .create_event(CreateEvent {
                name,
                date,
                capacity,
            })
            .await?;

        Ok(EventCreated {
            id: row.id,
            name: row.name,
            date: row.date,
            capacity: row.capacity,
        })
    }

    pub async fn list(&self, query: ListEventsQuery) -> Result<Vec<Event>, EventError> {
        let sort = match query.sort.as_deref() {
            Some("date") => EventSort::Date,
            // anything else silently falls back to name ordering
            _ => EventSort::Name,
        };
        let page = parse_positive(query.page.as_deref(), 1);
        let limit = parse_positive(query.limit.as_deref(), 5);

        let rows = self
            .db
            .list_events(EventFilter {
                search: query.search,
                sort,
                limit,
                // saturating: a huge page must land past the end, not wrap
                offset: page.saturating_sub(1).saturating_mul(limit),
            })
            .await?;

        Ok(rows.into_iter().map(row_to_event).collect())
    }

    /// Validation sequence, in order, each short-circuiting:
    /// fields present, event exists, not cancelled, capacity left, email unique.
    pub async fn register(&self, event_id: i64, req: RegisterRequest) -> Result<(), EventError> {
        let name = require(req.name)?;
        let email = require(req.email)?;

        let event = self
            .db
            .get_event(event_id)
            .await?
            .ok_or(EventError::NotFound)?;
        if event.is_cancelled {
            return Err(EventError::Cancelled);
        }

        match self
            .db
            .create_registration(CreateRegistration {
                event_id,
                name,
                email,
            })
            .await?
        {
            RegistrationInsert::Created(_) => Ok(()),
            RegistrationInsert::CapacityReached => Err(EventError::Full),
            RegistrationInsert::DuplicateEmail => Err(EventError::DuplicateEmail),
        }
    }

    /// Unconditional cancellation. An unknown id is a silent no-op.
    pub async fn cancel(&self, event_id: i64) -> Result<(), EventError> {
        self.db.cancel_event(event_id).await?;
        Ok(())
    }

    pub async fn stats(&self, event_id: i64) -> Result<i64, EventError> {
        Ok(self.db.count_registrations(event_id).await?)
    }
}

fn row_to_event(row: EventRow) -> Event {
    Event {
        id: row.id,
        name: row.name,
        date: row.date,
        capacity: row.capacity,
        is_cancelled: row.is_cancelled,
    }
}

/// Presence check: the field must exist and be non-empty.
fn require(field: Option<String>) -> Result<String, EventError> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(EventError::MissingFields),
    }
}

/// Parse a query parameter as a positive integer, falling back to the
/// default on absence, parse failure, or a non-positive value.
fn parse_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC assumed), or a bare
/// `YYYY-MM-DD` taken as midnight UTC.
fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?));
    }
    None
}
