// Repository layer for database operations
//
// Events and registrations live in one SQLite file. The schema is
// created idempotently on open, so a fresh deployment needs no
// migration step.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and ensure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// In-memory database for tests.
    ///
    /// A single connection is required: each SQLite `:memory:` connection
    /// is its own database, so a larger pool would hand out empty ones.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create both tables if absent. Safe to call repeatedly.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date TEXT NOT NULL,
                capacity INTEGER NOT NULL,
                is_cancelled INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS registrations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                UNIQUE (event_id, email),
                FOREIGN KEY (event_id) REFERENCES events (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("database schema ensured");
        Ok(())
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEvent) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (name, date, capacity)
            VALUES ($1, $2, $3)
            RETURNING id, name, date, capacity, is_cancelled
            "#,
        )
        .bind(&input.name)
        // RFC 3339 text keeps lexicographic ORDER BY chronological
        .bind(input.date.to_rfc3339())
        .bind(input.capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: i64) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, name, date, capacity, is_cancelled
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_events(&self, filter: EventFilter) -> Result<Vec<EventRow>> {
        let pattern = format!("%{}%", filter.search.as_deref().unwrap_or(""));

        // ORDER BY cannot take a bind parameter, so each sort field gets
        // its own static query.
        let sql = match filter.sort {
            EventSort::Name => {
                r#"
                SELECT id, name, date, capacity, is_cancelled
                FROM events
                WHERE name LIKE $1
                ORDER BY name ASC
                LIMIT $2 OFFSET $3
                "#
            }
            EventSort::Date => {
                r#"
                SELECT id, name, date, capacity, is_cancelled
                FROM events
                WHERE name LIKE $1
                ORDER BY date ASC
                LIMIT $2 OFFSET $3
                "#
            }
        };

        let rows = sqlx::query_as::<_, EventRow>(sql)
            .bind(pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Flip the cancellation flag. Unknown ids affect zero rows.
    pub async fn cancel_event(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET is_cancelled = 1
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Registrations
    // ============================================

    /// Insert a registration, enforcing capacity and (event_id, email)
    /// uniqueness inside a single transaction.
    ///
    /// The caller is expected to have verified that the event exists and
    /// is not cancelled; an event vanishing between that check and this
    /// call cannot happen because events are never deleted.
    pub async fn create_registration(
        &self,
        input: CreateRegistration,
    ) -> Result<RegistrationInsert> {
        let mut tx = self.pool.begin().await?;

        let capacity: Option<i64> = sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1")
            .bind(input.event_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(capacity) = capacity else {
            anyhow::bail!("event {} does not exist", input.event_id);
        };

        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(input.event_id)
                .fetch_one(&mut *tx)
                .await?;

        if taken >= capacity {
            return Ok(RegistrationInsert::CapacityReached);
        }

        let inserted = sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (event_id, name, email)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, name, email
            "#,
        )
        .bind(input.event_id)
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(RegistrationInsert::Created(row))
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(RegistrationInsert::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count_registrations(&self, event_id: i64) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn future_date() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()
    }

    async fn seed_event(db: &Database, name: &str, capacity: i64) -> EventRow {
        db.create_event(CreateEvent {
            name: name.to_string(),
            date: future_date(),
            capacity,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        // in_memory already ran it once
        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();
    }

    #[tokio::test]
    async fn create_and_get_event() {
        let db = Database::in_memory().await.unwrap();

        let created = seed_event(&db, "Launch", 10).await;
        assert!(created.id > 0);
        assert!(!created.is_cancelled);

        let fetched = db.get_event(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Launch");
        assert_eq!(fetched.date, future_date());
        assert_eq!(fetched.capacity, 10);
    }

    #[tokio::test]
    async fn get_unknown_event_is_none() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.get_event(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_sorts_and_paginates() {
        let db = Database::in_memory().await.unwrap();

        for (name, year) in [("RustConf", 2097), ("Art Fair", 2098), ("DevConf", 2096)] {
            db.create_event(CreateEvent {
                name: name.to_string(),
                date: Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap(),
                capacity: 100,
            })
            .await
            .unwrap();
        }

        // substring filter
        let rows = db
            .list_events(EventFilter {
                search: Some("Conf".to_string()),
                sort: EventSort::Name,
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.name.contains("Conf")));

        // date ordering is ascending
        let rows = db
            .list_events(EventFilter {
                search: None,
                sort: EventSort::Date,
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["DevConf", "RustConf", "Art Fair"]);

        // page window
        let rows = db
            .list_events(EventFilter {
                search: None,
                sort: EventSort::Name,
                limit: 2,
                offset: 2,
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "RustConf");
    }

    #[tokio::test]
    async fn registration_respects_capacity() {
        let db = Database::in_memory().await.unwrap();
        let event = seed_event(&db, "Meetup", 1).await;

        let first = db
            .create_registration(CreateRegistration {
                event_id: event.id,
                name: "A".to_string(),
                email: "a@x.com".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(first, RegistrationInsert::Created(_)));

        let second = db
            .create_registration(CreateRegistration {
                event_id: event.id,
                name: "B".to_string(),
                email: "b@x.com".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(second, RegistrationInsert::CapacityReached));

        assert_eq!(db.count_registrations(event.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_per_event() {
        let db = Database::in_memory().await.unwrap();
        let event = seed_event(&db, "Meetup", 10).await;
        let other = seed_event(&db, "Other", 10).await;

        let input = CreateRegistration {
            event_id: event.id,
            name: "A".to_string(),
            email: "a@x.com".to_string(),
        };

        let first = db.create_registration(input.clone()).await.unwrap();
        assert!(matches!(first, RegistrationInsert::Created(_)));

        let second = db.create_registration(input).await.unwrap();
        assert!(matches!(second, RegistrationInsert::DuplicateEmail));

        // same email on a different event is fine
        let elsewhere = db
            .create_registration(CreateRegistration {
                event_id: other.id,
                name: "A".to_string(),
                email: "a@x.com".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(elsewhere, RegistrationInsert::Created(_)));
    }

    #[tokio::test]
    async fn cancel_event_reports_affected_rows() {
        let db = Database::in_memory().await.unwrap();
        let event = seed_event(&db, "Meetup", 10).await;

        assert!(db.cancel_event(event.id).await.unwrap());
        assert!(db.get_event(event.id).await.unwrap().unwrap().is_cancelled);

        assert!(!db.cancel_event(999).await.unwrap());
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = Database::in_memory().await.unwrap();

        let result =
            sqlx::query("INSERT INTO registrations (event_id, name, email) VALUES (999, 'A', 'a@x.com')")
                .execute(db.pool())
                .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn count_is_zero_for_unknown_event() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.count_registrations(999).await.unwrap(), 0);
    }
}
