// SQLite storage layer with sqlx
//
// This crate provides the repository for events and registrations:
// - Database: pool owner, schema setup, and all queries

pub mod models;
pub mod repositories;

pub use models::*;
pub use repositories::Database;
