// Public contracts for the Eventbook API
// This crate defines the DTOs shared between the HTTP layer and clients

pub mod common;
pub mod event;

pub use common::*;
pub use event::*;
