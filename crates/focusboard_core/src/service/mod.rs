//! Kanban use-case services.
//!
//! # Responsibility
//! - Validate requests against the current projections before any mutation.
//! - Route cross-entity deletes and session fan-out through one coordinator.
//! - Keep callers decoupled from repository and store details.

pub mod cascade;
pub mod kanban_service;
