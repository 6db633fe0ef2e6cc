//! Entity models and REST path helpers for the Admin Auto inventory.
//!
//! This crate defines the canonical data shapes shared by the REST client,
//! the relation manager and the MCP tool layer. It performs no I/O.

pub mod models;
pub mod schema;

pub use models::*;
