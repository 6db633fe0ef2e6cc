//! Core services for the Admin Auto tooling.
//!
//! This crate owns the REST client used to talk to an Admin Auto backend, the
//! formatting and truncation pipeline shared by every tool response, the
//! declarative relation configuration table and the relation manager that
//! drives link/create/edit/unlink workflows, plus the shared uptime feed.

pub mod api;
pub mod format;
pub mod relations;
pub mod uptime;

pub use api::{ApiError, ApiErrorKind, ApiResult, AutoApiClient, HttpTransport};
