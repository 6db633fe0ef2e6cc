//! MCP tool modules.
//!
//! Tools are grouped by surface: cross-entity search and dashboard counters,
//! application lookup and creation, and read access to the rest of the catalog.

pub mod applications;
pub mod catalog;
pub mod search;
