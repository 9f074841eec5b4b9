//! Database gateway: seed schema, tabular models and the per-call SQLite operations.
//!
//! Layout:
//! - `models.rs`: dynamically typed cells, table snapshots and plan reports
//! - `schema.rs`: seed DDL/rows created on first run
//! - `gateway.rs`: bootstrap, query, EXPLAIN and table replacement

pub mod gateway;
pub mod models;
pub mod schema;

pub use gateway::{Gateway, quote_identifier};
pub use models::{CellValue, PlanOutcome, PlanReport, PlanStep, TableSnapshot};
pub use schema::{EDITABLE_TABLES, SQLITE_SEED};
