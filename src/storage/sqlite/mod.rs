//! `SQLite` storage backend.
//!
//! ## Module Structure
//!
//! - [`connection`]: lock acquisition and connection configuration
//! - `rows`: schema and row conversion helpers
//! - `metrics`: operation counters and latency histograms
//! - `store`: [`SqliteAuthzStore`], implementing [`RoleStore`](crate::storage::RoleStore)
//!   and [`UserStore`](crate::storage::UserStore)
//!
//! ## Consistency
//!
//! WAL mode lets readers proceed while a writer holds the lock. Grant
//! replacement and role deletion run in `IMMEDIATE` transactions; multi-row
//! reads run in a single deferred transaction so they observe one snapshot.

pub mod connection;
mod metrics;
mod rows;
mod store;

pub use connection::{BUSY_TIMEOUT_MS, acquire_lock, configure_connection};
pub use metrics::record_operation_metrics;
pub use rows::SCHEMA;
pub use store::{SeedReport, SqliteAuthzStore};
