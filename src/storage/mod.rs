//! Storage layer.
//!
//! Two traits split the persisted state: [`RoleStore`] owns the permission
//! catalog, custom roles and their grants; [`UserStore`] owns users and the
//! consistent [`Actor`](crate::models::Actor) read. [`AuthzStore`] is both.

// Dropping the connection guard slightly earlier buys nothing here.
#![allow(clippy::significant_drop_tightening)]

pub mod sqlite;
mod traits;

pub use sqlite::{SeedReport, SqliteAuthzStore};
pub use traits::{AuthzStore, RoleStore, UserStore};
