//! Authorization core.
//!
//! The static catalog, the default matrix, the resolution engine, and the
//! referential integrity guard.

mod catalog;
pub mod engine;
pub mod guard;
mod matrix;

pub use catalog::{CatalogEntry, PermissionCatalog};
pub use engine::{Grant, PermissionEngine, Verdict, resolve};
pub use guard::{DependentCounter, DependentQuery, RoleAssignments, ensure_no_dependents};
pub use matrix::{DefaultPermissionMatrix, MatrixRow};
