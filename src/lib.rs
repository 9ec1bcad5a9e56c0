//! # Rolegate
//!
//! Authorization and referential-integrity guards for a content platform.
//!
//! Rolegate decides whether an actor may perform an action on a resource and
//! protects the role/permission graph against unsafe mutation (deleting a role
//! that users still hold, editing built-in system roles).
//!
//! ## Layers
//!
//! - **Catalog**: the static set of `(action, resource)` pairs the system knows
//! - **Default matrix**: implicit grants for the EDITOR and VIEWER base roles
//! - **Engine**: pure, I/O-free permission resolution
//! - **Guard**: pre-mutation checks for roles and other referenced entities
//! - **Store**: `SQLite` persistence with transactional permission replacement
//!
//! ## Example
//!
//! ```rust
//! use rolegate::models::{Action, Actor, BaseRole};
//! use rolegate::security::PermissionEngine;
//!
//! let engine = PermissionEngine::new();
//! let editor = Actor::new("u-1", BaseRole::Editor);
//!
//! assert!(engine.has_permission(Some(&editor), Action::Publish, "posts"));
//! assert!(engine.require_permission(Some(&editor), Action::ManageRoles, "roles").is_err());
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;

pub use config::RolegateConfig;
pub use models::{
    Action, Actor, BaseRole, CustomRoleGrant, Permission, PermissionId, PermissionKey, Role,
    RoleCreate, RoleId, RoleUpdate, User,
};
pub use security::{DefaultPermissionMatrix, PermissionCatalog, PermissionEngine, Verdict};
pub use services::{ActorResolver, Authorizer, PermissionSnapshot, RoleService};
pub use storage::{AuthzStore, RoleStore, SqliteAuthzStore, UserStore};

/// Error type for rolegate operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Forbidden` | `require_permission` denies the actor |
/// | `NotFound` | A referenced role or user does not exist |
/// | `DuplicateName` | Another role already holds the requested name |
/// | `SystemRoleProtected` | Updating or deleting a built-in system role |
/// | `RoleInUse` | Deleting a role that users still reference |
/// | `InUse` | Deleting any other entity that still has dependents |
/// | `Validation` | Malformed names, unknown permission ids, bad enum strings |
/// | `OperationFailed` | `SQLite` or filesystem failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The actor lacks the required grant.
    ///
    /// Carries no detail about which rule failed.
    #[error("forbidden")]
    Forbidden,

    /// A referenced entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Entity kind (`role`, `user`).
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A role with this name already exists.
    #[error("a role named '{0}' already exists")]
    DuplicateName(String),

    /// System roles can be neither modified nor deleted.
    #[error("role '{role_id}' is a system role and cannot be modified")]
    SystemRoleProtected {
        /// The protected role.
        role_id: String,
    },

    /// The role is still assigned to users.
    #[error("role '{role_id}' is assigned to {assigned} user(s)")]
    RoleInUse {
        /// The role that was to be deleted.
        role_id: String,
        /// Number of users referencing the role.
        assigned: usize,
    },

    /// A non-role entity still has dependents.
    #[error("{entity} '{id}' still has {dependents} dependent(s)")]
    InUse {
        /// Entity kind (`category`, `tag`, ...).
        entity: &'static str,
        /// The entity that was to be deleted.
        id: String,
        /// Number of dependents found.
        dependents: usize,
    },

    /// Malformed or inconsistent input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statements or transactions fail
    /// - Configuration or log files cannot be read or written
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Stable, copyable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Forbidden`].
    Forbidden,
    /// See [`Error::NotFound`].
    NotFound,
    /// See [`Error::DuplicateName`].
    DuplicateName,
    /// See [`Error::SystemRoleProtected`].
    SystemRoleProtected,
    /// See [`Error::RoleInUse`].
    RoleInUse,
    /// See [`Error::InUse`].
    InUse,
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::OperationFailed`].
    OperationFailed,
}

impl ErrorKind {
    /// Conventional HTTP status for request handlers that expose this error.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::DuplicateName | Self::SystemRoleProtected | Self::RoleInUse | Self::InUse => 409,
            Self::OperationFailed => 500,
        }
    }
}

impl Error {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::SystemRoleProtected { .. } => ErrorKind::SystemRoleProtected,
            Self::RoleInUse { .. } => ErrorKind::RoleInUse,
            Self::InUse { .. } => ErrorKind::InUse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::OperationFailed { .. } => ErrorKind::OperationFailed,
        }
    }

    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for [`Error::OperationFailed`].
    #[must_use]
    pub fn operation(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for rolegate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Forbidden.to_string(), "forbidden");

        let err = Error::not_found("role", "r-1");
        assert_eq!(err.to_string(), "role 'r-1' not found");

        let err = Error::RoleInUse {
            role_id: "r-2".to_string(),
            assigned: 3,
        };
        assert_eq!(err.to_string(), "role 'r-2' is assigned to 3 user(s)");

        let err = Error::operation("open_sqlite", "disk full");
        assert_eq!(err.to_string(), "operation 'open_sqlite' failed: disk full");
    }

    #[test]
    fn test_error_kind_status_mapping() {
        assert_eq!(Error::Forbidden.kind().http_status(), 403);
        assert_eq!(Error::not_found("user", "x").kind().http_status(), 404);
        assert_eq!(Error::Validation("bad".into()).kind().http_status(), 400);
        assert_eq!(
            Error::SystemRoleProtected {
                role_id: "system:viewer".into()
            }
            .kind(),
            ErrorKind::SystemRoleProtected
        );
        assert_eq!(ErrorKind::RoleInUse.http_status(), 409);
        assert_eq!(ErrorKind::OperationFailed.http_status(), 500);
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        assert!(current_timestamp() > 1_600_000_000);
    }
}
