//! Base roles and custom roles.

use super::{Action, Permission, PermissionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The built-in role every actor holds.
///
/// Base roles are not stored as data; their implicit grants live in
/// [`crate::security::DefaultPermissionMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseRole {
    /// Unconditional access to everything.
    Admin,
    /// Content authoring and publishing.
    Editor,
    /// Read-only access to published content.
    Viewer,
}

impl BaseRole {
    /// Returns all base roles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Admin, Self::Editor, Self::Viewer]
    }

    /// Returns the canonical (stored) name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Editor => "EDITOR",
            Self::Viewer => "VIEWER",
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        }
    }

    /// Parses a base role name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" | "ADMINISTRATOR" => Some(Self::Admin),
            "EDITOR" => Some(Self::Editor),
            "VIEWER" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for BaseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BaseRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            crate::Error::Validation(format!(
                "unknown base role: {s}. Expected: admin, editor, or viewer"
            ))
        })
    }
}

/// Unique identifier for a custom role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, time-ordered role ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named, mutable bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier.
    pub id: RoleId,
    /// Unique display name.
    pub name: String,
    /// Optional secondary name shown in admin screens.
    pub display_name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Inactive roles grant nothing.
    pub is_active: bool,
    /// Built-in role; cannot be modified or deleted.
    pub is_system: bool,
    /// Granted permissions, without duplicates, ordered by id.
    pub permissions: Vec<Permission>,
    /// Creation timestamp (Unix epoch seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix epoch seconds).
    pub updated_at: u64,
}

impl Role {
    /// Returns true if this role's permission set contains `(action, resource)`.
    ///
    /// Does not look at `is_active`.
    #[must_use]
    pub fn contains(&self, action: Action, resource: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.action == action && p.resource == resource)
    }

    /// Returns the ids of the granted permissions.
    #[must_use]
    pub fn permission_ids(&self) -> Vec<PermissionId> {
        self.permissions.iter().map(|p| p.id).collect()
    }
}

/// Input for creating a custom role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCreate {
    /// Unique name.
    pub name: String,
    /// Optional secondary name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Catalog permissions to grant.
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

impl RoleCreate {
    /// Creates a request with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the granted permissions.
    #[must_use]
    pub fn with_permissions(mut self, ids: impl IntoIterator<Item = PermissionId>) -> Self {
        self.permission_ids = ids.into_iter().collect();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a custom role's metadata.
///
/// Permissions are changed through the full-replacement operation only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleUpdate {
    /// New unique name.
    #[serde(default)]
    pub name: Option<String>,
    /// New secondary name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Activate or deactivate the role.
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl RoleUpdate {
    /// Returns true if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.display_name.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }
}
