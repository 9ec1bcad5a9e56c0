//! Permission records and lookup keys.

use super::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage identifier of a catalog permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(pub i64);

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `(action, resource)` pair a permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Granted action.
    pub action: Action,
    /// Resource class the action applies to.
    pub resource: String,
}

impl PermissionKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(action: Action, resource: impl Into<String>) -> Self {
        Self {
            action,
            resource: resource.into(),
        }
    }

    /// Returns true if this key is exactly `(action, resource)`.
    ///
    /// No wildcard or prefix matching is performed.
    #[must_use]
    pub fn matches(&self, action: Action, resource: &str) -> bool {
        self.action == action && self.resource == resource
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.action, self.resource)
    }
}

/// A grantable capability from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Storage identifier.
    pub id: PermissionId,
    /// Granted action.
    pub action: Action,
    /// Resource class.
    pub resource: String,
    /// Human-readable description.
    pub description: String,
}

impl Permission {
    /// Returns the lookup key of this permission.
    #[must_use]
    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(self.action, self.resource.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches_exactly() {
        let key = PermissionKey::new(Action::Read, "posts");
        assert!(key.matches(Action::Read, "posts"));
        assert!(!key.matches(Action::Read, "post"));
        assert!(!key.matches(Action::Update, "posts"));
    }

    #[test]
    fn test_key_display() {
        let key = PermissionKey::new(Action::ManageMenus, "menus");
        assert_eq!(key.to_string(), "MANAGE_MENUS:menus");
    }
}
