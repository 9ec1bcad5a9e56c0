//! Actors as seen by the permission engine, and their stored user records.

use super::{Action, BaseRole, Permission, PermissionKey, Role, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The custom role an actor holds, loaded together with its grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRoleGrant {
    /// Role identifier.
    pub role_id: RoleId,
    /// Role name at load time.
    pub name: String,
    /// Whether the role was active at load time.
    pub is_active: bool,
    /// Granted `(action, resource)` pairs.
    pub permissions: BTreeSet<PermissionKey>,
}

impl CustomRoleGrant {
    /// Builds a grant from a loaded role.
    #[must_use]
    pub fn from_role(role: &Role) -> Self {
        Self {
            role_id: role.id.clone(),
            name: role.name.clone(),
            is_active: role.is_active,
            permissions: role.permissions.iter().map(Permission::key).collect(),
        }
    }

    /// Creates an active grant from explicit keys.
    #[must_use]
    pub fn new(
        role_id: impl Into<RoleId>,
        name: impl Into<String>,
        permissions: impl IntoIterator<Item = PermissionKey>,
    ) -> Self {
        Self {
            role_id: role_id.into(),
            name: name.into(),
            is_active: true,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Returns true if the role is active and grants `(action, resource)`.
    #[must_use]
    pub fn allows(&self, action: Action, resource: &str) -> bool {
        self.is_active && self.permissions.iter().any(|k| k.matches(action, resource))
    }
}

/// The authenticated identity being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User identifier.
    pub id: String,
    /// Mandatory base role.
    pub base_role: BaseRole,
    /// Optional custom role with its grants.
    pub custom_role: Option<CustomRoleGrant>,
    /// Account activity flag. Not consulted by the engine.
    pub is_active: bool,
}

impl Actor {
    /// Creates an active actor without a custom role.
    #[must_use]
    pub fn new(id: impl Into<String>, base_role: BaseRole) -> Self {
        Self {
            id: id.into(),
            base_role,
            custom_role: None,
            is_active: true,
        }
    }

    /// Attaches a custom role.
    #[must_use]
    pub fn with_custom_role(mut self, grant: CustomRoleGrant) -> Self {
        self.custom_role = Some(grant);
        self
    }

    /// Marks the actor inactive.
    #[must_use]
    pub const fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Returns true if the base role is ADMIN.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.base_role, BaseRole::Admin)
    }
}

/// A stored user record.
///
/// `custom_role_id`, when set, always points at an existing role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: String,
    /// Base role.
    pub base_role: BaseRole,
    /// Assigned custom role.
    pub custom_role_id: Option<RoleId>,
    /// Account activity flag.
    pub is_active: bool,
}

impl User {
    /// Creates an active user without a custom role.
    #[must_use]
    pub fn new(id: impl Into<String>, base_role: BaseRole) -> Self {
        Self {
            id: id.into(),
            base_role,
            custom_role_id: None,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_grant_allows_nothing() {
        let mut grant = CustomRoleGrant::new(
            "r-1",
            "menus",
            [PermissionKey::new(Action::ManageMenus, "menus")],
        );
        assert!(grant.allows(Action::ManageMenus, "menus"));

        grant.is_active = false;
        assert!(!grant.allows(Action::ManageMenus, "menus"));
    }

    #[test]
    fn test_actor_is_admin() {
        assert!(Actor::new("a", BaseRole::Admin).is_admin());
        assert!(!Actor::new("e", BaseRole::Editor).is_admin());
    }
}
