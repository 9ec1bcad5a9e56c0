//! Default permission matrix.
//!
//! Implicit grants for each base role, consulted when an actor has no
//! custom role or the custom role does not grant the requested pair.
//!
//! | Base role | Implicit grants |
//! |-----------|-----------------|
//! | `ADMIN` | none listed; the engine bypasses the matrix |
//! | `EDITOR` | CREATE/READ/UPDATE/DELETE/PUBLISH posts, READ categories and tags, CREATE/READ/DELETE media |
//! | `VIEWER` | READ posts, categories, tags, media |

use crate::models::resource::{CATEGORIES, MEDIA, POSTS, TAGS};
use crate::models::{Action, BaseRole, PermissionKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Mapping of base roles to their implicit permission sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPermissionMatrix {
    role_permissions: HashMap<BaseRole, BTreeSet<PermissionKey>>,
}

impl Default for DefaultPermissionMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl DefaultPermissionMatrix {
    /// Creates the compiled-in matrix.
    #[must_use]
    pub fn standard() -> Self {
        let mut role_permissions = HashMap::new();

        // Editor: full post lifecycle, read taxonomy, manage own uploads
        role_permissions.insert(
            BaseRole::Editor,
            [
                (Action::Create, POSTS),
                (Action::Read, POSTS),
                (Action::Update, POSTS),
                (Action::Delete, POSTS),
                (Action::Publish, POSTS),
                (Action::Read, CATEGORIES),
                (Action::Read, TAGS),
                (Action::Create, MEDIA),
                (Action::Read, MEDIA),
                (Action::Delete, MEDIA),
            ]
            .into_iter()
            .map(|(action, resource)| PermissionKey::new(action, resource))
            .collect(),
        );

        // Viewer: read only
        role_permissions.insert(
            BaseRole::Viewer,
            [POSTS, CATEGORIES, TAGS, MEDIA]
                .into_iter()
                .map(|resource| PermissionKey::new(Action::Read, resource))
                .collect(),
        );

        Self { role_permissions }
    }

    /// Creates a matrix with no implicit grants.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            role_permissions: HashMap::new(),
        }
    }

    /// Returns true if `role`'s implicit list contains `(action, resource)`.
    #[must_use]
    pub fn allows(&self, role: BaseRole, action: Action, resource: &str) -> bool {
        self.role_permissions
            .get(&role)
            .is_some_and(|perms| perms.iter().any(|k| k.matches(action, resource)))
    }

    /// Returns the implicit grants of a role, ordered.
    #[must_use]
    pub fn permissions_for(&self, role: BaseRole) -> Vec<PermissionKey> {
        self.role_permissions
            .get(&role)
            .map_or_else(Vec::new, |perms| perms.iter().cloned().collect())
    }

    /// Returns all base roles whose implicit list contains the pair.
    #[must_use]
    pub fn roles_with_permission(&self, action: Action, resource: &str) -> Vec<BaseRole> {
        BaseRole::all()
            .iter()
            .copied()
            .filter(|role| self.allows(*role, action, resource))
            .collect()
    }

    /// Adds an implicit grant to a base role.
    pub fn grant(&mut self, role: BaseRole, key: PermissionKey) {
        self.role_permissions.entry(role).or_default().insert(key);
    }

    /// Removes an implicit grant from a base role.
    pub fn revoke(&mut self, role: BaseRole, key: &PermissionKey) {
        if let Some(perms) = self.role_permissions.get_mut(&role) {
            perms.remove(key);
        }
    }

    /// Builder-style [`grant`](Self::grant) for many keys.
    #[must_use]
    pub fn with_grants(
        mut self,
        role: BaseRole,
        keys: impl IntoIterator<Item = PermissionKey>,
    ) -> Self {
        for key in keys {
            self.grant(role, key);
        }
        self
    }

    /// Returns a summary of every base role's implicit grants.
    #[must_use]
    pub fn summary(&self) -> Vec<MatrixRow> {
        BaseRole::all()
            .iter()
            .map(|role| {
                let permissions = self.permissions_for(*role);
                MatrixRow {
                    role: *role,
                    unrestricted: matches!(role, BaseRole::Admin),
                    permission_count: permissions.len(),
                    permissions,
                }
            })
            .collect()
    }
}

/// One base role's implicit grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixRow {
    /// The base role.
    pub role: BaseRole,
    /// True for ADMIN, which is never filtered through the matrix.
    pub unrestricted: bool,
    /// Number of listed grants.
    pub permission_count: usize,
    /// Listed grants.
    pub permissions: Vec<PermissionKey>,
}
