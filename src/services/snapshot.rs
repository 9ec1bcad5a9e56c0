//! Serializable permission snapshot for client-side UI gating.
//!
//! A snapshot is captured once per session and shipped to the client, which
//! uses it to hide controls the actor cannot use. It is advisory only: the
//! server still calls [`PermissionEngine::require_permission`] on every
//! mutating request.
//!
//! [`PermissionEngine::require_permission`]: crate::security::PermissionEngine::require_permission

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Action, Actor, BaseRole, CustomRoleGrant, PermissionKey};
use crate::security::{DefaultPermissionMatrix, PermissionEngine, resolve};

/// Everything needed to answer permission questions for one actor offline.
///
/// `is_admin` is always derived from `base_role`; a serialized value is
/// ignored when the snapshot is read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SnapshotRecord")]
pub struct PermissionSnapshot {
    /// Actor identifier.
    pub actor_id: String,
    /// Base role at capture time.
    pub base_role: BaseRole,
    /// Whether the actor is an ADMIN (unconditional access).
    pub is_admin: bool,
    /// Implicit grants of the base role.
    pub default_permissions: BTreeSet<PermissionKey>,
    /// The custom role, when one is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_role: Option<CustomRoleGrant>,
    /// Capture time (Unix epoch seconds).
    pub captured_at: u64,
}

/// Wire form of a snapshot without the derived admin flag.
#[derive(Deserialize)]
struct SnapshotRecord {
    actor_id: String,
    base_role: BaseRole,
    default_permissions: BTreeSet<PermissionKey>,
    #[serde(default)]
    custom_role: Option<CustomRoleGrant>,
    captured_at: u64,
}

impl From<SnapshotRecord> for PermissionSnapshot {
    fn from(record: SnapshotRecord) -> Self {
        Self {
            actor_id: record.actor_id,
            base_role: record.base_role,
            is_admin: record.base_role == BaseRole::Admin,
            default_permissions: record.default_permissions,
            custom_role: record.custom_role,
            captured_at: record.captured_at,
        }
    }
}

impl PermissionSnapshot {
    /// Captures a snapshot of `actor` under `engine`'s default matrix.
    #[must_use]
    pub fn capture(actor: &Actor, engine: &PermissionEngine) -> Self {
        Self {
            actor_id: actor.id.clone(),
            base_role: actor.base_role,
            is_admin: actor.is_admin(),
            default_permissions: engine
                .matrix()
                .permissions_for(actor.base_role)
                .into_iter()
                .collect(),
            custom_role: actor.custom_role.clone(),
            captured_at: crate::current_timestamp(),
        }
    }

    /// Returns true if the captured actor may perform `action` on `resource`.
    ///
    /// Uses the same resolution function as the server-side engine.
    #[must_use]
    pub fn has_permission(&self, action: Action, resource: &str) -> bool {
        let matrix = DefaultPermissionMatrix::empty()
            .with_grants(self.base_role, self.default_permissions.iter().cloned());
        resolve(Some(&self.to_actor()), action, resource, &matrix).is_allowed()
    }

    /// Returns true if at least one pair is allowed. False for an empty list.
    #[must_use]
    pub fn has_any_permission(&self, pairs: &[(Action, &str)]) -> bool {
        pairs
            .iter()
            .any(|(action, resource)| self.has_permission(*action, resource))
    }

    /// Returns true if every pair is allowed. True for an empty list.
    #[must_use]
    pub fn has_all_permissions(&self, pairs: &[(Action, &str)]) -> bool {
        pairs
            .iter()
            .all(|(action, resource)| self.has_permission(*action, resource))
    }

    /// Returns the effective explicit grants: base-role defaults plus an
    /// active custom role. Empty for ADMIN, which needs no list.
    #[must_use]
    pub fn effective_permissions(&self) -> BTreeSet<PermissionKey> {
        if self.base_role == BaseRole::Admin {
            return BTreeSet::new();
        }
        let mut keys = self.default_permissions.clone();
        if let Some(grant) = self.custom_role.as_ref().filter(|g| g.is_active) {
            keys.extend(grant.permissions.iter().cloned());
        }
        keys
    }

    fn to_actor(&self) -> Actor {
        Actor {
            id: self.actor_id.clone(),
            base_role: self.base_role,
            custom_role: self.custom_role.clone(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::resource;

    fn cleaner() -> CustomRoleGrant {
        CustomRoleGrant::new(
            "r-1",
            "media-cleaner",
            [PermissionKey::new(Action::Delete, resource::MEDIA)],
        )
    }

    #[test]
    fn test_snapshot_matches_engine() {
        let engine = PermissionEngine::new();
        let actors = [
            Actor::new("a", BaseRole::Admin),
            Actor::new("e", BaseRole::Editor),
            Actor::new("v", BaseRole::Viewer),
            Actor::new("vc", BaseRole::Viewer).with_custom_role(cleaner()),
        ];

        for actor in &actors {
            let snapshot = PermissionSnapshot::capture(actor, &engine);
            for action in Action::all() {
                for resource in resource::ALL.iter().copied().chain(["unknown"]) {
                    assert_eq!(
                        snapshot.has_permission(*action, resource),
                        engine.has_permission(Some(actor), *action, resource),
                        "{} {action} {resource}",
                        actor.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_snapshot_survives_json() {
        let engine = PermissionEngine::new();
        let actor = Actor::new("vc", BaseRole::Viewer).with_custom_role(cleaner());
        let snapshot = PermissionSnapshot::capture(&actor, &engine);

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: PermissionSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
        assert!(restored.has_permission(Action::Delete, resource::MEDIA));
        assert!(!restored.has_permission(Action::Delete, resource::POSTS));
    }

    #[test]
    fn test_inactive_custom_role_not_effective() {
        let engine = PermissionEngine::new();
        let mut grant = cleaner();
        grant.is_active = false;
        let actor = Actor::new("vc", BaseRole::Viewer).with_custom_role(grant);
        let snapshot = PermissionSnapshot::capture(&actor, &engine);

        assert!(!snapshot.has_permission(Action::Delete, resource::MEDIA));
        assert!(!snapshot
            .effective_permissions()
            .contains(&PermissionKey::new(Action::Delete, resource::MEDIA)));
    }

    #[test]
    fn test_admin_flag_follows_base_role_on_read() {
        let engine = PermissionEngine::new();
        let viewer = PermissionSnapshot::capture(&Actor::new("v", BaseRole::Viewer), &engine);

        let mut value = serde_json::to_value(&viewer).unwrap();
        value["is_admin"] = serde_json::Value::Bool(true);
        let restored: PermissionSnapshot = serde_json::from_value(value).unwrap();
        assert!(!restored.is_admin);
        assert_eq!(restored, viewer);
        assert!(!restored.has_permission(Action::ManageRoles, resource::ROLES));

        let admin = PermissionSnapshot::capture(&Actor::new("a", BaseRole::Admin), &engine);
        let mut value = serde_json::to_value(&admin).unwrap();
        value["is_admin"] = serde_json::Value::Bool(false);
        let restored: PermissionSnapshot = serde_json::from_value(value).unwrap();
        assert!(restored.is_admin);
        assert!(restored.effective_permissions().is_empty());
    }

    #[test]
    fn test_any_all_empty_lists() {
        let viewer = Actor::new("v", BaseRole::Viewer);
        let snapshot = PermissionSnapshot::capture(&viewer, &PermissionEngine::new());
        assert!(!snapshot.has_any_permission(&[]));
        assert!(snapshot.has_all_permissions(&[]));
    }
}
