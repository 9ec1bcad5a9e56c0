//! Permission resolution engine.
//!
//! Resolution order, short-circuiting:
//!
//! 1. No actor: deny.
//! 2. Base role `ADMIN`: allow, nothing else is consulted.
//! 3. Active custom role granting `(action, resource)`: allow.
//! 4. Default matrix entry for the base role: allow.
//! 5. Otherwise deny.
//!
//! Steps 3 and 4 are independent alternatives: a custom role adds to the
//! base-role defaults, it never replaces them.
//!
//! The engine performs no I/O. Actors are loaded by
//! [`crate::services::ActorResolver`] beforehand.

use super::DefaultPermissionMatrix;
use crate::models::{Action, Actor};
use crate::{Error, Result};

/// Which rule produced an allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grant {
    /// Base role `ADMIN`.
    AdminBypass,
    /// The actor's active custom role.
    CustomRole,
    /// The base role's default matrix entry.
    BaseRoleDefault,
}

impl Grant {
    /// Returns a short label for logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdminBypass => "admin_bypass",
            Self::CustomRole => "custom_role",
            Self::BaseRoleDefault => "base_role_default",
        }
    }
}

/// Outcome of a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Access granted by the given rule.
    Allow(Grant),
    /// Access denied.
    Deny,
}

impl Verdict {
    /// Returns true if access was granted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    /// Returns true if access was denied.
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Deny)
    }

    /// Returns a short label for logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Allow(grant) => grant.as_str(),
            Self::Deny => "deny",
        }
    }
}

/// Resolves one `(action, resource)` request for an optional actor.
///
/// This is the single implementation of the resolution order; the engine
/// and [`crate::services::PermissionSnapshot`] both call it.
#[must_use]
pub fn resolve(
    actor: Option<&Actor>,
    action: Action,
    resource: &str,
    matrix: &DefaultPermissionMatrix,
) -> Verdict {
    let Some(actor) = actor else {
        return Verdict::Deny;
    };

    if actor.is_admin() {
        return Verdict::Allow(Grant::AdminBypass);
    }

    if actor
        .custom_role
        .as_ref()
        .is_some_and(|grant| grant.allows(action, resource))
    {
        return Verdict::Allow(Grant::CustomRole);
    }

    if matrix.allows(actor.base_role, action, resource) {
        return Verdict::Allow(Grant::BaseRoleDefault);
    }

    Verdict::Deny
}

/// Stateless permission checker.
///
/// Holds only the (immutable) default matrix, so one instance can be shared
/// across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct PermissionEngine {
    matrix: DefaultPermissionMatrix,
}

impl PermissionEngine {
    /// Creates an engine with the standard default matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom default matrix.
    #[must_use]
    pub const fn with_matrix(matrix: DefaultPermissionMatrix) -> Self {
        Self { matrix }
    }

    /// Returns the default matrix.
    #[must_use]
    pub const fn matrix(&self) -> &DefaultPermissionMatrix {
        &self.matrix
    }

    /// Resolves a request and reports which rule decided it.
    #[must_use]
    pub fn evaluate(&self, actor: Option<&Actor>, action: Action, resource: &str) -> Verdict {
        let verdict = resolve(actor, action, resource, &self.matrix);
        metrics::counter!("authz_decisions_total", "verdict" => verdict.label()).increment(1);
        tracing::trace!(
            actor.id = actor.map(|a| a.id.as_str()),
            action = %action,
            resource,
            verdict = verdict.label(),
            "Resolved permission"
        );
        verdict
    }

    /// Returns true if the actor may perform `action` on `resource`.
    #[must_use]
    pub fn has_permission(&self, actor: Option<&Actor>, action: Action, resource: &str) -> bool {
        self.evaluate(actor, action, resource).is_allowed()
    }

    /// Returns true if at least one pair is allowed. False for an empty list.
    #[must_use]
    pub fn has_any_permission(&self, actor: Option<&Actor>, pairs: &[(Action, &str)]) -> bool {
        pairs
            .iter()
            .any(|(action, resource)| self.has_permission(actor, *action, resource))
    }

    /// Returns true if every pair is allowed. True for an empty list.
    #[must_use]
    pub fn has_all_permissions(&self, actor: Option<&Actor>, pairs: &[(Action, &str)]) -> bool {
        pairs
            .iter()
            .all(|(action, resource)| self.has_permission(actor, *action, resource))
    }

    /// Fails with [`Error::Forbidden`] unless the actor is allowed.
    pub fn require_permission(
        &self,
        actor: Option<&Actor>,
        action: Action,
        resource: &str,
    ) -> Result<()> {
        if self.has_permission(actor, action, resource) {
            return Ok(());
        }
        tracing::debug!(
            actor.id = actor.map(|a| a.id.as_str()),
            action = %action,
            resource,
            "Permission denied"
        );
        Err(Error::Forbidden)
    }

    /// Returns true if the actor's base role is ADMIN.
    #[must_use]
    pub fn is_admin(actor: Option<&Actor>) -> bool {
        actor.is_some_and(Actor::is_admin)
    }
}
