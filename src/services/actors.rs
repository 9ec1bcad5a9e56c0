//! Actor resolution and store-backed authorization.

use std::sync::Arc;

use crate::Result;
use crate::models::{Action, Actor};
use crate::security::{PermissionEngine, Verdict};
use crate::storage::UserStore;

/// Resolves an authenticated identity to an [`Actor`].
///
/// The user row, its custom role and the role's grants come from one
/// consistent read, so an actor never carries a half-replaced grant set.
#[derive(Clone)]
pub struct ActorResolver {
    store: Arc<dyn UserStore>,
}

impl ActorResolver {
    /// Creates a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Returns the actor for `identity`, or `None` for an unknown or empty identity.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn resolve(&self, identity: Option<&str>) -> Result<Option<Actor>> {
        match identity.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => self.store.load_actor(id),
            None => Ok(None),
        }
    }
}

/// Answers permission questions for user ids.
///
/// Combines an [`ActorResolver`] with a [`PermissionEngine`]; an unknown
/// user is evaluated as "no actor" and is denied.
#[derive(Clone)]
pub struct Authorizer {
    resolver: ActorResolver,
    engine: PermissionEngine,
}

impl Authorizer {
    /// Creates an authorizer.
    #[must_use]
    pub const fn new(resolver: ActorResolver, engine: PermissionEngine) -> Self {
        Self { resolver, engine }
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &PermissionEngine {
        &self.engine
    }

    /// Loads the actor for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn actor(&self, user_id: &str) -> Result<Option<Actor>> {
        self.resolver.resolve(Some(user_id))
    }

    /// Resolves a request and reports which rule decided it.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn evaluate(&self, user_id: &str, action: Action, resource: &str) -> Result<Verdict> {
        let actor = self.actor(user_id)?;
        Ok(self.engine.evaluate(actor.as_ref(), action, resource))
    }

    /// Returns true if the user may perform `action` on `resource`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn has_permission(&self, user_id: &str, action: Action, resource: &str) -> Result<bool> {
        Ok(self.evaluate(user_id, action, resource)?.is_allowed())
    }

    /// Returns true if the user holds at least one of `pairs`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn has_any_permission(&self, user_id: &str, pairs: &[(Action, &str)]) -> Result<bool> {
        let actor = self.actor(user_id)?;
        Ok(self.engine.has_any_permission(actor.as_ref(), pairs))
    }

    /// Returns true if the user holds every one of `pairs`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn has_all_permissions(&self, user_id: &str, pairs: &[(Action, &str)]) -> Result<bool> {
        let actor = self.actor(user_id)?;
        Ok(self.engine.has_all_permissions(actor.as_ref(), pairs))
    }

    /// Fails with [`Error::Forbidden`](crate::Error::Forbidden) unless the user is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`](crate::Error::Forbidden) on deny, or a storage error.
    pub fn require_permission(&self, user_id: &str, action: Action, resource: &str) -> Result<()> {
        let actor = self.actor(user_id)?;
        self.engine
            .require_permission(actor.as_ref(), action, resource)
    }

    /// Returns true if the user exists and is an ADMIN.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn is_admin(&self, user_id: &str) -> Result<bool> {
        Ok(PermissionEngine::is_admin(self.actor(user_id)?.as_ref()))
    }
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
