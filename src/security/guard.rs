//! Referential integrity guard.
//!
//! Pre-mutation checks that reject destructive operations on the role graph
//! and on any other referenced entity. Every check returns a specific error
//! and performs no writes; the caller only writes after all checks pass.
//!
//! The "check dependents before delete" rule is one primitive,
//! [`ensure_no_dependents`], parameterized by a [`DependentQuery`]. Roles use
//! [`RoleAssignments`]; categories, tags and similar entities plug in a
//! [`DependentCounter`] closure over their own reference count.

use crate::models::{Role, RoleId};
use crate::storage::{RoleStore, UserStore};
use crate::{Error, Result};

/// Counts the live objects that depend on an entity.
pub trait DependentQuery {
    /// Entity kind, for errors and logs.
    fn entity(&self) -> &'static str;

    /// Returns the number of dependents of entity `id`.
    fn count_dependents(&self, id: &str) -> Result<usize>;

    /// Builds the error returned when dependents exist.
    fn in_use_error(&self, id: &str, dependents: usize) -> Error {
        Error::InUse {
            entity: self.entity(),
            id: id.to_string(),
            dependents,
        }
    }
}

/// Fails if entity `id` still has dependents.
pub fn ensure_no_dependents<Q: DependentQuery + ?Sized>(query: &Q, id: &str) -> Result<()> {
    let dependents = query.count_dependents(id)?;
    if dependents == 0 {
        return Ok(());
    }
    tracing::warn!(
        entity = query.entity(),
        id,
        dependents,
        "Delete blocked: entity still referenced"
    );
    Err(query.in_use_error(id, dependents))
}

/// Closure-backed [`DependentQuery`].
pub struct DependentCounter<F> {
    entity: &'static str,
    count: F,
}

impl<F> DependentCounter<F>
where
    F: Fn(&str) -> Result<usize>,
{
    /// Creates a query for `entity` counted by `count`.
    pub const fn new(entity: &'static str, count: F) -> Self {
        Self { entity, count }
    }
}

impl<F> DependentQuery for DependentCounter<F>
where
    F: Fn(&str) -> Result<usize>,
{
    fn entity(&self) -> &'static str {
        self.entity
    }

    fn count_dependents(&self, id: &str) -> Result<usize> {
        (self.count)(id)
    }
}

/// Users holding a custom role.
pub struct RoleAssignments<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: UserStore + ?Sized> RoleAssignments<'a, S> {
    /// Creates a query over `store`.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: UserStore + ?Sized> DependentQuery for RoleAssignments<'_, S> {
    fn entity(&self) -> &'static str {
        "role"
    }

    fn count_dependents(&self, id: &str) -> Result<usize> {
        self.store.count_users_with_role(&RoleId::new(id))
    }

    fn in_use_error(&self, id: &str, dependents: usize) -> Error {
        Error::RoleInUse {
            role_id: id.to_string(),
            assigned: dependents,
        }
    }
}

/// Fails for built-in system roles, whoever the caller is.
pub fn ensure_not_system(role: &Role) -> Result<()> {
    if !role.is_system {
        return Ok(());
    }
    tracing::warn!(role.id = %role.id, role.name = %role.name, "Mutation of system role rejected");
    Err(Error::SystemRoleProtected {
        role_id: role.id.to_string(),
    })
}

/// Fails if a role other than `except` already uses `name`.
pub fn ensure_unique_name<S: RoleStore + ?Sized>(
    store: &S,
    name: &str,
    except: Option<&RoleId>,
) -> Result<()> {
    match store.find_role_by_name(name)? {
        Some(existing) if Some(&existing.id) != except => {
            tracing::warn!(name, existing.id = %existing.id, "Duplicate role name rejected");
            Err(Error::DuplicateName(name.to_string()))
        },
        _ => Ok(()),
    }
}

/// All checks that must pass before a role is deleted.
pub fn check_role_delete<S: UserStore + ?Sized>(store: &S, role: &Role) -> Result<()> {
    ensure_not_system(role)?;
    ensure_no_dependents(&RoleAssignments::new(store), role.id.as_str())
}

/// All checks that must pass before a role's name, metadata or grants change.
pub fn check_role_update<S: RoleStore + ?Sized>(
    store: &S,
    role: &Role,
    new_name: Option<&str>,
) -> Result<()> {
    ensure_not_system(role)?;
    if let Some(name) = new_name {
        ensure_unique_name(store, name, Some(&role.id))?;
    }
    Ok(())
}
