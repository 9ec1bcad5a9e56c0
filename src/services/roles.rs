//! Role management service.
//!
//! Every mutation of the role graph passes the referential integrity guard
//! before anything is written.
//!
//! # Rules
//!
//! | Operation | Rejected when |
//! |-----------|---------------|
//! | Create role | Name empty, too long or taken; unknown permission id |
//! | Update role | System role; new name taken by another role |
//! | Set permissions | System role; unknown permission id |
//! | Delete role | Role missing; system role; any user still holds the role |
//! | Assign role | Role does not exist |
//!
//! Authorization of the *caller* is not checked here. Callers gate these
//! operations with [`PermissionEngine::require_permission`] on
//! `MANAGE_ROLES:roles` (see [`crate::services::Authorizer`]).
//!
//! [`PermissionEngine::require_permission`]: crate::security::PermissionEngine::require_permission
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rolegate::{DefaultPermissionMatrix, RoleCreate, RoleService, SqliteAuthzStore};
//!
//! let store = SqliteAuthzStore::in_memory()?;
//! store.seed(&DefaultPermissionMatrix::standard())?;
//! let service = RoleService::new(Arc::new(store));
//!
//! let role = service.create_role(RoleCreate::new("reviewer"))?;
//! let deleted = service.delete_role(&role.id)?;
//! assert_eq!(deleted.name, "reviewer");
//! # Ok::<(), rolegate::Error>(())
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::{
    BaseRole, Permission, PermissionId, Role, RoleCreate, RoleId, RoleUpdate, User,
};
use crate::security::guard;
use crate::storage::AuthzStore;
use crate::{Error, Result, current_timestamp};

/// Maximum length of a role name, in characters.
pub const MAX_ROLE_NAME_LEN: usize = 64;

/// Service for custom role and user-assignment operations.
pub struct RoleService {
    store: Arc<dyn AuthzStore>,
}

impl RoleService {
    /// Creates a new role service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn AuthzStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn AuthzStore> {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists the catalog permissions stored in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn list_permissions(&self) -> Result<Vec<Permission>> {
        self.store.list_permissions()
    }

    /// Gets a role by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn get_role(&self, id: &RoleId) -> Result<Option<Role>> {
        self.store.get_role(id)
    }

    /// Gets a role by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.store.find_role_by_name(name.trim())
    }

    /// Lists roles ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>> {
        self.store.list_roles(include_inactive)
    }

    /// Returns the permissions granted to a role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the role does not exist.
    pub fn role_permissions(&self, id: &RoleId) -> Result<Vec<Permission>> {
        Ok(self.require_role(id)?.permissions)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a custom role.
    ///
    /// The name is trimmed. Duplicate permission ids collapse to one grant.
    /// The new role is never a system role.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty or longer than [`MAX_ROLE_NAME_LEN`]
    /// - Another role already uses the name
    /// - A permission id is not in the catalog
    pub fn create_role(&self, request: RoleCreate) -> Result<Role> {
        let name = validate_name(&request.name)?;
        guard::ensure_unique_name(&*self.store, &name, None)?;
        let permissions = self.resolve_permissions(&request.permission_ids)?;

        let now = current_timestamp();
        let role = Role {
            id: RoleId::generate(),
            name,
            display_name: normalize(request.display_name),
            description: normalize(request.description),
            is_active: true,
            is_system: false,
            permissions,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_role(&role)?;

        tracing::info!(
            role.id = %role.id,
            role.name = %role.name,
            permissions = role.permissions.len(),
            "Role created"
        );
        Ok(role)
    }

    /// Updates a role's name, display name, description or active flag.
    ///
    /// Renaming a role to its own current name is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role does not exist
    /// - The role is a system role
    /// - The new name is invalid or taken by another role
    pub fn update_role(&self, id: &RoleId, update: RoleUpdate) -> Result<Role> {
        let mut role = self.require_role(id)?;
        let new_name = update.name.as_deref().map(validate_name).transpose()?;
        guard::check_role_update(&*self.store, &role, new_name.as_deref())?;

        if update.is_empty() {
            return Ok(role);
        }
        if let Some(name) = new_name {
            role.name = name;
        }
        if let Some(display_name) = update.display_name {
            role.display_name = normalize(Some(display_name));
        }
        if let Some(description) = update.description {
            role.description = normalize(Some(description));
        }
        if let Some(is_active) = update.is_active {
            role.is_active = is_active;
        }
        role.updated_at = current_timestamp();

        if !self.store.update_role(&role)? {
            return Err(Error::not_found("role", id.as_str()));
        }

        tracing::info!(role.id = %role.id, role.name = %role.name, "Role updated");
        Ok(role)
    }

    /// Replaces a role's full permission set atomically.
    ///
    /// Concurrent readers observe either the old set or the new set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role does not exist
    /// - The role is a system role
    /// - A permission id is not in the catalog
    pub fn set_role_permissions(
        &self,
        id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> Result<Role> {
        let role = self.require_role(id)?;
        guard::check_role_update(&*self.store, &role, None)?;
        let permissions = self.resolve_permissions(permission_ids)?;
        let ids: Vec<PermissionId> = permissions.iter().map(|p| p.id).collect();

        if !self.store.replace_role_permissions(id, &ids)? {
            return Err(Error::not_found("role", id.as_str()));
        }

        tracing::info!(
            role.id = %role.id,
            role.name = %role.name,
            permissions = ids.len(),
            "Role permissions replaced"
        );
        self.require_role(id)
    }

    /// Deletes a custom role and returns it as it was before deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The role does not exist
    /// - The role is a system role
    /// - One or more users still hold the role
    pub fn delete_role(&self, id: &RoleId) -> Result<Role> {
        let role = self.require_role(id)?;
        guard::check_role_delete(&*self.store, &role)?;

        if !self.store.delete_role(id)? {
            return Err(Error::not_found("role", id.as_str()));
        }

        tracing::info!(role.id = %role.id, role.name = %role.name, "Role deleted");
        Ok(role)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Inserts or replaces a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the user id is empty, the referenced custom role
    /// does not exist, or storage cannot be accessed.
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        if user.id.trim().is_empty() {
            return Err(Error::Validation("user id cannot be empty".to_string()));
        }
        if let Some(role_id) = &user.custom_role_id {
            self.require_role(role_id)?;
        }
        self.store.upsert_user(user)?;
        tracing::info!(user.id = %user.id, base_role = %user.base_role, "User saved");
        Ok(())
    }

    /// Gets a stored user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.store.get_user(id)
    }

    /// Sets (`Some`) or clears (`None`) a user's custom role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the user or the role does not exist.
    pub fn assign_custom_role(&self, user_id: &str, role_id: Option<&RoleId>) -> Result<()> {
        if let Some(role_id) = role_id {
            self.require_role(role_id)?;
        }
        if !self.store.set_custom_role(user_id, role_id)? {
            return Err(Error::not_found("user", user_id));
        }
        tracing::info!(
            user.id = user_id,
            role.id = role_id.map(RoleId::as_str),
            "Custom role assigned"
        );
        Ok(())
    }

    /// Convenience for creating a user with a base role and no custom role.
    ///
    /// # Errors
    ///
    /// See [`upsert_user`](Self::upsert_user).
    pub fn upsert_base_user(&self, id: &str, base_role: BaseRole) -> Result<User> {
        let user = User::new(id, base_role);
        self.upsert_user(&user)?;
        Ok(user)
    }

    fn require_role(&self, id: &RoleId) -> Result<Role> {
        self.store
            .get_role(id)?
            .ok_or_else(|| Error::not_found("role", id.as_str()))
    }

    /// Loads the catalog permissions for `ids`, deduplicated, in id order.
    fn resolve_permissions(&self, ids: &[PermissionId]) -> Result<Vec<Permission>> {
        let unique: BTreeSet<PermissionId> = ids.iter().copied().collect();
        let unique: Vec<PermissionId> = unique.into_iter().collect();
        let found = self.store.find_permissions(&unique)?;

        if found.len() != unique.len() {
            let known: BTreeSet<PermissionId> = found.iter().map(|p| p.id).collect();
            let missing: Vec<String> = unique
                .iter()
                .filter(|id| !known.contains(id))
                .map(ToString::to_string)
                .collect();
            return Err(Error::Validation(format!(
                "unknown permission id(s): {}",
                missing.join(", ")
            )));
        }
        Ok(found)
    }
}

/// Trims and checks a role name.
fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("role name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_ROLE_NAME_LEN {
        return Err(Error::Validation(format!(
            "role name exceeds {MAX_ROLE_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
