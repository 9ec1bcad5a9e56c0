//! Storage traits.

use crate::Result;
use crate::models::{Actor, Permission, PermissionId, Role, RoleId, User};

/// Persistence for the permission catalog and custom roles.
///
/// Implementations must make [`replace_role_permissions`] atomic: a
/// concurrent reader sees the complete old set or the complete new set.
///
/// [`replace_role_permissions`]: RoleStore::replace_role_permissions
pub trait RoleStore: Send + Sync {
    /// Lists the stored catalog permissions ordered by id.
    fn list_permissions(&self) -> Result<Vec<Permission>>;

    /// Returns the stored permissions among `ids`. Unknown ids are skipped.
    fn find_permissions(&self, ids: &[PermissionId]) -> Result<Vec<Permission>>;

    /// Retrieves a role with its permissions.
    fn get_role(&self, id: &RoleId) -> Result<Option<Role>>;

    /// Retrieves a role by its unique name.
    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// Lists roles ordered by name.
    fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>>;

    /// Inserts a role and its grants in one transaction.
    fn insert_role(&self, role: &Role) -> Result<()>;

    /// Writes a role's metadata columns (name, display name, description,
    /// active flag, `updated_at`). Returns false if the role does not exist.
    fn update_role(&self, role: &Role) -> Result<bool>;

    /// Replaces the full grant set of a role in one transaction.
    fn replace_role_permissions(&self, id: &RoleId, ids: &[PermissionId]) -> Result<bool>;

    /// Deletes a role and its grants. Returns false if it did not exist.
    fn delete_role(&self, id: &RoleId) -> Result<bool>;
}

/// Persistence for users and the consistent actor read.
pub trait UserStore: Send + Sync {
    /// Retrieves a stored user.
    fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Inserts or replaces a user.
    fn upsert_user(&self, user: &User) -> Result<()>;

    /// Sets or clears a user's custom role. Returns false if the user does not exist.
    fn set_custom_role(&self, user_id: &str, role_id: Option<&RoleId>) -> Result<bool>;

    /// Counts users that reference a custom role.
    fn count_users_with_role(&self, role_id: &RoleId) -> Result<usize>;

    /// Loads a user, and its custom role with grants, in one consistent read.
    fn load_actor(&self, user_id: &str) -> Result<Option<Actor>>;
}

/// A store backing both roles and users.
pub trait AuthzStore: RoleStore + UserStore {}

impl<T: RoleStore + UserStore> AuthzStore for T {}
