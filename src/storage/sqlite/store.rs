//! `SQLite`-backed role, permission and user store.

use super::connection::{acquire_lock, configure_connection};
use super::metrics::timed;
use super::rows::{
    RoleLookup, SCHEMA, fetch_role, fetch_roles, insert_grants, is_constraint, permission_from_row,
    to_sql_timestamp, user_from_row,
};
use crate::models::{
    Actor, BaseRole, CustomRoleGrant, Permission, PermissionId, PermissionKey, Role, RoleId, User,
};
use crate::security::{DefaultPermissionMatrix, PermissionCatalog};
use crate::storage::{RoleStore, UserStore};
use crate::{Error, Result, current_timestamp};
use rusqlite::ffi::{SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_UNIQUE};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::instrument;

/// Built-in roles created by [`SqliteAuthzStore::seed`].
const SYSTEM_ROLES: &[(&str, BaseRole, &str)] = &[
    ("administrator", BaseRole::Admin, "Every catalog permission"),
    ("editor", BaseRole::Editor, "Default editor permissions"),
    ("viewer", BaseRole::Viewer, "Default viewer permissions"),
];

/// Outcome of [`SqliteAuthzStore::seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Catalog permissions inserted by this call.
    pub permissions_added: usize,
    /// System roles created by this call.
    pub roles_added: usize,
}

/// `SQLite` store for the permission catalog, custom roles and users.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` because `rusqlite::Connection` is not `Sync`.
/// Every write that touches more than one row runs in an `IMMEDIATE`
/// transaction, and every multi-row read runs in a deferred transaction.
/// Combined with WAL mode this holds across separate store instances
/// opened on the same file: a reader sees either the state before a grant
/// replacement or the state after it, never the emptied intermediate.
pub struct SqliteAuthzStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteAuthzStore {
    /// Opens (or creates) a store at `db_path` and applies the schema.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::operation("create_data_dir", e))?;
        }
        let conn = Connection::open(&db_path).map_err(|e| Error::operation("open_sqlite", e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::operation("open_sqlite_in_memory", e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub const fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        configure_connection(&conn)?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::operation("create_schema", e))
    }

    /// Inserts missing catalog permissions and system roles.
    ///
    /// Idempotent. Existing system roles are never modified, and a
    /// user-created role that already holds a system role's name is left alone.
    /// `administrator` receives the whole catalog; `editor` and `viewer`
    /// receive their default-matrix entries.
    #[instrument(skip(self, matrix), fields(operation = "seed", backend = "sqlite"))]
    pub fn seed(&self, matrix: &DefaultPermissionMatrix) -> Result<SeedReport> {
        timed("seed", || {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| Error::operation("begin_transaction", e))?;

            let mut report = SeedReport::default();
            for entry in PermissionCatalog::entries() {
                report.permissions_added += tx
                    .execute(
                        "INSERT OR IGNORE INTO permissions (action, resource, description)
                         VALUES (?1, ?2, ?3)",
                        params![entry.action.as_str(), entry.resource, entry.description],
                    )
                    .map_err(|e| Error::operation("seed_permission", e))?;
            }

            let now = to_sql_timestamp(current_timestamp());
            for (name, base_role, description) in SYSTEM_ROLES {
                if fetch_role(&tx, RoleLookup::Name(name))?.is_some() {
                    continue;
                }
                let role_id = format!("system:{name}");
                tx.execute(
                    "INSERT INTO roles (id, name, display_name, description, is_active, is_system, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 1, 1, ?5, ?5)",
                    params![role_id, name, base_role.display_name(), description, now],
                )
                .map_err(|e| Error::operation("seed_role", e))?;

                let keys = match base_role {
                    BaseRole::Admin => PermissionCatalog::keys(),
                    other => matrix.permissions_for(*other),
                };
                grant_by_key(&tx, &role_id, &keys)?;
                report.roles_added += 1;
            }

            tx.commit()
                .map_err(|e| Error::operation("commit_transaction", e))?;

            if report != SeedReport::default() {
                tracing::info!(
                    permissions_added = report.permissions_added,
                    roles_added = report.roles_added,
                    "Seeded permission catalog"
                );
            }
            Ok(report)
        })
    }
}

/// Grants catalog permissions to a role by `(action, resource)`.
fn grant_by_key(conn: &Connection, role_id: &str, keys: &[PermissionKey]) -> Result<()> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO role_permissions (role_id, permission_id)
             SELECT ?1, id FROM permissions WHERE action = ?2 AND resource = ?3",
        )
        .map_err(|e| Error::operation("prepare_grant_by_key", e))?;
    for key in keys {
        stmt.execute(params![role_id, key.action.as_str(), key.resource])
            .map_err(|e| Error::operation("grant_by_key", e))?;
    }
    Ok(())
}

impl RoleStore for SqliteAuthzStore {
    #[instrument(skip(self), fields(operation = "list_permissions", backend = "sqlite"))]
    fn list_permissions(&self) -> Result<Vec<Permission>> {
        timed("list_permissions", || {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare_cached(
                    "SELECT id, action, resource, description FROM permissions ORDER BY id",
                )
                .map_err(|e| Error::operation("prepare_list_permissions", e))?;
            stmt.query_map([], permission_from_row)
                .and_then(Iterator::collect)
                .map_err(|e| Error::operation("list_permissions", e))
        })
    }

    #[instrument(skip(self, ids), fields(operation = "find_permissions", backend = "sqlite", count = ids.len()))]
    fn find_permissions(&self, ids: &[PermissionId]) -> Result<Vec<Permission>> {
        timed("find_permissions", || {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare_cached(
                    "SELECT id, action, resource, description FROM permissions WHERE id = ?1",
                )
                .map_err(|e| Error::operation("prepare_find_permission", e))?;

            let mut found = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(permission) = stmt
                    .query_row(params![id.0], permission_from_row)
                    .optional()
                    .map_err(|e| Error::operation("find_permission", e))?
                {
                    found.push(permission);
                }
            }
            Ok(found)
        })
    }

    #[instrument(skip(self), fields(operation = "get_role", backend = "sqlite", role.id = %id))]
    fn get_role(&self, id: &RoleId) -> Result<Option<Role>> {
        timed("get_role", || {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction()
                .map_err(|e| Error::operation("begin_read", e))?;
            let role = fetch_role(&tx, RoleLookup::Id(id.as_str()))?;
            tx.commit().map_err(|e| Error::operation("end_read", e))?;
            Ok(role)
        })
    }

    #[instrument(skip(self), fields(operation = "find_role_by_name", backend = "sqlite"))]
    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        timed("find_role_by_name", || {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction()
                .map_err(|e| Error::operation("begin_read", e))?;
            let role = fetch_role(&tx, RoleLookup::Name(name))?;
            tx.commit().map_err(|e| Error::operation("end_read", e))?;
            Ok(role)
        })
    }

    #[instrument(skip(self), fields(operation = "list_roles", backend = "sqlite"))]
    fn list_roles(&self, include_inactive: bool) -> Result<Vec<Role>> {
        timed("list_roles", || {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction()
                .map_err(|e| Error::operation("begin_read", e))?;
            let roles = fetch_roles(&tx, include_inactive)?;
            tx.commit().map_err(|e| Error::operation("end_read", e))?;
            Ok(roles)
        })
    }

    #[instrument(skip(self, role), fields(operation = "insert_role", backend = "sqlite", role.id = %role.id))]
    fn insert_role(&self, role: &Role) -> Result<()> {
        timed("insert_role", || {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| Error::operation("begin_transaction", e))?;

            tx.execute(
                "INSERT INTO roles (id, name, display_name, description, is_active, is_system, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    role.id.as_str(),
                    role.name,
                    role.display_name,
                    role.description,
                    role.is_active,
                    role.is_system,
                    to_sql_timestamp(role.created_at),
                    to_sql_timestamp(role.updated_at),
                ],
            )
            .map_err(|e| {
                if is_constraint(&e, SQLITE_CONSTRAINT_UNIQUE) {
                    Error::DuplicateName(role.name.clone())
                } else {
                    Error::operation("insert_role", e)
                }
            })?;

            insert_grants(&tx, role.id.as_str(), &role.permission_ids())?;

            tx.commit()
                .map_err(|e| Error::operation("commit_transaction", e))
        })
    }

    #[instrument(skip(self, role), fields(operation = "update_role", backend = "sqlite", role.id = %role.id))]
    fn update_role(&self, role: &Role) -> Result<bool> {
        timed("update_role", || {
            let conn = acquire_lock(&self.conn);
            let rows = conn
                .execute(
                    "UPDATE roles
                     SET name = ?1, display_name = ?2, description = ?3, is_active = ?4, updated_at = ?5
                     WHERE id = ?6",
                    params![
                        role.name,
                        role.display_name,
                        role.description,
                        role.is_active,
                        to_sql_timestamp(role.updated_at),
                        role.id.as_str(),
                    ],
                )
                .map_err(|e| {
                    if is_constraint(&e, SQLITE_CONSTRAINT_UNIQUE) {
                        Error::DuplicateName(role.name.clone())
                    } else {
                        Error::operation("update_role", e)
                    }
                })?;
            Ok(rows > 0)
        })
    }

    #[instrument(skip(self, ids), fields(operation = "replace_role_permissions", backend = "sqlite", role.id = %id, count = ids.len()))]
    fn replace_role_permissions(&self, id: &RoleId, ids: &[PermissionId]) -> Result<bool> {
        timed("replace_role_permissions", || {
            let mut conn = acquire_lock(&self.conn);
            // Delete and insert commit together or not at all.
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| Error::operation("begin_transaction", e))?;

            let touched = tx
                .execute(
                    "UPDATE roles SET updated_at = ?1 WHERE id = ?2",
                    params![to_sql_timestamp(current_timestamp()), id.as_str()],
                )
                .map_err(|e| Error::operation("touch_role", e))?;
            if touched == 0 {
                return Ok(false);
            }

            tx.execute(
                "DELETE FROM role_permissions WHERE role_id = ?1",
                params![id.as_str()],
            )
            .map_err(|e| Error::operation("delete_grants", e))?;

            insert_grants(&tx, id.as_str(), ids)?;

            tx.commit()
                .map_err(|e| Error::operation("commit_transaction", e))?;
            Ok(true)
        })
    }

    #[instrument(skip(self), fields(operation = "delete_role", backend = "sqlite", role.id = %id))]
    fn delete_role(&self, id: &RoleId) -> Result<bool> {
        timed("delete_role", || {
            let mut conn = acquire_lock(&self.conn);
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| Error::operation("begin_transaction", e))?;

            // Re-checked under the write lock: an assignment may have landed
            // after the guard ran.
            let assigned = count_users_with_role(&tx, id)?;
            if assigned > 0 {
                return Err(Error::RoleInUse {
                    role_id: id.to_string(),
                    assigned,
                });
            }

            tx.execute(
                "DELETE FROM role_permissions WHERE role_id = ?1",
                params![id.as_str()],
            )
            .map_err(|e| Error::operation("delete_grants", e))?;
            let rows = tx
                .execute("DELETE FROM roles WHERE id = ?1", params![id.as_str()])
                .map_err(|e| Error::operation("delete_role", e))?;

            tx.commit()
                .map_err(|e| Error::operation("commit_transaction", e))?;
            Ok(rows > 0)
        })
    }
}

fn count_users_with_role(conn: &Connection, role_id: &RoleId) -> Result<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE custom_role_id = ?1",
            params![role_id.as_str()],
            |row| row.get(0),
        )
        .map_err(|e| Error::operation("count_users_with_role", e))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn role_reference_error(e: rusqlite::Error, role_id: Option<&RoleId>, op: &str) -> Error {
    match role_id {
        Some(role_id) if is_constraint(&e, SQLITE_CONSTRAINT_FOREIGNKEY) => {
            Error::not_found("role", role_id.as_str())
        },
        _ => Error::operation(op, e),
    }
}

impl UserStore for SqliteAuthzStore {
    #[instrument(skip(self), fields(operation = "get_user", backend = "sqlite"))]
    fn get_user(&self, id: &str) -> Result<Option<User>> {
        timed("get_user", || {
            let conn = acquire_lock(&self.conn);
            conn.query_row(
                "SELECT id, base_role, custom_role_id, is_active FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()
            .map_err(|e| Error::operation("get_user", e))
        })
    }

    #[instrument(skip(self, user), fields(operation = "upsert_user", backend = "sqlite", user.id = %user.id))]
    fn upsert_user(&self, user: &User) -> Result<()> {
        timed("upsert_user", || {
            let conn = acquire_lock(&self.conn);
            conn.execute(
                "INSERT INTO users (id, base_role, custom_role_id, is_active)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    base_role = excluded.base_role,
                    custom_role_id = excluded.custom_role_id,
                    is_active = excluded.is_active",
                params![
                    user.id,
                    user.base_role.as_str(),
                    user.custom_role_id.as_ref().map(RoleId::as_str),
                    user.is_active,
                ],
            )
            .map_err(|e| role_reference_error(e, user.custom_role_id.as_ref(), "upsert_user"))?;
            Ok(())
        })
    }

    #[instrument(skip(self), fields(operation = "set_custom_role", backend = "sqlite"))]
    fn set_custom_role(&self, user_id: &str, role_id: Option<&RoleId>) -> Result<bool> {
        timed("set_custom_role", || {
            let conn = acquire_lock(&self.conn);
            let rows = conn
                .execute(
                    "UPDATE users SET custom_role_id = ?1 WHERE id = ?2",
                    params![role_id.map(RoleId::as_str), user_id],
                )
                .map_err(|e| role_reference_error(e, role_id, "set_custom_role"))?;
            Ok(rows > 0)
        })
    }

    #[instrument(skip(self), fields(operation = "count_users_with_role", backend = "sqlite", role.id = %role_id))]
    fn count_users_with_role(&self, role_id: &RoleId) -> Result<usize> {
        timed("count_users_with_role", || {
            let conn = acquire_lock(&self.conn);
            count_users_with_role(&conn, role_id)
        })
    }

    #[instrument(skip(self), fields(operation = "load_actor", backend = "sqlite"))]
    fn load_actor(&self, user_id: &str) -> Result<Option<Actor>> {
        timed("load_actor", || {
            let mut conn = acquire_lock(&self.conn);
            // One read transaction covers the user row, the role row and its grants.
            let tx = conn
                .transaction()
                .map_err(|e| Error::operation("begin_read", e))?;

            let user = tx
                .query_row(
                    "SELECT id, base_role, custom_role_id, is_active FROM users WHERE id = ?1",
                    params![user_id],
                    user_from_row,
                )
                .optional()
                .map_err(|e| Error::operation("load_actor_user", e))?;

            let Some(user) = user else {
                tx.commit().map_err(|e| Error::operation("end_read", e))?;
                return Ok(None);
            };

            let custom_role = match &user.custom_role_id {
                Some(role_id) => fetch_role(&tx, RoleLookup::Id(role_id.as_str()))?
                    .map(|role| CustomRoleGrant::from_role(&role)),
                None => None,
            };
            tx.commit().map_err(|e| Error::operation("end_read", e))?;

            Ok(Some(Actor {
                id: user.id,
                base_role: user.base_role,
                custom_role,
                is_active: user.is_active,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::models::Action;

    fn seeded() -> SqliteAuthzStore {
        let store = SqliteAuthzStore::in_memory().unwrap();
        store.seed(&DefaultPermissionMatrix::standard()).unwrap();
        store
    }

    fn permission_id(store: &SqliteAuthzStore, action: Action, resource: &str) -> PermissionId {
        store
            .list_permissions()
            .unwrap()
            .into_iter()
            .find(|p| p.key().matches(action, resource))
            .map(|p| p.id)
            .unwrap()
    }

    fn custom_role(name: &str, permissions: Vec<Permission>) -> Role {
        let now = current_timestamp();
        Role {
            id: RoleId::generate(),
            name: name.to_string(),
            display_name: None,
            description: None,
            is_active: true,
            is_system: false,
            permissions,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = SqliteAuthzStore::in_memory().unwrap();
        let matrix = DefaultPermissionMatrix::standard();

        let first = store.seed(&matrix).unwrap();
        assert_eq!(first.permissions_added, PermissionCatalog::entries().len());
        assert_eq!(first.roles_added, 3);

        let second = store.seed(&matrix).unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[test]
    fn test_seed_system_roles() {
        let store = seeded();

        let admin = store.find_role_by_name("administrator").unwrap().unwrap();
        assert!(admin.is_system);
        assert_eq!(admin.id.as_str(), "system:administrator");
        assert_eq!(admin.permissions.len(), PermissionCatalog::entries().len());

        let viewer = store.find_role_by_name("viewer").unwrap().unwrap();
        assert!(viewer.contains(Action::Read, "posts"));
        assert!(!viewer.contains(Action::Create, "posts"));
    }

    #[test]
    fn test_insert_and_get_role() {
        let store = seeded();
        let read_posts = permission_id(&store, Action::Read, "posts");
        let permissions = store.find_permissions(&[read_posts]).unwrap();
        let role = custom_role("reviewer", permissions);

        store.insert_role(&role).unwrap();

        let loaded = store.get_role(&role.id).unwrap().unwrap();
        assert_eq!(loaded.name, "reviewer");
        assert!(!loaded.is_system);
        assert_eq!(loaded.permission_ids(), vec![read_posts]);
    }

    #[test]
    fn test_insert_duplicate_name() {
        let store = seeded();
        let reviewer = custom_role("reviewer", Vec::new());
        store.insert_role(&reviewer).unwrap();

        let err = store
            .insert_role(&custom_role("reviewer", Vec::new()))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName(name) if name == "reviewer"));
    }

    #[test]
    fn test_replace_role_permissions() {
        let store = seeded();
        let role = custom_role("reviewer", Vec::new());
        store.insert_role(&role).unwrap();

        let read_posts = permission_id(&store, Action::Read, "posts");
        let update_posts = permission_id(&store, Action::Update, "posts");

        let id = &role.id;
        let both = [read_posts, update_posts];
        assert!(store.replace_role_permissions(id, &both).unwrap());
        assert!(store.replace_role_permissions(id, &[update_posts]).unwrap());

        let loaded = store.get_role(&role.id).unwrap().unwrap();
        assert_eq!(loaded.permission_ids(), vec![update_posts]);
    }

    #[test]
    fn test_replace_unknown_permission_rolls_back() {
        let store = seeded();
        let read_posts = permission_id(&store, Action::Read, "posts");
        let role = custom_role("reviewer", store.find_permissions(&[read_posts]).unwrap());
        store.insert_role(&role).unwrap();

        let err = store
            .replace_role_permissions(&role.id, &[PermissionId(9999)])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let loaded = store.get_role(&role.id).unwrap().unwrap();
        assert_eq!(loaded.permission_ids(), vec![read_posts]);
    }

    #[test]
    fn test_replace_missing_role() {
        let store = seeded();
        assert!(!store
            .replace_role_permissions(&RoleId::new("missing"), &[])
            .unwrap());
    }

    #[test]
    fn test_delete_role_in_use_rejected_in_store() {
        let store = seeded();
        let role = custom_role("reviewer", Vec::new());
        store.insert_role(&role).unwrap();

        let mut user = User::new("u-1", BaseRole::Viewer);
        user.custom_role_id = Some(role.id.clone());
        store.upsert_user(&user).unwrap();

        let err = store.delete_role(&role.id).unwrap_err();
        assert!(matches!(err, Error::RoleInUse { assigned: 1, .. }));
        assert!(store.get_role(&role.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_role_removes_grants() {
        let store = seeded();
        let read_posts = permission_id(&store, Action::Read, "posts");
        let role = custom_role("reviewer", store.find_permissions(&[read_posts]).unwrap());
        store.insert_role(&role).unwrap();

        assert!(store.delete_role(&role.id).unwrap());
        assert!(store.get_role(&role.id).unwrap().is_none());
        assert!(!store.delete_role(&role.id).unwrap());

        let conn = acquire_lock(&store.conn);
        let grants: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM role_permissions WHERE role_id = ?1",
                params![role.id.as_str()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(grants, 0);
    }

    #[test]
    fn test_assign_unknown_role() {
        let store = seeded();
        let user = User::new("u-1", BaseRole::Editor);
        store.upsert_user(&user).unwrap();

        let missing = RoleId::new("missing");
        let err = store.set_custom_role("u-1", Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "role", .. }));
    }

    #[test]
    fn test_load_actor() {
        let store = seeded();
        let delete_media = permission_id(&store, Action::Delete, "media");
        let grants = store.find_permissions(&[delete_media]).unwrap();
        let role = custom_role("media-cleaner", grants);
        store.insert_role(&role).unwrap();

        let user = User::new("u-1", BaseRole::Viewer);
        store.upsert_user(&user).unwrap();
        assert!(store.set_custom_role("u-1", Some(&role.id)).unwrap());
        assert_eq!(store.count_users_with_role(&role.id).unwrap(), 1);

        let actor = store.load_actor("u-1").unwrap().unwrap();
        assert_eq!(actor.base_role, BaseRole::Viewer);
        let grant = actor.custom_role.unwrap();
        assert!(grant.allows(Action::Delete, "media"));

        assert!(store.load_actor("nobody").unwrap().is_none());
    }

    #[test]
    fn test_update_role_metadata() {
        let store = seeded();
        let mut role = custom_role("reviewer", Vec::new());
        store.insert_role(&role).unwrap();

        role.name = "senior-reviewer".to_string();
        role.is_active = false;
        assert!(store.update_role(&role).unwrap());

        assert!(store.find_role_by_name("reviewer").unwrap().is_none());
        let active = store.list_roles(false).unwrap();
        assert!(active.iter().all(|r| r.id != role.id));
        let all = store.list_roles(true).unwrap();
        let archived = all.iter().find(|r| r.name == "senior-reviewer").unwrap();
        assert!(!archived.is_active);
    }

    #[test]
    fn test_file_backed_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rolegate.db");

        {
            let store = SqliteAuthzStore::new(&path).unwrap();
            store.seed(&DefaultPermissionMatrix::standard()).unwrap();
            let reviewer = custom_role("reviewer", Vec::new());
            store.insert_role(&reviewer).unwrap();
        }

        let store = SqliteAuthzStore::new(&path).unwrap();
        assert_eq!(store.db_path(), Some(&path));
        assert!(store.find_role_by_name("reviewer").unwrap().is_some());
        let reseeded = store.seed(&DefaultPermissionMatrix::standard()).unwrap();
        assert_eq!(reseeded, SeedReport::default());
    }
}
