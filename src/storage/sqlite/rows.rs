//! Schema and row conversion for the `SQLite` store.
//!
//! All helpers take a plain [`Connection`] so they run equally on the
//! locked connection or inside a [`rusqlite::Transaction`].

use crate::models::{Action, BaseRole, Permission, PermissionId, Role, RoleId, User};
use crate::{Error, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Schema for catalog permissions, custom roles, grants and users.
///
/// - `(action, resource)` is unique in `permissions`
/// - `role_permissions` has a composite primary key, so a role never holds
///   the same grant twice, and cascades with its role
/// - `users.custom_role_id` restricts role deletion at the database level
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS permissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action TEXT NOT NULL,
    resource TEXT NOT NULL,
    description TEXT NOT NULL,
    UNIQUE (action, resource)
);

CREATE TABLE IF NOT EXISTS roles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    display_name TEXT,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_system INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS role_permissions (
    role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
    permission_id INTEGER NOT NULL REFERENCES permissions(id),
    PRIMARY KEY (role_id, permission_id)
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    base_role TEXT NOT NULL,
    custom_role_id TEXT REFERENCES roles(id) ON DELETE RESTRICT,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_users_custom_role ON users(custom_role_id);
CREATE INDEX IF NOT EXISTS idx_role_permissions_permission ON role_permissions(permission_id);
";

const ROLE_COLUMNS: &str =
    "id, name, display_name, description, is_active, is_system, created_at, updated_at";

/// Builds a [`Permission`] from `id, action, resource, description`.
pub fn permission_from_row(row: &Row<'_>) -> rusqlite::Result<Permission> {
    let action: String = row.get(1)?;
    let action = Action::parse(&action).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown action '{action}'").into(),
        )
    })?;
    Ok(Permission {
        id: PermissionId(row.get(0)?),
        action,
        resource: row.get(2)?,
        description: row.get(3)?,
    })
}

/// Builds a [`Role`] without permissions from [`ROLE_COLUMNS`].
fn role_from_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    let created_at: i64 = row.get(6)?;
    let updated_at: i64 = row.get(7)?;
    Ok(Role {
        id: RoleId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        display_name: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
        is_system: row.get(5)?,
        permissions: Vec::new(),
        created_at: u64::try_from(created_at).unwrap_or(0),
        updated_at: u64::try_from(updated_at).unwrap_or(0),
    })
}

/// Builds a [`User`] from `id, base_role, custom_role_id, is_active`.
pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let base_role: String = row.get(1)?;
    let base_role = BaseRole::parse(&base_role).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown base role '{base_role}'").into(),
        )
    })?;
    Ok(User {
        id: row.get(0)?,
        base_role,
        custom_role_id: row.get::<_, Option<String>>(2)?.map(RoleId::new),
        is_active: row.get(3)?,
    })
}

/// Loads the permissions granted to a role, ordered by id.
pub fn fetch_role_permissions(conn: &Connection, role_id: &str) -> Result<Vec<Permission>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT p.id, p.action, p.resource, p.description
             FROM role_permissions rp
             JOIN permissions p ON p.id = rp.permission_id
             WHERE rp.role_id = ?1
             ORDER BY p.id",
        )
        .map_err(|e| Error::operation("prepare_role_permissions", e))?;

    stmt.query_map(params![role_id], permission_from_row)
        .and_then(Iterator::collect)
        .map_err(|e| Error::operation("query_role_permissions", e))
}

/// Loads one role, with permissions, by `id` or `name`.
pub fn fetch_role(conn: &Connection, by: RoleLookup<'_>) -> Result<Option<Role>> {
    let (column, value) = match by {
        RoleLookup::Id(id) => ("id", id),
        RoleLookup::Name(name) => ("name", name),
    };
    let sql = format!("SELECT {ROLE_COLUMNS} FROM roles WHERE {column} = ?1");

    let role = conn
        .query_row(&sql, params![value], role_from_row)
        .optional()
        .map_err(|e| Error::operation("query_role", e))?;

    match role {
        Some(mut role) => {
            role.permissions = fetch_role_permissions(conn, role.id.as_str())?;
            Ok(Some(role))
        },
        None => Ok(None),
    }
}

/// Loads all roles, with permissions, ordered by name.
pub fn fetch_roles(conn: &Connection, include_inactive: bool) -> Result<Vec<Role>> {
    let filter = if include_inactive {
        ""
    } else {
        "WHERE is_active = 1"
    };
    let sql = format!("SELECT {ROLE_COLUMNS} FROM roles {filter} ORDER BY name");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::operation("prepare_list_roles", e))?;
    let mut roles: Vec<Role> = stmt
        .query_map([], role_from_row)
        .and_then(Iterator::collect)
        .map_err(|e| Error::operation("list_roles", e))?;

    for role in &mut roles {
        role.permissions = fetch_role_permissions(conn, role.id.as_str())?;
    }
    Ok(roles)
}

/// Key used by [`fetch_role`].
#[derive(Debug, Clone, Copy)]
pub enum RoleLookup<'a> {
    /// Look up by primary key.
    Id(&'a str),
    /// Look up by unique name.
    Name(&'a str),
}

/// Inserts grants for a role, ignoring duplicates.
pub fn insert_grants(conn: &Connection, role_id: &str, ids: &[PermissionId]) -> Result<()> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO role_permissions (role_id, permission_id) VALUES (?1, ?2)",
        )
        .map_err(|e| Error::operation("prepare_insert_grant", e))?;

    for id in ids {
        stmt.execute(params![role_id, id.0]).map_err(|e| {
            if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                Error::Validation(format!("unknown permission id {id}"))
            } else {
                Error::operation("insert_grant", e)
            }
        })?;
    }
    Ok(())
}

/// Returns true if `err` is the given extended constraint violation.
pub fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.extended_code == extended_code
    )
}

/// Converts a stored timestamp.
#[allow(clippy::cast_possible_wrap)]
pub const fn to_sql_timestamp(ts: u64) -> i64 {
    ts as i64
}
