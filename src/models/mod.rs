//! Data models for rolegate.
//!
//! Actions, permissions, base and custom roles, and actors.

mod action;
mod actor;
mod permission;
pub mod resource;
mod role;

pub use action::Action;
pub use actor::{Actor, CustomRoleGrant, User};
pub use permission::{Permission, PermissionId, PermissionKey};
pub use role::{BaseRole, Role, RoleCreate, RoleId, RoleUpdate};
