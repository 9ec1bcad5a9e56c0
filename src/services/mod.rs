//! Business logic services.
//!
//! Services sit between callers and the storage layer: role management runs
//! the integrity guard before writing, actor resolution reads a consistent
//! user/role/grant view, and snapshots feed client-side UI gating.

mod actors;
mod roles;
mod snapshot;

pub use actors::{ActorResolver, Authorizer};
pub use roles::{MAX_ROLE_NAME_LEN, RoleService};
pub use snapshot::PermissionSnapshot;
