//! Names of the protected domain object classes.
//!
//! Resources are plain strings so that callers can pass whatever their
//! handler protects. Strings outside this list never match a catalog,
//! default or custom grant, which makes them admin-only.

/// Blog posts.
pub const POSTS: &str = "posts";
/// Post categories.
pub const CATEGORIES: &str = "categories";
/// Post tags.
pub const TAGS: &str = "tags";
/// Uploaded media.
pub const MEDIA: &str = "media";
/// User accounts.
pub const USERS: &str = "users";
/// Custom roles.
pub const ROLES: &str = "roles";
/// Site settings.
pub const SETTINGS: &str = "settings";
/// Navigation menus.
pub const MENUS: &str = "menus";
/// Static pages.
pub const PAGES: &str = "pages";
/// Traffic analytics.
pub const ANALYTICS: &str = "analytics";

/// Every resource known to the catalog.
pub const ALL: &[&str] = &[
    POSTS, CATEGORIES, TAGS, MEDIA, USERS, ROLES, SETTINGS, MENUS, PAGES, ANALYTICS,
];

/// Returns true if `name` is a known resource.
#[must_use]
pub fn is_known(name: &str) -> bool {
    ALL.contains(&name)
}
