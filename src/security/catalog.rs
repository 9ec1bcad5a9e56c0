//! The static permission catalog.
//!
//! Every `(action, resource)` pair the system recognizes. Fixed at build
//! time; the store seeds it on open and never mutates it afterwards.

use crate::models::resource::{
    ANALYTICS, CATEGORIES, MEDIA, MENUS, PAGES, POSTS, ROLES, SETTINGS, TAGS, USERS,
};
use crate::models::{Action, PermissionKey};

/// One catalog permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Granted action.
    pub action: Action,
    /// Resource class.
    pub resource: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

impl CatalogEntry {
    const fn new(action: Action, resource: &'static str, description: &'static str) -> Self {
        Self {
            action,
            resource,
            description,
        }
    }

    /// Returns the lookup key.
    #[must_use]
    pub fn key(&self) -> PermissionKey {
        PermissionKey::new(self.action, self.resource)
    }
}

const ENTRIES: &[CatalogEntry] = &[
    // Posts
    CatalogEntry::new(Action::Create, POSTS, "Create posts"),
    CatalogEntry::new(Action::Read, POSTS, "Read posts"),
    CatalogEntry::new(Action::Update, POSTS, "Edit posts"),
    CatalogEntry::new(Action::Delete, POSTS, "Delete posts"),
    CatalogEntry::new(Action::Publish, POSTS, "Publish posts"),
    // Pages
    CatalogEntry::new(Action::Create, PAGES, "Create pages"),
    CatalogEntry::new(Action::Read, PAGES, "Read pages"),
    CatalogEntry::new(Action::Update, PAGES, "Edit pages"),
    CatalogEntry::new(Action::Delete, PAGES, "Delete pages"),
    CatalogEntry::new(Action::Publish, PAGES, "Publish pages"),
    // Taxonomy
    CatalogEntry::new(Action::Create, CATEGORIES, "Create categories"),
    CatalogEntry::new(Action::Read, CATEGORIES, "Read categories"),
    CatalogEntry::new(Action::Update, CATEGORIES, "Edit categories"),
    CatalogEntry::new(Action::Delete, CATEGORIES, "Delete categories"),
    CatalogEntry::new(Action::Create, TAGS, "Create tags"),
    CatalogEntry::new(Action::Read, TAGS, "Read tags"),
    CatalogEntry::new(Action::Update, TAGS, "Edit tags"),
    CatalogEntry::new(Action::Delete, TAGS, "Delete tags"),
    // Media
    CatalogEntry::new(Action::Create, MEDIA, "Upload media"),
    CatalogEntry::new(Action::Read, MEDIA, "Browse media"),
    CatalogEntry::new(Action::Update, MEDIA, "Edit media metadata"),
    CatalogEntry::new(Action::Delete, MEDIA, "Delete media"),
    CatalogEntry::new(Action::ManageMedia, MEDIA, "Manage the media library"),
    // Administration
    CatalogEntry::new(Action::Read, USERS, "List users"),
    CatalogEntry::new(Action::ManageUsers, USERS, "Manage user accounts"),
    CatalogEntry::new(Action::Read, ROLES, "List roles"),
    CatalogEntry::new(Action::ManageRoles, ROLES, "Manage custom roles"),
    CatalogEntry::new(Action::Read, SETTINGS, "View settings"),
    CatalogEntry::new(Action::ManageSettings, SETTINGS, "Change settings"),
    CatalogEntry::new(Action::Read, MENUS, "View menus"),
    CatalogEntry::new(Action::ManageMenus, MENUS, "Manage navigation menus"),
    CatalogEntry::new(Action::Read, ANALYTICS, "View analytics"),
];

/// Read-only access to the compiled-in catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionCatalog;

impl PermissionCatalog {
    /// Returns every catalog entry.
    #[must_use]
    pub const fn entries() -> &'static [CatalogEntry] {
        ENTRIES
    }

    /// Returns every catalog key.
    #[must_use]
    pub fn keys() -> Vec<PermissionKey> {
        ENTRIES.iter().map(CatalogEntry::key).collect()
    }

    /// Looks up an entry by `(action, resource)`.
    #[must_use]
    pub fn find(action: Action, resource: &str) -> Option<&'static CatalogEntry> {
        ENTRIES
            .iter()
            .find(|e| e.action == action && e.resource == resource)
    }

    /// Returns true if `(action, resource)` is a catalog permission.
    #[must_use]
    pub fn contains(action: Action, resource: &str) -> bool {
        Self::find(action, resource).is_some()
    }

    /// Returns the entries for one resource.
    pub fn for_resource(resource: &str) -> impl Iterator<Item = &'static CatalogEntry> + '_ {
        ENTRIES.iter().filter(move |e| e.resource == resource)
    }
}
