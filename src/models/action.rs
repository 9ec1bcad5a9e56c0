//! Closed set of actions a permission can grant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An action an actor performs on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Create a new object.
    Create,
    /// Read an object.
    Read,
    /// Modify an existing object.
    Update,
    /// Remove an object.
    Delete,
    /// Make an object publicly visible.
    Publish,
    /// Administer user accounts.
    ManageUsers,
    /// Administer custom roles and their grants.
    ManageRoles,
    /// Administer site settings.
    ManageSettings,
    /// Administer navigation menus.
    ManageMenus,
    /// Administer the media library.
    ManageMedia,
}

impl Action {
    /// Returns all action variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Create,
            Self::Read,
            Self::Update,
            Self::Delete,
            Self::Publish,
            Self::ManageUsers,
            Self::ManageRoles,
            Self::ManageSettings,
            Self::ManageMenus,
            Self::ManageMedia,
        ]
    }

    /// Returns the canonical (stored) name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Publish => "PUBLISH",
            Self::ManageUsers => "MANAGE_USERS",
            Self::ManageRoles => "MANAGE_ROLES",
            Self::ManageSettings => "MANAGE_SETTINGS",
            Self::ManageMenus => "MANAGE_MENUS",
            Self::ManageMedia => "MANAGE_MEDIA",
        }
    }

    /// Returns true for the named `MANAGE_*` actions.
    #[must_use]
    pub const fn is_manage(&self) -> bool {
        matches!(
            self,
            Self::ManageUsers
                | Self::ManageRoles
                | Self::ManageSettings
                | Self::ManageMenus
                | Self::ManageMedia
        )
    }

    /// Parses an action name. Case-insensitive; `-` is accepted for `_`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "CREATE" => Some(Self::Create),
            "READ" => Some(Self::Read),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "PUBLISH" => Some(Self::Publish),
            "MANAGE_USERS" => Some(Self::ManageUsers),
            "MANAGE_ROLES" => Some(Self::ManageRoles),
            "MANAGE_SETTINGS" => Some(Self::ManageSettings),
            "MANAGE_MENUS" => Some(Self::ManageMenus),
            "MANAGE_MEDIA" => Some(Self::ManageMedia),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::Error::Validation(format!("unknown action: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_variants() {
        assert_eq!(Action::parse("read"), Some(Action::Read));
        assert_eq!(Action::parse("manage-menus"), Some(Action::ManageMenus));
        assert_eq!(Action::parse(" MANAGE_ROLES "), Some(Action::ManageRoles));
        assert_eq!(Action::parse("archive"), None);
    }

    #[test]
    fn test_as_str_roundtrips() {
        for action in Action::all() {
            assert_eq!(Action::parse(action.as_str()), Some(*action));
        }
    }

    #[test]
    fn test_is_manage() {
        assert!(Action::ManageMedia.is_manage());
        assert!(!Action::Publish.is_manage());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Action::ManageUsers).unwrap_or_default();
        assert_eq!(json, "\"MANAGE_USERS\"");
    }

    #[test]
    fn test_from_str_error() {
        let err = "fly".parse::<Action>().err();
        assert!(matches!(err, Some(crate::Error::Validation(_))));
    }
}
