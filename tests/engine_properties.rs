//! Property-based tests for permission resolution.
//!
//! - ADMIN is allowed everything, including unknown resources
//! - No actor is denied everything
//! - `has_any`/`has_all` agree with `has_permission`
//! - Snapshots agree with the engine

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use rolegate::models::resource;
use rolegate::{
    Action, Actor, BaseRole, CustomRoleGrant, PermissionEngine, PermissionKey, PermissionSnapshot,
};

fn action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::all().to_vec())
}

fn base_role() -> impl Strategy<Value = BaseRole> {
    prop::sample::select(BaseRole::all().to_vec())
}

/// Known resources plus arbitrary lowercase names.
fn resource_name() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(resource::ALL.to_vec()).prop_map(str::to_string),
        "[a-z_]{1,12}",
    ]
}

fn pair() -> impl Strategy<Value = (Action, String)> {
    (action(), resource_name())
}

fn custom_role() -> impl Strategy<Value = Option<CustomRoleGrant>> {
    prop::option::of(
        (prop::collection::vec(pair(), 0..6), any::<bool>()).prop_map(|(pairs, active)| {
            let mut grant = CustomRoleGrant::new(
                "r-prop",
                "prop-role",
                pairs.into_iter().map(|(a, r)| PermissionKey::new(a, r)),
            );
            grant.is_active = active;
            grant
        }),
    )
}

fn actor() -> impl Strategy<Value = Actor> {
    (base_role(), custom_role(), any::<bool>()).prop_map(|(role, custom, active)| {
        let mut actor = Actor::new("u-prop", role);
        actor.custom_role = custom;
        actor.is_active = active;
        actor
    })
}

proptest! {
    /// Property: ADMIN is allowed every action on every resource.
    #[test]
    fn prop_admin_bypass(action in action(), resource in resource_name(), custom in custom_role()) {
        let engine = PermissionEngine::new();
        let mut admin = Actor::new("root", BaseRole::Admin);
        admin.custom_role = custom;

        prop_assert!(engine.has_permission(Some(&admin), action, &resource));
        prop_assert!(engine.require_permission(Some(&admin), action, &resource).is_ok());
    }

    /// Property: a missing actor is denied everything.
    #[test]
    fn prop_no_actor_denied(action in action(), resource in resource_name()) {
        let engine = PermissionEngine::new();
        prop_assert!(!engine.has_permission(None, action, &resource));
        prop_assert!(!PermissionEngine::is_admin(None));
    }

    /// Property: `has_any_permission` is the disjunction of `has_permission`.
    #[test]
    fn prop_any_matches_single_checks(actor in actor(), pairs in prop::collection::vec(pair(), 0..6)) {
        let engine = PermissionEngine::new();
        let refs: Vec<(Action, &str)> = pairs.iter().map(|(a, r)| (*a, r.as_str())).collect();

        let expected = refs.iter().any(|(a, r)| engine.has_permission(Some(&actor), *a, r));
        prop_assert_eq!(engine.has_any_permission(Some(&actor), &refs), expected);
    }

    /// Property: `has_all_permissions` is the conjunction of `has_permission`.
    #[test]
    fn prop_all_matches_single_checks(actor in actor(), pairs in prop::collection::vec(pair(), 0..6)) {
        let engine = PermissionEngine::new();
        let refs: Vec<(Action, &str)> = pairs.iter().map(|(a, r)| (*a, r.as_str())).collect();

        let expected = refs.iter().all(|(a, r)| engine.has_permission(Some(&actor), *a, r));
        prop_assert_eq!(engine.has_all_permissions(Some(&actor), &refs), expected);
    }

    /// Property: `require_permission` fails exactly when `has_permission` is false.
    #[test]
    fn prop_require_agrees_with_has(actor in actor(), action in action(), resource in resource_name()) {
        let engine = PermissionEngine::new();
        let allowed = engine.has_permission(Some(&actor), action, &resource);
        let required = engine.require_permission(Some(&actor), action, &resource);

        prop_assert_eq!(required.is_ok(), allowed);
        if let Err(err) = required {
            prop_assert_eq!(err.to_string(), "forbidden");
        }
    }

    /// Property: an inactive custom role never adds a grant.
    #[test]
    fn prop_inactive_custom_role_adds_nothing(actor in actor(), action in action(), resource in resource_name()) {
        let engine = PermissionEngine::new();
        let mut inactive = actor.clone();
        if let Some(grant) = inactive.custom_role.as_mut() {
            grant.is_active = false;
        }
        let mut bare = actor;
        bare.custom_role = None;

        prop_assert_eq!(
            engine.has_permission(Some(&inactive), action, &resource),
            engine.has_permission(Some(&bare), action, &resource)
        );
    }

    /// Property: a captured snapshot answers exactly as the engine does.
    #[test]
    fn prop_snapshot_mirrors_engine(actor in actor(), action in action(), resource in resource_name()) {
        let engine = PermissionEngine::new();
        let snapshot = PermissionSnapshot::capture(&actor, &engine);

        prop_assert_eq!(
            snapshot.has_permission(action, &resource),
            engine.has_permission(Some(&actor), action, &resource)
        );
    }
}

#[test]
fn test_empty_lists() {
    let engine = PermissionEngine::new();
    let viewer = Actor::new("v", BaseRole::Viewer);

    assert!(!engine.has_any_permission(Some(&viewer), &[]));
    assert!(engine.has_all_permissions(Some(&viewer), &[]));
    assert!(engine.has_all_permissions(None, &[]));
}
