//! Integration tests for role management, the integrity guard and the
//! `SQLite` store.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rolegate::security::{DependentCounter, ensure_no_dependents};
use rolegate::{
    Action, ActorResolver, Authorizer, BaseRole, DefaultPermissionMatrix, Error, PermissionEngine,
    PermissionId, RoleCreate, RoleService, SqliteAuthzStore, UserStore,
};

fn seeded_store() -> Arc<SqliteAuthzStore> {
    let store = SqliteAuthzStore::in_memory().unwrap();
    store.seed(&DefaultPermissionMatrix::standard()).unwrap();
    Arc::new(store)
}

fn permission_id(service: &RoleService, action: Action, resource: &str) -> PermissionId {
    service
        .list_permissions()
        .unwrap()
        .into_iter()
        .find(|p| p.key().matches(action, resource))
        .map(|p| p.id)
        .unwrap()
}

fn authorizer(store: Arc<SqliteAuthzStore>) -> Authorizer {
    Authorizer::new(ActorResolver::new(store), PermissionEngine::new())
}

fn allowed(authz: &Authorizer, user: &str, action: Action, resource: &str) -> bool {
    authz.has_permission(user, action, resource).unwrap()
}

#[test]
fn test_custom_role_extends_base_role() {
    let store = seeded_store();
    let service = RoleService::new(store.clone());
    let authz = authorizer(store);

    let delete_media = permission_id(&service, Action::Delete, "media");
    let role = service
        .create_role(RoleCreate::new("media-cleaner").with_permissions([delete_media]))
        .unwrap();

    service.upsert_base_user("v-1", BaseRole::Viewer).unwrap();
    service.upsert_base_user("e-1", BaseRole::Editor).unwrap();

    // VIEWER without a custom role cannot delete media; EDITOR can by default.
    assert!(!allowed(&authz, "v-1", Action::Delete, "media"));
    assert!(allowed(&authz, "e-1", Action::Delete, "media"));

    service.assign_custom_role("v-1", Some(&role.id)).unwrap();
    assert!(allowed(&authz, "v-1", Action::Delete, "media"));
    // Base-role defaults still apply alongside the custom role.
    assert!(allowed(&authz, "v-1", Action::Read, "posts"));
    assert!(!allowed(&authz, "v-1", Action::Update, "posts"));
}

#[test]
fn test_deactivated_custom_role_grants_nothing() {
    let store = seeded_store();
    let service = RoleService::new(store.clone());
    let authz = authorizer(store);

    let update_posts = permission_id(&service, Action::Update, "posts");
    let role = service
        .create_role(RoleCreate::new("copy-editor").with_permissions([update_posts]))
        .unwrap();
    service.upsert_base_user("v", BaseRole::Viewer).unwrap();
    service.assign_custom_role("v", Some(&role.id)).unwrap();
    assert!(allowed(&authz, "v", Action::Update, "posts"));

    service
        .update_role(
            &role.id,
            rolegate::RoleUpdate {
                is_active: Some(false),
                ..rolegate::RoleUpdate::default()
            },
        )
        .unwrap();
    assert!(!allowed(&authz, "v", Action::Update, "posts"));
}

#[test]
fn test_role_delete_guard_sequence() {
    let store = seeded_store();
    let service = RoleService::new(store.clone());

    let role = service.create_role(RoleCreate::new("reviewer")).unwrap();
    service.upsert_base_user("u-1", BaseRole::Editor).unwrap();
    service.assign_custom_role("u-1", Some(&role.id)).unwrap();

    let err = service.delete_role(&role.id).unwrap_err();
    assert!(matches!(err, Error::RoleInUse { assigned: 1, .. }));
    assert_eq!(err.kind().http_status(), 409);
    assert!(service.get_role(&role.id).unwrap().is_some());

    service.assign_custom_role("u-1", None).unwrap();
    let deleted = service.delete_role(&role.id).unwrap();
    assert_eq!(deleted.name, "reviewer");
    assert!(service.get_role(&role.id).unwrap().is_none());
    let err = service.delete_role(&role.id).unwrap_err();
    assert_eq!(err.kind().http_status(), 404);

    let actor = store.load_actor("u-1").unwrap().unwrap();
    assert!(actor.custom_role.is_none());
}

#[test]
fn test_system_roles_never_mutate() {
    let store = seeded_store();
    let service = RoleService::new(store);

    for name in ["administrator", "editor", "viewer"] {
        let role = service.find_role_by_name(name).unwrap().unwrap();
        assert!(role.is_system);

        let err = service.delete_role(&role.id).unwrap_err();
        assert!(matches!(err, Error::SystemRoleProtected { .. }), "{name}");

        let err = service.set_role_permissions(&role.id, &[]).unwrap_err();
        assert!(matches!(err, Error::SystemRoleProtected { .. }), "{name}");

        let unchanged = service.get_role(&role.id).unwrap().unwrap();
        assert_eq!(unchanged.permissions, role.permissions);
    }
}

#[test]
fn test_category_style_dependents() {
    let posts_per_category = |id: &str| -> rolegate::Result<usize> {
        Ok(match id {
            "news" => 3,
            _ => 0,
        })
    };
    let query = DependentCounter::new("category", posts_per_category);

    let err = ensure_no_dependents(&query, "news").unwrap_err();
    assert!(matches!(
        err,
        Error::InUse {
            entity: "category",
            dependents: 3,
            ..
        }
    ));
    assert!(ensure_no_dependents(&query, "empty").is_ok());
}

/// Readers on their own connections never observe a partially replaced
/// grant set while another thread repeatedly swaps a role between two
/// disjoint permission sets.
#[test]
fn test_permission_replace_is_atomic_for_readers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolegate.db");

    let store = Arc::new(SqliteAuthzStore::new(&path).unwrap());
    store.seed(&DefaultPermissionMatrix::standard()).unwrap();
    let service = RoleService::new(store);

    let set_a = [
        permission_id(&service, Action::Create, "media"),
        permission_id(&service, Action::Delete, "media"),
    ];
    let set_b = [
        permission_id(&service, Action::Create, "pages"),
        permission_id(&service, Action::Delete, "pages"),
    ];
    let role = service
        .create_role(RoleCreate::new("rotating").with_permissions(set_a))
        .unwrap();
    service.upsert_base_user("r-1", BaseRole::Viewer).unwrap();
    service.assign_custom_role("r-1", Some(&role.id)).unwrap();

    let reader_stores: Vec<_> = (0..4)
        .map(|_| SqliteAuthzStore::new(&path).unwrap())
        .collect();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let role_id = role.id;
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..200 {
                let ids = if i % 2 == 0 { &set_b } else { &set_a };
                service.set_role_permissions(&role_id, ids).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = reader_stores
        .into_iter()
        .map(|store| {
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let engine = PermissionEngine::new();
                let mut observed = 0;
                while !done.load(Ordering::SeqCst) || observed == 0 {
                    let actor = store.load_actor("r-1").unwrap().unwrap();
                    let grants = &actor.custom_role.as_ref().unwrap().permissions;
                    assert_eq!(grants.len(), 2, "partial grant set observed: {grants:?}");

                    let media = engine.has_all_permissions(
                        Some(&actor),
                        &[(Action::Create, "media"), (Action::Delete, "media")],
                    );
                    let pages = engine.has_all_permissions(
                        Some(&actor),
                        &[(Action::Create, "pages"), (Action::Delete, "pages")],
                    );
                    assert!(media ^ pages, "mixed grant set observed");
                    observed += 1;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

/// Two store instances on the same file see each other's committed grant
/// replacements, never the emptied intermediate state.
#[test]
fn test_permission_replace_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rolegate.db");

    let store = Arc::new(SqliteAuthzStore::new(&path).unwrap());
    store.seed(&DefaultPermissionMatrix::standard()).unwrap();
    let service = RoleService::new(store);

    let set_a = [
        permission_id(&service, Action::Read, "analytics"),
        permission_id(&service, Action::Update, "pages"),
    ];
    let set_b = [
        permission_id(&service, Action::Read, "users"),
        permission_id(&service, Action::Update, "media"),
    ];
    let role = service
        .create_role(RoleCreate::new("shifting").with_permissions(set_a))
        .unwrap();
    service.upsert_base_user("r-1", BaseRole::Viewer).unwrap();
    service.assign_custom_role("r-1", Some(&role.id)).unwrap();

    let reader_store = SqliteAuthzStore::new(&path).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let done = Arc::clone(&done);
        let role_id = role.id;
        thread::spawn(move || {
            for i in 0..100 {
                let ids = if i % 2 == 0 { &set_b } else { &set_a };
                service.set_role_permissions(&role_id, ids).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    while !done.load(Ordering::SeqCst) {
        let actor = reader_store.load_actor("r-1").unwrap().unwrap();
        assert_eq!(actor.custom_role.unwrap().permissions.len(), 2);
    }
    writer.join().unwrap();

    let actor = reader_store.load_actor("r-1").unwrap().unwrap();
    let grant = actor.custom_role.unwrap();
    assert!(grant.allows(Action::Read, "analytics"));
    assert!(grant.allows(Action::Update, "pages"));
}
