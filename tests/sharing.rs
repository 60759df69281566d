use std::sync::Arc;
use vaultify_core::{
    AuditAction, CreateVaultRequest, Error, MemoryAuditLog, MemorySecretStore,
    MemoryUserDirectory, MemoryVaultStore, PermissionLevel, ShareVaultRequest, VaultService,
    VaultStore,
};

struct Harness {
    vaults: Arc<MemoryVaultStore>,
    audit: Arc<MemoryAuditLog>,
    service: VaultService,
}

fn harness() -> Harness {
    let vaults = Arc::new(MemoryVaultStore::default());
    let secrets = Arc::new(MemorySecretStore::default());
    let users = Arc::new(MemoryUserDirectory::with_users(["u1", "u2", "u3"]));
    let audit = Arc::new(MemoryAuditLog::default());
    let service = VaultService::new(
        vaults.clone(),
        secrets.clone(),
        users,
        audit.clone(),
    );
    Harness {
        vaults,
        audit,
        service,
    }
}

fn create_vault(h: &Harness, owner: &str) -> String {
    h.service
        .create_vault(
            owner,
            CreateVaultRequest {
                name: "infra".into(),
                description: None,
                tags: vec![],
            },
        )
        .unwrap()
        .id
}

fn share(user_ids: &[&str], level: &str) -> ShareVaultRequest {
    ShareVaultRequest {
        user_ids: user_ids.iter().map(|s| s.to_string()).collect(),
        permission_level: level.into(),
    }
}

#[test]
fn batch_share_grants_and_audits_each_target() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    let granted = h
        .service
        .share_vault("u1", &vault_id, share(&["u2", "u3"], "read"))
        .unwrap();
    assert_eq!(granted, vec!["u2".to_string(), "u3".to_string()]);

    let vault = h.vaults.get(&vault_id).unwrap().unwrap();
    assert_eq!(vault.shared_with.get("u2"), Some(&PermissionLevel::Read));
    assert_eq!(vault.shared_with.get("u3"), Some(&PermissionLevel::Read));
    assert!(!vault.shared_with.contains_key("u1"));

    let shares: Vec<_> = h
        .audit
        .records()
        .into_iter()
        .filter(|r| r.action == AuditAction::VaultShare)
        .collect();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].details["permission_level"], "read");
}

#[test]
fn batch_share_skips_self_and_unknown_targets() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    let granted = h
        .service
        .share_vault("u1", &vault_id, share(&["u1", "ghost", "u2"], "write"))
        .unwrap();
    assert_eq!(granted, vec!["u2".to_string()]);

    let vault = h.vaults.get(&vault_id).unwrap().unwrap();
    assert_eq!(vault.shared_with.len(), 1);
    assert_eq!(vault.shared_with.get("u2"), Some(&PermissionLevel::Write));
}

#[test]
fn share_with_nobody_valid_is_an_error() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    assert!(matches!(
        h.service.share_vault("u1", &vault_id, share(&["u1"], "read")),
        Err(Error::CannotShareWithSelf)
    ));
    assert!(matches!(
        h.service
            .share_vault("u1", &vault_id, share(&["ghost", "phantom"], "read")),
        Err(Error::NoShareTargets)
    ));
    // An empty batch is a no-op, not an error.
    assert_eq!(
        h.service.share_vault("u1", &vault_id, share(&[], "read")).unwrap(),
        Vec::<String>::new()
    );
}

#[test]
fn share_rejects_unknown_permission_levels() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    assert!(matches!(
        h.service.share_vault("u1", &vault_id, share(&["u2"], "admin")),
        Err(Error::InvalidPermissionLevel(level)) if level == "admin"
    ));
}

#[test]
fn sharing_is_owner_only() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");
    h.service
        .share_vault("u1", &vault_id, share(&["u2"], "write"))
        .unwrap();

    // Even a write grantee cannot manage sharing.
    assert!(matches!(
        h.service.share_vault("u2", &vault_id, share(&["u3"], "read")),
        Err(Error::Forbidden)
    ));
    assert!(matches!(
        h.service.remove_share("u2", &vault_id, "u2"),
        Err(Error::Forbidden)
    ));
}

#[test]
fn update_and_remove_require_an_existing_grant() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    assert!(matches!(
        h.service.update_share_permission("u1", &vault_id, "u2", "write"),
        Err(Error::NotShared { user }) if user == "u2"
    ));
    assert!(matches!(
        h.service.remove_share("u1", &vault_id, "u2"),
        Err(Error::NotShared { user }) if user == "u2"
    ));

    h.service
        .share_vault("u1", &vault_id, share(&["u2"], "read"))
        .unwrap();
    h.service
        .update_share_permission("u1", &vault_id, "u2", "write")
        .unwrap();
    let vault = h.vaults.get(&vault_id).unwrap().unwrap();
    assert_eq!(vault.shared_with.get("u2"), Some(&PermissionLevel::Write));

    h.service.remove_share("u1", &vault_id, "u2").unwrap();
    let vault = h.vaults.get(&vault_id).unwrap().unwrap();
    assert!(vault.shared_with.is_empty());

    let actions: Vec<_> = h.audit.records().iter().map(|r| r.action).collect();
    assert!(actions.contains(&AuditAction::VaultShareUpdatePermission));
    assert!(actions.contains(&AuditAction::VaultShareRemove));
}

#[test]
fn owner_cannot_be_a_grant_mutation_target() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    assert!(matches!(
        h.service.update_share_permission("u1", &vault_id, "u1", "read"),
        Err(Error::CannotShareWithSelf)
    ));
    assert!(matches!(
        h.service.remove_share("u1", &vault_id, "u1"),
        Err(Error::CannotShareWithSelf)
    ));
}

#[test]
fn vault_metadata_and_deletion_are_owner_only() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");
    h.service
        .share_vault("u1", &vault_id, share(&["u2"], "write"))
        .unwrap();

    assert!(matches!(
        h.service.update_vault("u2", &vault_id, Default::default()),
        Err(Error::Forbidden)
    ));
    assert!(matches!(
        h.service.delete_vault("u2", &vault_id),
        Err(Error::Forbidden)
    ));

    h.service.delete_vault("u1", &vault_id).unwrap();
    assert!(matches!(
        h.service.get_vault("u1", &vault_id),
        Err(Error::VaultNotFound)
    ));
}

#[test]
fn grantees_can_read_the_vault_record() {
    let h = harness();
    let vault_id = create_vault(&h, "u1");

    assert!(matches!(
        h.service.get_vault("u2", &vault_id),
        Err(Error::Forbidden)
    ));
    h.service
        .share_vault("u1", &vault_id, share(&["u2"], "read"))
        .unwrap();
    assert_eq!(h.service.get_vault("u2", &vault_id).unwrap().id, vault_id);
}
