use crate::access;
use crate::audit::{self, AuditAction, AuditRecord, AuditSink, AuditTarget};
use crate::errors::{Error, Result};
use crate::store::{SecretStore, UserDirectory, VaultStore};
use crate::types::{
    validate_component, CreateVaultRequest, PermissionLevel, ShareVaultRequest,
    UpdateVaultRequest, Vault,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Vault lifecycle and sharing operations.
///
/// Collaborators are passed in explicitly at construction; the service holds
/// no process-wide state of its own.
pub struct VaultService {
    vaults: Arc<dyn VaultStore>,
    secrets: Arc<dyn SecretStore>,
    users: Arc<dyn UserDirectory>,
    audit: Arc<dyn AuditSink>,
}

impl VaultService {
    pub fn new(
        vaults: Arc<dyn VaultStore>,
        secrets: Arc<dyn SecretStore>,
        users: Arc<dyn UserDirectory>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            vaults,
            secrets,
            users,
            audit,
        }
    }

    fn fetch(&self, vault_id: &str) -> Result<Vault> {
        self.vaults.get(vault_id)?.ok_or(Error::VaultNotFound)
    }

    /// Creates a vault with an empty sharing map.
    pub fn create_vault(&self, owner_id: &str, req: CreateVaultRequest) -> Result<Vault> {
        validate_component(owner_id, "owner id")?;
        validate_component(&req.name, "vault name")?;

        let mut vault = Vault::new(Uuid::new_v4().to_string(), owner_id, req.name);
        vault.description = req.description;
        vault.tags = req.tags;
        self.vaults.upsert(vault.clone())?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(owner_id, AuditAction::VaultCreate, AuditTarget::Vault, &vault.id)
                .with_details(json!({
                    "name": vault.name,
                    "description": vault.description,
                    "tags": vault.tags,
                })),
        );
        Ok(vault)
    }

    /// Returns the vault if the requester is the owner or holds any grant.
    pub fn get_vault(&self, user_id: &str, vault_id: &str) -> Result<Vault> {
        let vault = self.fetch(vault_id)?;
        access::evaluate(&vault, user_id, PermissionLevel::Read)?;
        Ok(vault)
    }

    /// Lists vaults owned by the user.
    pub fn list_vaults(&self, user_id: &str) -> Result<Vec<Vault>> {
        self.vaults.list_by_owner(user_id)
    }

    /// Applies a metadata patch; owner only.
    pub fn update_vault(
        &self,
        user_id: &str,
        vault_id: &str,
        req: UpdateVaultRequest,
    ) -> Result<Vault> {
        let mut vault = self.fetch(vault_id)?;
        access::require_owner(&vault, user_id)?;

        if let Some(name) = req.name {
            validate_component(&name, "vault name")?;
            vault.name = name;
        }
        if let Some(description) = req.description {
            vault.description = Some(description);
        }
        if let Some(tags) = req.tags {
            vault.tags = tags;
        }
        vault.updated_at = Utc::now();
        self.vaults.upsert(vault.clone())?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(user_id, AuditAction::VaultUpdate, AuditTarget::Vault, vault_id)
                .with_details(json!({
                    "updated_name": vault.name,
                    "updated_description": vault.description,
                    "updated_tags": vault.tags,
                })),
        );
        Ok(vault)
    }

    /// Deletes the vault and every secret in it; owner only.
    pub fn delete_vault(&self, user_id: &str, vault_id: &str) -> Result<()> {
        let vault = self.fetch(vault_id)?;
        access::require_owner(&vault, user_id)?;

        // Secrets go first so a partial failure never leaves orphans behind
        // an already-deleted vault record.
        self.secrets.delete_by_vault(vault_id)?;
        self.vaults.delete(vault_id)?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(user_id, AuditAction::VaultDelete, AuditTarget::Vault, vault_id)
                .with_details(json!({ "deleted_vault_name": vault.name })),
        );
        Ok(())
    }

    /// Grants one permission level to a batch of users at once.
    ///
    /// Self-shares and unknown users are skipped per target rather than
    /// failing the batch; the ids actually granted are returned, each with
    /// its own audit record. A non-empty request that grants nobody is an
    /// error, reported as [`Error::CannotShareWithSelf`] when the batch was a
    /// lone self-share and [`Error::NoShareTargets`] otherwise.
    pub fn share_vault(
        &self,
        owner_id: &str,
        vault_id: &str,
        req: ShareVaultRequest,
    ) -> Result<Vec<String>> {
        let mut vault = self.fetch(vault_id)?;
        access::require_owner(&vault, owner_id)?;
        let level: PermissionLevel = req.permission_level.parse()?;

        let mut granted = Vec::new();
        for target in &req.user_ids {
            if access::validate_share_target(&vault, target).is_err() {
                tracing::warn!(vault = %vault_id, "skipping attempt to share a vault with its owner");
                continue;
            }
            if !self.users.exists(target)? {
                tracing::warn!(vault = %vault_id, user = %target, "skipping unknown share target");
                continue;
            }
            vault.shared_with.insert(target.clone(), level);
            granted.push(target.clone());
        }

        if granted.is_empty() {
            if req.user_ids.is_empty() {
                return Ok(granted);
            }
            if req.user_ids.iter().all(|target| target == owner_id) {
                return Err(Error::CannotShareWithSelf);
            }
            return Err(Error::NoShareTargets);
        }

        vault.updated_at = Utc::now();
        self.vaults.upsert(vault)?;

        for target in &granted {
            audit::record(
                self.audit.as_ref(),
                AuditRecord::new(owner_id, AuditAction::VaultShare, AuditTarget::Vault, vault_id)
                    .with_details(json!({
                        "shared_with_user_id": target,
                        "permission_level": level.as_str(),
                    })),
            );
        }
        Ok(granted)
    }

    /// Changes the level of an existing grant; owner only.
    pub fn update_share_permission(
        &self,
        owner_id: &str,
        vault_id: &str,
        target: &str,
        permission_level: &str,
    ) -> Result<()> {
        let mut vault = self.fetch(vault_id)?;
        access::require_owner(&vault, owner_id)?;
        access::validate_existing_grant(&vault, target)?;
        let level: PermissionLevel = permission_level.parse()?;

        vault.shared_with.insert(target.to_string(), level);
        vault.updated_at = Utc::now();
        self.vaults.upsert(vault)?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(
                owner_id,
                AuditAction::VaultShareUpdatePermission,
                AuditTarget::Vault,
                vault_id,
            )
            .with_details(json!({
                "target_user_id": target,
                "new_permission_level": level.as_str(),
            })),
        );
        Ok(())
    }

    /// Revokes an existing grant; owner only.
    pub fn remove_share(&self, owner_id: &str, vault_id: &str, target: &str) -> Result<()> {
        let mut vault = self.fetch(vault_id)?;
        access::require_owner(&vault, owner_id)?;
        access::validate_existing_grant(&vault, target)?;

        vault.shared_with.remove(target);
        vault.updated_at = Utc::now();
        self.vaults.upsert(vault)?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(
                owner_id,
                AuditAction::VaultShareRemove,
                AuditTarget::Vault,
                vault_id,
            )
            .with_details(json!({ "removed_user_id": target })),
        );
        Ok(())
    }
}
