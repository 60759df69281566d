use crate::access;
use crate::audit::{self, AuditAction, AuditRecord, AuditSink, AuditTarget};
use crate::crypto::{self, EncryptionKey};
use crate::errors::{Error, Result};
use crate::store::{SecretStore, VaultStore};
use crate::types::{
    validate_component, CreateSecretRequest, PermissionLevel, Secret, SecretListItem,
    UpdateSecretRequest, Vault,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Secret lifecycle operations.
///
/// Every operation resolves the vault, asks the access evaluator for a
/// verdict at the required level, and only on success touches the cipher.
/// Values are encrypted before they reach the store and decrypted only on an
/// explicit read; listings never decrypt.
pub struct SecretService {
    secrets: Arc<dyn SecretStore>,
    vaults: Arc<dyn VaultStore>,
    audit: Arc<dyn AuditSink>,
    key: EncryptionKey,
}

impl SecretService {
    /// The key is decoded and length-checked before it gets here; see
    /// [`EncryptionKey`]. A bad key is a construction-time failure for the
    /// caller, never a per-request one.
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        vaults: Arc<dyn VaultStore>,
        audit: Arc<dyn AuditSink>,
        key: EncryptionKey,
    ) -> Self {
        Self {
            secrets,
            vaults,
            audit,
            key,
        }
    }

    fn check_vault_access(
        &self,
        user_id: &str,
        vault_id: &str,
        required: PermissionLevel,
    ) -> Result<Vault> {
        let vault = self.vaults.get(vault_id)?.ok_or(Error::VaultNotFound)?;
        access::evaluate(&vault, user_id, required)?;
        Ok(vault)
    }

    /// Encrypts and stores a new secret; requires write access to the vault.
    pub fn create_secret(
        &self,
        user_id: &str,
        vault_id: &str,
        req: CreateSecretRequest,
    ) -> Result<Secret> {
        self.check_vault_access(user_id, vault_id, PermissionLevel::Write)?;
        validate_component(&req.name, "secret name")?;

        let encrypted_value =
            crypto::encrypt(&req.value, self.key.as_bytes()).map_err(Error::EncryptionFailed)?;
        let now = Utc::now();
        let secret = Secret {
            id: Uuid::new_v4().to_string(),
            vault_id: vault_id.to_string(),
            name: req.name,
            kind: req.kind,
            encrypted_value,
            expires_at: req.expires_at,
            created_at: now,
            updated_at: now,
        };
        self.secrets.upsert(secret.clone())?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(user_id, AuditAction::SecretCreate, AuditTarget::Secret, &secret.id)
                .with_details(json!({
                    "vault_id": vault_id,
                    "secret_name": secret.name,
                    "secret_type": secret.kind,
                })),
        );
        Ok(secret)
    }

    /// Fetches a secret and decrypts its value; requires read access.
    ///
    /// Cipher failures are collapsed to [`Error::DecryptionFailed`]: the data
    /// is corrupted or the key is wrong, and telling callers which padding or
    /// format check tripped would only feed a decryption oracle.
    pub fn get_secret(
        &self,
        user_id: &str,
        vault_id: &str,
        secret_id: &str,
    ) -> Result<(Secret, String)> {
        self.check_vault_access(user_id, vault_id, PermissionLevel::Read)?;
        let secret = self
            .secrets
            .get(vault_id, secret_id)?
            .ok_or(Error::SecretNotFound)?;

        let value = crypto::decrypt(&secret.encrypted_value, self.key.as_bytes())
            .map_err(Error::DecryptionFailed)?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(user_id, AuditAction::SecretAccess, AuditTarget::Secret, secret_id)
                .with_details(json!({
                    "vault_id": vault_id,
                    "secret_name": secret.name,
                })),
        );
        Ok((secret, value))
    }

    /// Lists the vault's secrets without decrypting anything.
    pub fn list_secrets(&self, user_id: &str, vault_id: &str) -> Result<Vec<SecretListItem>> {
        self.check_vault_access(user_id, vault_id, PermissionLevel::Read)?;
        let secrets = self.secrets.list_by_vault(vault_id)?;
        Ok(secrets.iter().map(SecretListItem::from_secret).collect())
    }

    /// Applies a patch, re-encrypting when the value changes; requires write.
    pub fn update_secret(
        &self,
        user_id: &str,
        vault_id: &str,
        secret_id: &str,
        req: UpdateSecretRequest,
    ) -> Result<Secret> {
        self.check_vault_access(user_id, vault_id, PermissionLevel::Write)?;
        let mut secret = self
            .secrets
            .get(vault_id, secret_id)?
            .ok_or(Error::SecretNotFound)?;

        if let Some(name) = req.name {
            validate_component(&name, "secret name")?;
            secret.name = name;
        }
        if let Some(kind) = req.kind {
            secret.kind = kind;
        }
        if let Some(value) = req.value {
            secret.encrypted_value =
                crypto::encrypt(&value, self.key.as_bytes()).map_err(Error::EncryptionFailed)?;
        }
        if let Some(expires_at) = req.expires_at {
            secret.expires_at = Some(expires_at);
        }
        secret.updated_at = Utc::now();
        self.secrets.upsert(secret.clone())?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(user_id, AuditAction::SecretUpdate, AuditTarget::Secret, secret_id)
                .with_details(json!({
                    "vault_id": vault_id,
                    "secret_name": secret.name,
                })),
        );
        Ok(secret)
    }

    /// Deletes a secret; requires write access.
    pub fn delete_secret(&self, user_id: &str, vault_id: &str, secret_id: &str) -> Result<()> {
        self.check_vault_access(user_id, vault_id, PermissionLevel::Write)?;
        let secret = self
            .secrets
            .get(vault_id, secret_id)?
            .ok_or(Error::SecretNotFound)?;
        self.secrets.delete(vault_id, secret_id)?;

        audit::record(
            self.audit.as_ref(),
            AuditRecord::new(user_id, AuditAction::SecretDelete, AuditTarget::Secret, secret_id)
                .with_details(json!({
                    "vault_id": vault_id,
                    "secret_name": secret.name,
                })),
        );
        Ok(())
    }
}
