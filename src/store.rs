//! Narrow storage seams the core depends on, plus in-memory implementations.
//!
//! The production system keeps vaults and secrets in a managed document
//! store; the core only ever asks a collaborator to store, fetch, or delete
//! whole records. Sharing-map mutations go through `upsert` as full-record
//! replaces, which makes concurrent mutations on the same vault
//! last-write-wins by construction.

use crate::audit::{AuditRecord, AuditSink};
use crate::errors::{Error, Result};
use crate::types::{Secret, Vault};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Vault persistence seam.
pub trait VaultStore: Send + Sync {
    fn get(&self, vault_id: &str) -> Result<Option<Vault>>;
    /// Stores the record as-is, replacing any existing one with the same id.
    fn upsert(&self, vault: Vault) -> Result<()>;
    fn delete(&self, vault_id: &str) -> Result<()>;
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Vault>>;
}

/// Secret persistence seam. Secrets live under their vault, so every lookup
/// is addressed by the `(vault, secret)` pair.
pub trait SecretStore: Send + Sync {
    fn get(&self, vault_id: &str, secret_id: &str) -> Result<Option<Secret>>;
    fn upsert(&self, secret: Secret) -> Result<()>;
    fn delete(&self, vault_id: &str, secret_id: &str) -> Result<()>;
    fn list_by_vault(&self, vault_id: &str) -> Result<Vec<Secret>>;
    /// Removes every secret in the vault; used when the vault is deleted.
    fn delete_by_vault(&self, vault_id: &str) -> Result<()>;
}

/// Lookup seam for share targets: the sharing flow skips users the identity
/// provider does not know about.
pub trait UserDirectory: Send + Sync {
    fn exists(&self, user_id: &str) -> Result<bool>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Storage("in-memory store mutex poisoned".into()))
}

/// In-memory [`VaultStore`] for tests and embedded use.
#[derive(Default)]
pub struct MemoryVaultStore {
    inner: Mutex<HashMap<String, Vault>>,
}

impl VaultStore for MemoryVaultStore {
    fn get(&self, vault_id: &str) -> Result<Option<Vault>> {
        Ok(lock(&self.inner)?.get(vault_id).cloned())
    }

    fn upsert(&self, vault: Vault) -> Result<()> {
        lock(&self.inner)?.insert(vault.id.clone(), vault);
        Ok(())
    }

    fn delete(&self, vault_id: &str) -> Result<()> {
        lock(&self.inner)?.remove(vault_id);
        Ok(())
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Vault>> {
        let mut vaults: Vec<Vault> = lock(&self.inner)?
            .values()
            .filter(|vault| vault.owner_id == owner_id)
            .cloned()
            .collect();
        vaults.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(vaults)
    }
}

/// In-memory [`SecretStore`] keyed by vault, mirroring the subcollection
/// layout of the document store.
#[derive(Default)]
pub struct MemorySecretStore {
    inner: Mutex<HashMap<String, HashMap<String, Secret>>>,
}

impl SecretStore for MemorySecretStore {
    fn get(&self, vault_id: &str, secret_id: &str) -> Result<Option<Secret>> {
        Ok(lock(&self.inner)?
            .get(vault_id)
            .and_then(|secrets| secrets.get(secret_id))
            .cloned())
    }

    fn upsert(&self, secret: Secret) -> Result<()> {
        lock(&self.inner)?
            .entry(secret.vault_id.clone())
            .or_default()
            .insert(secret.id.clone(), secret);
        Ok(())
    }

    fn delete(&self, vault_id: &str, secret_id: &str) -> Result<()> {
        if let Some(secrets) = lock(&self.inner)?.get_mut(vault_id) {
            secrets.remove(secret_id);
        }
        Ok(())
    }

    fn list_by_vault(&self, vault_id: &str) -> Result<Vec<Secret>> {
        let mut secrets: Vec<Secret> = lock(&self.inner)?
            .get(vault_id)
            .map(|secrets| secrets.values().cloned().collect())
            .unwrap_or_default();
        secrets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(secrets)
    }

    fn delete_by_vault(&self, vault_id: &str) -> Result<()> {
        lock(&self.inner)?.remove(vault_id);
        Ok(())
    }
}

/// In-memory [`UserDirectory`] seeded with known user ids.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: Mutex<HashSet<String>>,
}

impl MemoryUserDirectory {
    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: Mutex::new(users.into_iter().map(Into::into).collect()),
        }
    }

    pub fn add(&self, user_id: impl Into<String>) {
        if let Ok(mut users) = self.users.lock() {
            users.insert(user_id.into());
        }
    }
}

impl UserDirectory for MemoryUserDirectory {
    fn exists(&self, user_id: &str) -> Result<bool> {
        Ok(lock(&self.users)?.contains(user_id))
    }
}

/// In-memory [`AuditSink`] that retains records for inspection.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, record: AuditRecord) -> Result<()> {
        lock(&self.records)?.push(record);
        Ok(())
    }
}
