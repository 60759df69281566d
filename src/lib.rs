//! Core domain logic for a multi-tenant secrets vault.
//!
//! Two components carry the weight: the envelope cipher in [`crypto`], which
//! turns a plaintext and a 256-bit key into a transport-safe envelope string
//! and back, and the access evaluator in [`access`], which decides before
//! every cipher call whether the requesting identity may act on the vault at
//! the required level. The services in [`service`] wire those together with
//! narrow storage seams and an append-only audit trail.

pub mod access;
pub mod audit;
pub mod crypto;
pub mod errors;
pub mod service;
pub mod store;
pub mod types;

pub use access::evaluate;
pub use audit::{AuditAction, AuditRecord, AuditSink, AuditTarget};
pub use crypto::{decrypt, encrypt, EncryptionKey};
pub use errors::{CipherError, CipherResult, Error, Result};
pub use service::{SecretService, VaultService};
pub use store::{
    MemoryAuditLog, MemorySecretStore, MemoryUserDirectory, MemoryVaultStore, SecretStore,
    UserDirectory, VaultStore,
};
pub use types::{
    CreateSecretRequest, CreateVaultRequest, PermissionLevel, Secret, SecretListItem,
    ShareVaultRequest, UpdateSecretRequest, UpdateVaultRequest, Vault,
};
