use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Validates that an identifier component is non-empty.
pub(crate) fn validate_component(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::EmptyComponent { field });
    }
    Ok(())
}

/// Access level granted to a non-owner on a shared vault.
///
/// The two levels form an ordered lattice: `Write` satisfies any requirement
/// that `Read` does, never the other way around.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
}

impl PermissionLevel {
    const fn rank(self) -> u8 {
        match self {
            Self::Read => 0,
            Self::Write => 1,
        }
    }

    /// Returns true when a grant at this level satisfies the required level.
    pub fn allows(self, required: PermissionLevel) -> bool {
        self.rank() >= required.rank()
    }

    /// Stable string representation used in audit details and storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            other => Err(Error::InvalidPermissionLevel(other.to_string())),
        }
    }
}

/// A named collection of secrets with one owner and explicit per-user grants.
///
/// The owner never appears in `shared_with`; ownership is implicit full
/// access and is enforced at the mutation boundary, not by storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vault {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub shared_with: BTreeMap<String, PermissionLevel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vault {
    /// Construct a vault with an empty sharing map.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            name: name.into(),
            description: None,
            tags: Vec::new(),
            shared_with: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A secret stored within a vault. `encrypted_value` is always a cipher
/// envelope string; the plaintext never touches storage or logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Secret {
    pub id: String,
    pub vault_id: String,
    pub name: String,
    /// Free-form type tag, e.g. "password", "certificate", "api_key".
    pub kind: String,
    pub encrypted_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view of a secret, without the encrypted payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretListItem {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecretListItem {
    pub fn from_secret(secret: &Secret) -> Self {
        Self {
            id: secret.id.clone(),
            name: secret.name.clone(),
            kind: secret.kind.clone(),
            created_at: secret.created_at,
            updated_at: secret.updated_at,
        }
    }
}

/// Request payload for creating a vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVaultRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Patch-style update for a vault; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVaultRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Batch share request: one owner granting one level to many users at once.
///
/// The level arrives as a raw string and is parsed at the mutation boundary,
/// so an unknown value is rejected before any target is processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareVaultRequest {
    pub user_ids: Vec<String>,
    pub permission_level: String,
}

/// Request payload for creating a secret. `value` is plaintext in flight and
/// is encrypted before it reaches any store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretRequest {
    pub name: String,
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Patch-style update for a secret; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSecretRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
