//! Audit trail records for mutating and decrypting actions.

use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    VaultCreate,
    VaultUpdate,
    VaultDelete,
    VaultShare,
    VaultShareUpdatePermission,
    VaultShareRemove,
    SecretCreate,
    SecretAccess,
    SecretUpdate,
    SecretDelete,
}

/// Kind of entity an audit record refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditTarget {
    Vault,
    Secret,
}

/// One audit trail event: who did what to which entity, when.
///
/// `details` carries action-specific context (names, grant levels, target
/// users) and must never contain plaintext secret values or key material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub action: AuditAction,
    pub target_type: AuditTarget,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl AuditRecord {
    pub fn new(
        user_id: impl Into<String>,
        action: AuditAction,
        target_type: AuditTarget,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: user_id.into(),
            action,
            target_type,
            target_id: target_id.into(),
            details: Value::Null,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Append-only destination for audit records.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: AuditRecord) -> Result<()>;
}

/// Appends a record, logging instead of failing if the sink rejects it.
/// Audit failures never abort the guarded operation.
pub(crate) fn record(sink: &dyn AuditSink, record: AuditRecord) {
    let action = record.action;
    let target = record.target_id.clone();
    if let Err(err) = sink.append(record) {
        tracing::warn!(?action, target = %target, error = %err, "failed to append audit record");
    }
}
