//! Vault access evaluation and share-mutation validation.
//!
//! Every decision here is a pure function of the vault snapshot the caller
//! already fetched; nothing in this module touches storage. Concurrent
//! sharing mutations on the same vault are last-write-wins at the storage
//! layer, so a snapshot can be stale by the time its verdict is acted on —
//! that policy is accepted and owned by the calling layer.

use crate::errors::{Error, Result};
use crate::types::{PermissionLevel, Vault};

/// Decides whether `requester` may perform an operation requiring `required`
/// on the vault.
///
/// The owner holds implicit write access and is allowed unconditionally,
/// without consulting the sharing map. Anyone else needs an explicit grant at
/// or above the required level; a missing or insufficient grant is reported
/// as [`Error::Forbidden`] in both cases, so callers cannot distinguish
/// "never shared" from "shared too low".
pub fn evaluate(vault: &Vault, requester: &str, required: PermissionLevel) -> Result<()> {
    if vault.owner_id == requester {
        return Ok(());
    }

    match vault.shared_with.get(requester) {
        Some(granted) if granted.allows(required) => Ok(()),
        Some(granted) => {
            tracing::debug!(
                vault = %vault.id,
                granted = %granted,
                required = %required,
                "access denied: insufficient grant"
            );
            Err(Error::Forbidden)
        }
        None => {
            tracing::debug!(vault = %vault.id, required = %required, "access denied: no grant");
            Err(Error::Forbidden)
        }
    }
}

/// Requires that `requester` is the vault owner. Sharing-map mutations and
/// vault metadata changes are owner-only regardless of any explicit grant.
pub fn require_owner(vault: &Vault, requester: &str) -> Result<()> {
    if vault.owner_id != requester {
        tracing::debug!(vault = %vault.id, "access denied: owner-only operation");
        return Err(Error::Forbidden);
    }
    Ok(())
}

/// Validates a single share/update/remove target before the sharing map is
/// mutated.
///
/// The owner's implicit access must never be represented as an explicit map
/// entry, and must never be removable, so the owner is rejected as a target
/// outright.
pub fn validate_share_target(vault: &Vault, target: &str) -> Result<()> {
    if target == vault.owner_id {
        return Err(Error::CannotShareWithSelf);
    }
    Ok(())
}

/// Validates a mutation of an existing grant: the target must not be the
/// owner and must already be present in the sharing map.
pub fn validate_existing_grant(vault: &Vault, target: &str) -> Result<()> {
    validate_share_target(vault, target)?;
    if !vault.shared_with.contains_key(target) {
        return Err(Error::NotShared {
            user: target.to_string(),
        });
    }
    Ok(())
}
