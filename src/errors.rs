use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type CipherResult<T> = std::result::Result<T, CipherError>;

/// Failures surfaced by vault and secret operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("vault not found")]
    VaultNotFound,
    #[error("secret not found")]
    SecretNotFound,
    #[error("requester does not have permission for this action on the vault")]
    Forbidden,
    #[error("invalid permission level: {0}")]
    InvalidPermissionLevel(String),
    #[error("cannot share a vault with its owner")]
    CannotShareWithSelf,
    #[error("user {user} is not currently shared on the vault")]
    NotShared { user: String },
    #[error("no valid share targets in request")]
    NoShareTargets,
    #[error("{field} must not be empty")]
    EmptyComponent { field: &'static str },
    #[error("failed to encrypt secret value")]
    EncryptionFailed(#[source] CipherError),
    #[error("failed to decrypt secret value")]
    DecryptionFailed(#[source] CipherError),
    #[error("encryption key is invalid: {0}")]
    InvalidEncryptionKey(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Failures produced by the envelope cipher.
///
/// Every variant is a deterministic function of the input, so none of them is
/// retryable. Callers collapse the decode-side variants into a single
/// "decryption failed" signal before anything crosses an API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
    #[error("invalid iv length: expected 16 bytes, got {0}")]
    InvalidIvLength(usize),
    #[error("ciphertext length {0} is not a multiple of the block size")]
    InvalidCiphertextLength(usize),
    #[error("invalid pkcs7 padding")]
    InvalidPadding,
    #[error("decrypted plaintext is not valid utf-8")]
    InvalidUtf8,
}
