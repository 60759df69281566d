//! Symmetric envelope encryption for secret values.

pub mod cipher;
pub mod keys;

pub use cipher::{decrypt, encrypt};
pub use keys::EncryptionKey;
