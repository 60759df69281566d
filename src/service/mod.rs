//! Vault and secret services: the layer that fetches records, asks the
//! access evaluator for a verdict, and only then touches the cipher or the
//! sharing map.

pub mod secrets;
pub mod vaults;

pub use secrets::SecretService;
pub use vaults::VaultService;
