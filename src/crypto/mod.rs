//! Cryptographic primitives: derivation, signing and the shielded codec.

pub mod derivation;
pub mod mnemonic;
pub mod shielded;
pub mod signing;

pub use derivation::{create_octra_address, derive_account_zero, derive_master_key, AccountKeys};
pub use mnemonic::{generate_mnemonic, validate_mnemonic};
pub use shielded::{derive_encryption_key, derive_shared_secret};
pub use signing::{sign_transaction, verify_signature, SignableTransaction, SignedTransaction};
