//! Persisted wallet identities and the address book.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::encryption::EncryptedWalletData;

/// A named wallet identity. Many can coexist; exactly one is active at a
/// time. The encrypted blob is the only secret-bearing field and is already
/// ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletMetadata {
    pub id: Uuid,
    pub label: String,
    pub encrypted_data: EncryptedWalletData,
}

impl WalletMetadata {
    pub fn new(label: &str, encrypted_data: EncryptedWalletData) -> Self {
        Self { id: Uuid::new_v4(), label: label.to_string(), encrypted_data }
    }
}

/// Address-book entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

impl Contact {
    pub fn new(name: &str, address: &str) -> Self {
        Self { id: Uuid::new_v4(), name: name.to_string(), address: address.to_string() }
    }
}
