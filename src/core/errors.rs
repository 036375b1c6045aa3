//! Error types for wallet operations.

use thiserror::Error;

/// Crate-wide error type.
///
/// Cryptographic functions fail on any malformed input rather than guessing.
/// Read-only paths (balance display) may degrade instead of surfacing these;
/// anything that moves funds or persists state must propagate them.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Wordlist or checksum failure on a recovery phrase.
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// AEAD authentication failure during wallet decrypt. Deliberately does
    /// not distinguish a wrong password from a corrupted blob.
    #[error("Invalid password or corrupted data")]
    InvalidPasswordOrCorruptData,

    /// Local pre-flight check failed before any network call.
    #[error("Insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: u64, required: u64 },

    /// Local pre-flight check on the shielded balance failed.
    #[error("Insufficient encrypted balance: have {available}, need {required}")]
    InsufficientEncryptedBalance { available: u64, required: u64 },

    /// The counterparty has never published a public key, so no shared
    /// secret can be derived for a private transfer.
    #[error("Recipient has no public key")]
    RecipientHasNoPublicKey,

    /// Non-2xx or malformed response from the remote node.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A signing operation was attempted with no active keys.
    #[error("Session expired or locked")]
    SessionExpiredOrLocked,

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Encryption/decryption/key-derivation errors.
    #[error("Crypto error: {0}")]
    CryptoError(String),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Resource not found errors.
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Invalid input errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WalletError {
    /// Whether the caller may retry the operation verbatim.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::NetworkError(_))
    }

    /// Whether the error is recoverable by user input (re-entering a
    /// password, fixing a form field) rather than a protocol failure.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            WalletError::InvalidMnemonic(_)
                | WalletError::InvalidPasswordOrCorruptData
                | WalletError::InsufficientBalance { .. }
                | WalletError::InsufficientEncryptedBalance { .. }
                | WalletError::SessionExpiredOrLocked
        )
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        WalletError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::SerializationError(err.to_string())
    }
}

impl From<anyhow::Error> for WalletError {
    fn from(err: anyhow::Error) -> Self {
        WalletError::CryptoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_password() {
        let err = WalletError::InvalidPasswordOrCorruptData;
        assert_eq!(format!("{}", err), "Invalid password or corrupted data");
    }

    #[test]
    fn test_display_insufficient_encrypted_balance() {
        let err =
            WalletError::InsufficientEncryptedBalance { available: 500_000, required: 1_000_000 };
        assert_eq!(
            format!("{}", err),
            "Insufficient encrypted balance: have 500000, need 1000000"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(WalletError::NetworkError("timeout".to_string()).is_retryable());
        assert!(!WalletError::InvalidPasswordOrCorruptData.is_retryable());
    }

    #[test]
    fn test_user_recoverable_classification() {
        assert!(WalletError::InvalidMnemonic("bad checksum".to_string()).is_user_recoverable());
        assert!(WalletError::SessionExpiredOrLocked.is_user_recoverable());
        assert!(!WalletError::NetworkError("502".to_string()).is_user_recoverable());
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let wallet_err: WalletError = err.into();
        assert!(matches!(wallet_err, WalletError::SerializationError(_)));
    }
}
