//! BIP-39 mnemonic generation and validation.

use bip39::{Language, Mnemonic};
use rand_core::{OsRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::core::errors::WalletError;

/// Entropy size for a 12-word phrase.
const ENTROPY_BYTES: usize = 16;

/// Generates a new random 12-word English mnemonic.
///
/// Entropy comes from the OS random source. The phrase is returned in a
/// zeroizing buffer; it must never be persisted in plaintext.
pub fn generate_mnemonic() -> Result<Zeroizing<String>, WalletError> {
    let mut entropy = [0u8; ENTROPY_BYTES];
    OsRng.fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    entropy.zeroize();

    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Checks wordlist membership and checksum.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Parses a phrase, normalizing whitespace, or fails with `InvalidMnemonic`.
pub(crate) fn parse_mnemonic(phrase: &str) -> Result<Mnemonic, WalletError> {
    Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))
}
