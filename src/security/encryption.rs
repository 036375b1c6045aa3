//! Wallet-at-rest encryption.
//!
//! The mnemonic is the only secret persisted, and only ever inside an
//! AES-256-GCM blob keyed by scrypt over the user's password. Decryption
//! fails closed: a wrong password, a flipped bit and a malformed blob are
//! all the same `InvalidPasswordOrCorruptData` to avoid oracle leakage.
//!
//! The scrypt parameters are a fixed contract with every blob already in
//! the wild. The blob format carries no version field, so changing them
//! would require introducing one first.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use scrypt::Params;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;

/// Scrypt cost: N = 2^14 = 16384.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 32;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// The persisted wallet blob. All fields Base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedWalletData {
    pub ciphertext: String,
    pub nonce: String,
    pub salt: String,
}

/// Derives the AES key from a password and salt.
fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, WalletError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| WalletError::CryptoError(format!("Invalid scrypt parameters: {}", e)))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(password.as_bytes(), salt, &params, key.as_mut())
        .map_err(|e| WalletError::CryptoError(format!("Scrypt derivation failed: {}", e)))?;
    Ok(key)
}

/// Encrypts a mnemonic under a password.
///
/// Scrypt is CPU-heavy, so the derivation runs on the blocking thread pool
/// rather than stalling the async executor.
pub async fn encrypt_wallet(
    mnemonic: &str,
    password: &str,
) -> Result<EncryptedWalletData, WalletError> {
    debug!("Encrypting wallet blob");

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let password = password.to_string();
    let key = tokio::task::spawn_blocking(move || derive_key(&password, &salt))
        .await
        .map_err(|e| WalletError::CryptoError(format!("Key derivation task failed: {}", e)))??;

    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|_| WalletError::CryptoError("Invalid key length".to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, mnemonic.as_bytes())
        .map_err(|_| WalletError::CryptoError("Wallet encryption failed".to_string()))?;

    Ok(EncryptedWalletData {
        ciphertext: BASE64.encode(ciphertext),
        nonce: BASE64.encode(nonce_bytes),
        salt: BASE64.encode(salt),
    })
}

/// Decrypts a wallet blob back to the mnemonic.
///
/// Every failure (bad Base64, wrong salt, wrong password, tampered
/// ciphertext) collapses into `InvalidPasswordOrCorruptData`.
pub async fn decrypt_wallet(
    data: &EncryptedWalletData,
    password: &str,
) -> Result<Zeroizing<String>, WalletError> {
    debug!("Decrypting wallet blob");

    let salt = decode_field(&data.salt)?;
    let nonce_bytes = decode_field(&data.nonce)?;
    let ciphertext = decode_field(&data.ciphertext)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(WalletError::InvalidPasswordOrCorruptData);
    }

    let password = password.to_string();
    let key = tokio::task::spawn_blocking(move || derive_key(&password, &salt))
        .await
        .map_err(|e| WalletError::CryptoError(format!("Key derivation task failed: {}", e)))??;

    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|_| WalletError::CryptoError("Invalid key length".to_string()))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_slice())
        .map_err(|_| WalletError::InvalidPasswordOrCorruptData)?;

    let mnemonic = String::from_utf8(plaintext)
        .map_err(|_| WalletError::InvalidPasswordOrCorruptData)?;
    Ok(Zeroizing::new(mnemonic))
}

fn decode_field(value: &str) -> Result<Vec<u8>, WalletError> {
    BASE64.decode(value).map_err(|_| WalletError::InvalidPasswordOrCorruptData)
}
