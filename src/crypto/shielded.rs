//! Shielded-balance protocol codec.
//!
//! The network stores a holder's shielded balance only as ciphertext. Every
//! update re-encrypts the full new total under a key derived from the
//! holder's seed; the blob is a complete replacement, never a delta. Private
//! transfers use a pairwise symmetric key derived from both parties' public
//! keys by ordered concatenation and a double SHA-256 with a domain tag.
//! That construction is a fixed protocol contract: it is not an
//! authenticated key exchange and offers no forward secrecy, and it must
//! not be swapped for a real ECDH without a network-wide format change.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::core::errors::WalletError;

/// Domain tag for the holder's balance encryption key.
const BALANCE_KEY_DOMAIN: &[u8] = b"octra_encrypted_balance_v2";

/// Domain tag for the pairwise shared secret.
const SHARED_SECRET_DOMAIN: &[u8] = b"OCTRA_SYMMETRIC_V1";

/// Version prefix on every shielded-balance blob.
const BLOB_PREFIX: &str = "v2|";

const NONCE_LEN: usize = 12;

/// Derives the symmetric key for the holder's shielded balance:
/// `SHA-256(domain ‖ seed[0..32])`.
///
/// Accepts either the 32-byte seed or the 64-byte expanded secret key and
/// always operates on the seed half.
pub fn derive_encryption_key(secret: &[u8]) -> Result<Zeroizing<[u8; 32]>, WalletError> {
    let seed = seed_half(secret)?;

    let mut hasher = Sha256::new();
    hasher.update(BALANCE_KEY_DOMAIN);
    hasher.update(seed);

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&hasher.finalize());
    Ok(key)
}

/// Encrypts a balance total (smallest units) as a `"v2|"`-framed blob.
///
/// The plaintext is the decimal string of the total; the nonce is fresh per
/// call, so re-encrypting the same total yields a different blob that still
/// decrypts to the same value.
pub fn encrypt_balance_blob(key: &[u8; 32], total: u64) -> Result<String, WalletError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| WalletError::CryptoError("Invalid balance key length".to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = total.to_string();
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| WalletError::CryptoError("Balance encryption failed".to_string()))?;

    let mut framed = nonce_bytes.to_vec();
    framed.extend_from_slice(&ciphertext);
    Ok(format!("{}{}", BLOB_PREFIX, BASE64.encode(framed)))
}

/// Decrypts a `"v2|"`-framed blob back to the balance total.
pub fn decrypt_balance_blob(key: &[u8; 32], blob: &str) -> Result<u64, WalletError> {
    let encoded = blob
        .strip_prefix(BLOB_PREFIX)
        .ok_or_else(|| WalletError::CryptoError("Unsupported balance blob version".to_string()))?;

    let raw = BASE64
        .decode(encoded)
        .map_err(|_| WalletError::CryptoError("Malformed balance blob".to_string()))?;
    if raw.len() <= NONCE_LEN {
        return Err(WalletError::CryptoError("Balance blob too short".to_string()));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| WalletError::CryptoError("Invalid balance key length".to_string()))?;
    let nonce = Nonce::from_slice(&raw[..NONCE_LEN]);

    let plaintext = cipher
        .decrypt(nonce, &raw[NONCE_LEN..])
        .map_err(|_| WalletError::CryptoError("Balance decryption failed".to_string()))?;

    let text = String::from_utf8(plaintext)
        .map_err(|_| WalletError::CryptoError("Balance plaintext is not UTF-8".to_string()))?;
    text.trim()
        .parse::<u64>()
        .map_err(|_| WalletError::CryptoError("Balance plaintext is not an integer".to_string()))
}

/// Derives the pairwise symmetric key shared with a counterparty.
///
/// The two 32-byte public keys are ordered bytewise (smaller first) so both
/// sides hash the identical concatenation, then hashed twice:
/// `SHA-256(SHA-256(first ‖ second) ‖ domain)`.
pub fn derive_shared_secret(
    my_secret: &[u8],
    their_public: &[u8; 32],
) -> Result<Zeroizing<[u8; 32]>, WalletError> {
    let seed = seed_half(my_secret)?;
    let seed_arr: [u8; 32] = seed
        .try_into()
        .map_err(|_| WalletError::CryptoError("Malformed seed".to_string()))?;
    let my_public = ed25519_dalek::SigningKey::from_bytes(&seed_arr).verifying_key().to_bytes();

    let (first, second) = if their_public.as_slice() < my_public.as_slice() {
        (their_public.as_slice(), my_public.as_slice())
    } else {
        (my_public.as_slice(), their_public.as_slice())
    };

    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(first);
    combined[32..].copy_from_slice(second);
    let round1 = Sha256::digest(combined);

    let mut hasher = Sha256::new();
    hasher.update(round1);
    hasher.update(SHARED_SECRET_DOMAIN);

    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&hasher.finalize());
    Ok(secret)
}

/// Extracts the 32-byte seed from a 32- or 64-byte secret.
fn seed_half(secret: &[u8]) -> Result<&[u8], WalletError> {
    match secret.len() {
        32 | 64 => Ok(&secret[..32]),
        n => Err(WalletError::CryptoError(format!(
            "Secret key must be 32 or 64 bytes, got {}",
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::derivation::derive_account_zero;

    const MNEMONIC_A: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const MNEMONIC_B: &str =
        "legal winner thank year wave sausage worth useful legal winner thank yellow";

    #[test]
    fn test_encryption_key_known_vector() {
        let keys = derive_account_zero(MNEMONIC_A).unwrap();
        let balance_key = derive_encryption_key(keys.secret_key.as_slice()).unwrap();
        assert_eq!(
            hex::encode(*balance_key),
            "5f93a454e21437d4d0d2b2d463db4d9712f7ec9aa3f875558c89e4ee481ddc36"
        );
    }

    #[test]
    fn test_encryption_key_seed_and_expanded_agree() {
        let keys = derive_account_zero(MNEMONIC_A).unwrap();
        let from_expanded = derive_encryption_key(keys.secret_key.as_slice()).unwrap();
        let from_seed = derive_encryption_key(keys.seed()).unwrap();
        assert_eq!(*from_expanded, *from_seed);
    }

    #[test]
    fn test_encryption_key_rejects_odd_lengths() {
        assert!(derive_encryption_key(&[0u8; 31]).is_err());
        assert!(derive_encryption_key(&[0u8; 33]).is_err());
        assert!(derive_encryption_key(&[]).is_err());
    }

    #[test]
    fn test_blob_roundtrip() {
        let key = [7u8; 32];
        let blob = encrypt_balance_blob(&key, 123_456_789).unwrap();
        assert!(blob.starts_with("v2|"));
        assert_eq!(decrypt_balance_blob(&key, &blob).unwrap(), 123_456_789);
    }

    #[test]
    fn test_reencrypting_same_total_is_stable() {
        // Fresh nonce per call: blobs differ, plaintext does not.
        let key = [9u8; 32];
        let a = encrypt_balance_blob(&key, 42).unwrap();
        let b = encrypt_balance_blob(&key, 42).unwrap();
        assert_ne!(a, b);
        assert_eq!(decrypt_balance_blob(&key, &a).unwrap(), 42);
        assert_eq!(decrypt_balance_blob(&key, &b).unwrap(), 42);
    }

    #[test]
    fn test_blob_zero_total() {
        let key = [1u8; 32];
        let blob = encrypt_balance_blob(&key, 0).unwrap();
        assert_eq!(decrypt_balance_blob(&key, &blob).unwrap(), 0);
    }

    #[test]
    fn test_decrypt_rejects_unknown_version() {
        let key = [1u8; 32];
        assert!(decrypt_balance_blob(&key, "v1|AAAA").is_err());
        assert!(decrypt_balance_blob(&key, "AAAA").is_err());
        assert!(decrypt_balance_blob(&key, "").is_err());
    }

    #[test]
    fn test_decrypt_rejects_truncated_blob() {
        let key = [1u8; 32];
        let blob = format!("v2|{}", BASE64.encode([0u8; 8]));
        assert!(decrypt_balance_blob(&key, &blob).is_err());
    }

    #[test]
    fn test_decrypt_rejects_wrong_key() {
        let blob = encrypt_balance_blob(&[1u8; 32], 1000).unwrap();
        assert!(decrypt_balance_blob(&[2u8; 32], &blob).is_err());
    }

    #[test]
    fn test_decrypt_rejects_tampered_blob() {
        let key = [3u8; 32];
        let blob = encrypt_balance_blob(&key, 77).unwrap();
        let mut raw = BASE64.decode(blob.strip_prefix("v2|").unwrap()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = format!("v2|{}", BASE64.encode(raw));
        assert!(decrypt_balance_blob(&key, &tampered).is_err());
    }

    #[test]
    fn test_shared_secret_symmetry() {
        let a = derive_account_zero(MNEMONIC_A).unwrap();
        let b = derive_account_zero(MNEMONIC_B).unwrap();

        let from_a = derive_shared_secret(a.secret_key.as_slice(), &b.public_key).unwrap();
        let from_b = derive_shared_secret(b.seed(), &a.public_key).unwrap();
        assert_eq!(*from_a, *from_b);
    }

    #[test]
    fn test_shared_secret_known_vector() {
        let a = derive_account_zero(MNEMONIC_A).unwrap();
        let b = derive_account_zero(MNEMONIC_B).unwrap();
        let secret = derive_shared_secret(a.secret_key.as_slice(), &b.public_key).unwrap();
        assert_eq!(
            hex::encode(*secret),
            "2fbdf22336e142b286d26b6da5f7b524907e6cbd7d73a3779d9b84bbfb8b4312"
        );
    }

    #[test]
    fn test_shared_secret_usable_for_transfer_blobs() {
        let a = derive_account_zero(MNEMONIC_A).unwrap();
        let b = derive_account_zero(MNEMONIC_B).unwrap();

        let sender_key = derive_shared_secret(a.secret_key.as_slice(), &b.public_key).unwrap();
        let blob = encrypt_balance_blob(&sender_key, 5_000_000).unwrap();

        let recipient_key = derive_shared_secret(b.secret_key.as_slice(), &a.public_key).unwrap();
        assert_eq!(decrypt_balance_blob(&recipient_key, &blob).unwrap(), 5_000_000);
    }

    #[test]
    fn test_shared_secret_differs_per_pair() {
        let a = derive_account_zero(MNEMONIC_A).unwrap();
        let b = derive_account_zero(MNEMONIC_B).unwrap();
        let c = derive_account_zero("zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong").unwrap();

        let ab = derive_shared_secret(a.secret_key.as_slice(), &b.public_key).unwrap();
        let ac = derive_shared_secret(a.secret_key.as_slice(), &c.public_key).unwrap();
        assert_ne!(*ab, *ac);
    }
}
