//! Deterministic key and address derivation.
//!
//! Mnemonic -> BIP-39 seed -> HMAC-SHA512 keyed "Octra seed" -> master key
//! material -> Ed25519 account keypair -> address. Only the account-zero
//! path exists: the master private key is used directly as the Ed25519 seed,
//! with no BIP32-style child derivation. This is a protocol constraint, not
//! a placeholder for a future HD tree.

use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, Zeroizing};

use crate::core::errors::WalletError;
use crate::crypto::mnemonic::parse_mnemonic;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for master-key extraction. Part of the wire-compatibility
/// contract with the rest of the network's tooling.
const MASTER_KEY_DOMAIN: &[u8] = b"Octra seed";

/// Human-readable address prefix.
pub const ADDRESS_PREFIX: &str = "oct";

/// Master key material extracted from the mnemonic seed.
///
/// The chain code is carried for format completeness; no child derivation
/// consumes it today.
pub struct MasterKey {
    pub private_key: Zeroizing<[u8; 32]>,
    pub chain_code: Zeroizing<[u8; 32]>,
}

/// An account's Ed25519 key material and derived address.
///
/// `secret_key` is the 64-byte expanded form (seed followed by public key),
/// matching the layout the network's signing tools exchange.
#[derive(Clone)]
pub struct AccountKeys {
    pub secret_key: Zeroizing<[u8; 64]>,
    pub public_key: [u8; 32],
    pub address: String,
}

impl AccountKeys {
    /// The 32-byte seed half of the secret key.
    pub fn seed(&self) -> &[u8] {
        &self.secret_key[..32]
    }
}

impl std::fmt::Debug for AccountKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret material stays out of Debug output.
        f.debug_struct("AccountKeys")
            .field("public_key", &hex::encode(self.public_key))
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Computes the BIP-39 seed for the phrase (empty passphrase), then splits
/// HMAC-SHA512("Octra seed", seed) into master private key and chain code.
pub fn derive_master_key(mnemonic: &str) -> Result<MasterKey, WalletError> {
    let parsed = parse_mnemonic(mnemonic)?;
    let mut seed = parsed.to_seed("");

    let mut mac = HmacSha512::new_from_slice(MASTER_KEY_DOMAIN)
        .map_err(|e| WalletError::CryptoError(format!("HMAC init failed: {}", e)))?;
    mac.update(&seed);
    let digest = mac.finalize().into_bytes();
    seed.zeroize();

    let mut private_key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    private_key.copy_from_slice(&digest[..32]);
    chain_code.copy_from_slice(&digest[32..]);

    Ok(MasterKey { private_key, chain_code })
}

/// Derives the account-zero keypair and address for a mnemonic.
///
/// Deterministic: the same phrase always yields the same keys and address.
pub fn derive_account_zero(mnemonic: &str) -> Result<AccountKeys, WalletError> {
    let master = derive_master_key(mnemonic)?;

    let signing_key = SigningKey::from_bytes(&master.private_key);
    let verifying_key = signing_key.verifying_key();

    let secret_key = Zeroizing::new(signing_key.to_keypair_bytes());
    let public_key = verifying_key.to_bytes();
    let address = create_octra_address(&public_key);

    Ok(AccountKeys { secret_key, public_key, address })
}

/// `"oct" + Base58(SHA-256(public_key))` with the Bitcoin alphabet. The
/// hash itself is the only integrity check; there is no extra checksum byte.
pub fn create_octra_address(public_key: &[u8; 32]) -> String {
    let hash = Sha256::digest(public_key);
    format!("{}{}", ADDRESS_PREFIX, bs58::encode(hash).into_string())
}

/// Rebuilds the signing key from a stored 64-byte secret, verifying the
/// embedded public half is consistent with the seed.
pub fn signing_key_from_secret(secret_key: &[u8; 64]) -> Result<SigningKey, WalletError> {
    SigningKey::from_keypair_bytes(secret_key)
        .map_err(|e| WalletError::CryptoError(format!("Malformed secret key: {}", e)))
}
