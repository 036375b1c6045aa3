//! Transaction signing.
//!
//! The signable payload is the compact JSON serialization of the transfer
//! fields in a fixed order. The remote validator recomputes the same bytes,
//! so the serialization is a strict wire contract: field order, integer
//! formatting and the absence of whitespace all matter. Serde keeps struct
//! field order, which pins the layout below.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::core::domain::MICRO_OCT;
use crate::core::errors::WalletError;
use crate::crypto::derivation::{signing_key_from_secret, AccountKeys};

/// Fee-tier boundary: transfers of 1000 OCT and above pay the higher tier.
const FEE_TIER_BOUNDARY: u64 = 1_000 * MICRO_OCT;

/// The canonical transfer fields, in wire order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignableTransaction {
    pub from: String,
    #[serde(rename = "to_")]
    pub to: String,
    /// Amount in smallest units, as a decimal string.
    pub amount: String,
    pub nonce: u64,
    /// Fee/tier marker: "1" below 1000 OCT, "3" at or above.
    pub ou: String,
    /// Unix timestamp in fractional seconds.
    pub timestamp: f64,
}

impl SignableTransaction {
    pub fn new(from: &str, to: &str, amount: u64, nonce: u64, timestamp: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
            nonce,
            ou: ou_for_amount(amount).to_string(),
            timestamp,
        }
    }

    /// The exact byte string that gets signed.
    pub fn signing_message(&self) -> Result<String, WalletError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Fee/tier marker for an amount in smallest units.
pub fn ou_for_amount(amount: u64) -> &'static str {
    if amount < FEE_TIER_BOUNDARY {
        "1"
    } else {
        "3"
    }
}

/// A transfer ready for submission: the signed fields plus the detached
/// signature and the signer's public key. The private key never leaves the
/// process through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub tx: SignableTransaction,
    /// Optional free-form message. Rides on the payload but is not covered
    /// by the signature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Base64 Ed25519 signature over the signing message.
    pub signature: String,
    /// Base64 public key of the signer.
    pub public_key: String,
}

/// Produces a detached Ed25519 signature over the transaction's canonical
/// serialization.
pub fn sign_transaction(
    keys: &AccountKeys,
    tx: &SignableTransaction,
    message: Option<String>,
) -> Result<SignedTransaction, WalletError> {
    let mut secret = [0u8; 64];
    secret.copy_from_slice(keys.secret_key.as_slice());
    let signing_key = signing_key_from_secret(&secret);
    secret.zeroize();
    let signing_key = signing_key?;

    let payload = tx.signing_message()?;
    let signature = signing_key.sign(payload.as_bytes());

    Ok(SignedTransaction {
        tx: tx.clone(),
        message,
        signature: BASE64.encode(signature.to_bytes()),
        public_key: BASE64.encode(keys.public_key),
    })
}

/// Verifies a Base64 detached signature against a message and public key.
pub fn verify_signature(
    public_key: &[u8; 32],
    message: &[u8],
    signature_b64: &str,
) -> Result<bool, WalletError> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| WalletError::CryptoError(format!("Malformed public key: {}", e)))?;

    let raw = BASE64
        .decode(signature_b64)
        .map_err(|e| WalletError::InvalidInput(format!("Malformed signature encoding: {}", e)))?;
    let raw: [u8; 64] = raw
        .try_into()
        .map_err(|_| WalletError::InvalidInput("Signature must be 64 bytes".to_string()))?;
    let signature = Signature::from_bytes(&raw);

    Ok(verifying_key.verify(message, &signature).is_ok())
}
