//! Shielded balance operations and private transfers.
//!
//! Client-side, every operation re-encrypts the full new total and ships a
//! replacement blob; the node never sees a ciphertext delta. The node-side
//! half of these endpoints requires the raw seed (header or body field),
//! a protocol-mandated exposure, preserved for interoperability.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info};

use super::WalletManager;
use crate::core::errors::WalletError;
use crate::crypto::shielded::{
    decrypt_balance_blob, derive_encryption_key, derive_shared_secret, encrypt_balance_blob,
};
use crate::network::client::{
    ClaimTransferRequest, EncryptedBalanceRequest, PendingTransfer, PrivateTransferRequest,
};

/// A pending private transfer with its amount decrypted where possible.
#[derive(Debug, Clone)]
pub struct PendingTransferView {
    pub transfer: PendingTransfer,
    /// Amount in smallest units, decrypted locally with the pairwise shared
    /// secret. `None` when the node omitted the material to derive it.
    pub amount: Option<u64>,
}

impl WalletManager {
    /// Moves `delta` smallest units from the public to the shielded
    /// balance.
    pub async fn encrypt_balance(&self, delta: u64) -> Result<serde_json::Value, WalletError> {
        if delta == 0 {
            return Err(WalletError::InvalidInput("Amount must be positive".to_string()));
        }
        let keys = self.session.keys()?;
        let seed_b64 = BASE64.encode(keys.seed());

        // Current shielded total, fetched fresh; the blob we submit is a
        // full replacement for it.
        let current = self
            .client
            .view_encrypted_balance(&keys.address, &seed_b64)
            .await?
            .raw_micro();
        let new_total = current
            .checked_add(delta)
            .ok_or_else(|| WalletError::InvalidInput("Balance overflow".to_string()))?;

        let balance_key = derive_encryption_key(keys.secret_key.as_slice())?;
        let blob = encrypt_balance_blob(&balance_key, new_total)?;
        debug!("Encrypting balance: total {} -> {}", current, new_total);

        let request = EncryptedBalanceRequest {
            address: keys.address.clone(),
            amount: delta.to_string(),
            private_key: seed_b64,
            encrypted_data: blob,
        };
        let response = self.client.encrypt_balance(&request).await?;
        self.session.touch();
        Ok(response)
    }

    /// Moves `delta` smallest units from the shielded back to the public
    /// balance. Rejects locally, before any network submission, when the
    /// shielded balance cannot cover the delta.
    pub async fn decrypt_balance(&self, delta: u64) -> Result<serde_json::Value, WalletError> {
        if delta == 0 {
            return Err(WalletError::InvalidInput("Amount must be positive".to_string()));
        }
        let keys = self.session.keys()?;
        let seed_b64 = BASE64.encode(keys.seed());

        let current = self
            .client
            .view_encrypted_balance(&keys.address, &seed_b64)
            .await?
            .raw_micro();
        if delta > current {
            return Err(WalletError::InsufficientEncryptedBalance {
                available: current,
                required: delta,
            });
        }
        let new_total = current - delta;

        let balance_key = derive_encryption_key(keys.secret_key.as_slice())?;
        let blob = encrypt_balance_blob(&balance_key, new_total)?;
        debug!("Decrypting balance: total {} -> {}", current, new_total);

        let request = EncryptedBalanceRequest {
            address: keys.address.clone(),
            amount: delta.to_string(),
            private_key: seed_b64,
            encrypted_data: blob,
        };
        let response = self.client.decrypt_balance(&request).await?;
        self.session.touch();
        Ok(response)
    }

    /// Creates a private transfer to `to`. Fails with
    /// `RecipientHasNoPublicKey` when the counterparty has never published
    /// a key.
    pub async fn private_transfer(
        &self,
        to: &str,
        amount: u64,
    ) -> Result<serde_json::Value, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidInput("Amount must be positive".to_string()));
        }
        let keys = self.session.keys()?;

        let to_public_key = self
            .client
            .public_key(to)
            .await?
            .public_key
            .filter(|k| !k.is_empty())
            .ok_or(WalletError::RecipientHasNoPublicKey)?;

        let request = PrivateTransferRequest {
            from: keys.address.clone(),
            to: to.to_string(),
            amount: amount.to_string(),
            from_private_key: BASE64.encode(keys.seed()),
            to_public_key,
        };
        let response = self.client.private_transfer(&request).await?;
        info!("Private transfer submitted to {}", to);
        self.session.touch();
        Ok(response)
    }

    /// Lists pending private transfers addressed to the active account,
    /// decrypting each amount locally where the counterparty key material
    /// is present.
    pub async fn pending_transfers(&self) -> Result<Vec<PendingTransferView>, WalletError> {
        let keys = self.session.keys()?;

        let response = self
            .client
            .pending_private_transfers(&keys.address, &BASE64.encode(keys.seed()))
            .await?;

        let views = response
            .pending_transfers
            .into_iter()
            .map(|transfer| {
                let amount = self.decrypt_transfer_amount(&keys.secret_key[..], &transfer);
                PendingTransferView { transfer, amount }
            })
            .collect();
        Ok(views)
    }

    /// Claims a pending private transfer by id.
    pub async fn claim_transfer(
        &self,
        transfer_id: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let keys = self.session.keys()?;

        let request = ClaimTransferRequest {
            recipient_address: keys.address.clone(),
            private_key: BASE64.encode(keys.seed()),
            transfer_id,
        };
        let response = self.client.claim_private_transfer(&request).await?;
        info!("Private transfer claimed");
        self.session.touch();
        Ok(response)
    }

    /// Best-effort local decryption of a pending transfer's amount via the
    /// pairwise shared secret. Display-only; failures yield `None`.
    fn decrypt_transfer_amount(
        &self,
        secret_key: &[u8],
        transfer: &PendingTransfer,
    ) -> Option<u64> {
        // Plaintext amount present: nothing to decrypt.
        if let Some(amount) = &transfer.amount {
            let parsed = crate::core::domain::parse_amount_micro(amount);
            if parsed > 0 {
                return Some(parsed);
            }
        }

        let blob = transfer.encrypted_data.as_deref()?;
        let their_key_b64 = transfer.ephemeral_key.as_deref()?;
        let their_key: [u8; 32] = BASE64.decode(their_key_b64).ok()?.try_into().ok()?;

        let shared = derive_shared_secret(secret_key, &their_key).ok()?;
        decrypt_balance_blob(&shared, blob).ok()
    }
}
