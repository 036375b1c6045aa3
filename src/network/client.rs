//! HTTP client for the remote Octra node.
//!
//! The paths, headers and body shapes here are a compatibility contract
//! with the network; do not rename fields or "clean up" routes.
//!
//! Trust-boundary note: several endpoints (`/view_encrypted_balance`,
//! `/encrypt_balance`, `/decrypt_balance`, `/private_transfer`,
//! `/pending_private_transfers`, `/claim_private_transfer`) require the raw
//! private key or seed as a header or body field so the node can compute
//! view/decrypt results server-side. That is mandated by the remote
//! protocol, not a choice this client gets to make; it is preserved for
//! interoperability and should be treated as a known exposure when
//! reasoning about the node operator.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::config::NodeConfig;
use crate::core::domain::parse_amount_micro;
use crate::core::errors::WalletError;
use crate::crypto::signing::SignedTransaction;

const PRIVATE_KEY_HEADER: &str = "X-Private-Key";

/// JSON client for one node endpoint.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    base_url: String,
}

impl NodeClient {
    pub fn new(config: &NodeConfig) -> Result<Self, WalletError> {
        let endpoint = config.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(WalletError::ConfigError("Node endpoint is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url: endpoint.to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        private_key_b64: Option<&str>,
    ) -> Result<T, WalletError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);

        let mut request = self.http.get(&url);
        if let Some(key) = private_key_b64 {
            request = request.header(PRIVATE_KEY_HEADER, key);
        }

        let response = request.send().await?;
        Self::decode_response(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, WalletError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", path);

        let response = self.http.post(&url).json(body).send().await?;
        Self::decode_response(response).await
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WalletError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Prefer the node's own error message when it sent one.
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!("Node request failed: {}", message);
            return Err(WalletError::NetworkError(message));
        }

        serde_json::from_str(&text)
            .map_err(|e| WalletError::NetworkError(format!("Malformed node response: {}", e)))
    }

    /// `GET /balance/{address}`
    pub async fn balance(&self, address: &str) -> Result<BalanceResponse, WalletError> {
        self.get_json(&format!("/balance/{}", address), None).await
    }

    /// `GET /view_encrypted_balance/{address}` with the seed in a header.
    pub async fn view_encrypted_balance(
        &self,
        address: &str,
        private_key_b64: &str,
    ) -> Result<ViewEncryptedBalanceResponse, WalletError> {
        self.get_json(&format!("/view_encrypted_balance/{}", address), Some(private_key_b64))
            .await
    }

    /// `GET /staging`
    pub async fn staging(&self) -> Result<StagingResponse, WalletError> {
        self.get_json("/staging", None).await
    }

    /// `GET /address/{address}?limit=N`
    pub async fn recent_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<AddressHistoryResponse, WalletError> {
        self.get_json(&format!("/address/{}?limit={}", address, limit), None).await
    }

    /// `GET /tx/{hash}`
    pub async fn transaction(&self, hash: &str) -> Result<TransactionResponse, WalletError> {
        self.get_json(&format!("/tx/{}", hash), None).await
    }

    /// `POST /send-tx`
    pub async fn send_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<SendTxResponse, WalletError> {
        self.post_json("/send-tx", tx).await
    }

    /// `POST /encrypt_balance`
    pub async fn encrypt_balance(
        &self,
        request: &EncryptedBalanceRequest,
    ) -> Result<serde_json::Value, WalletError> {
        self.post_json("/encrypt_balance", request).await
    }

    /// `POST /decrypt_balance`
    pub async fn decrypt_balance(
        &self,
        request: &EncryptedBalanceRequest,
    ) -> Result<serde_json::Value, WalletError> {
        self.post_json("/decrypt_balance", request).await
    }

    /// `GET /public_key/{address}`
    pub async fn public_key(&self, address: &str) -> Result<PublicKeyResponse, WalletError> {
        self.get_json(&format!("/public_key/{}", address), None).await
    }

    /// `POST /private_transfer`
    pub async fn private_transfer(
        &self,
        request: &PrivateTransferRequest,
    ) -> Result<serde_json::Value, WalletError> {
        self.post_json("/private_transfer", request).await
    }

    /// `GET /pending_private_transfers?address=` with the seed in a header.
    pub async fn pending_private_transfers(
        &self,
        address: &str,
        private_key_b64: &str,
    ) -> Result<PendingTransfersResponse, WalletError> {
        self.get_json(
            &format!("/pending_private_transfers?address={}", address),
            Some(private_key_b64),
        )
        .await
    }

    /// `POST /claim_private_transfer`
    pub async fn claim_private_transfer(
        &self,
        request: &ClaimTransferRequest,
    ) -> Result<serde_json::Value, WalletError> {
        self.post_json("/claim_private_transfer", request).await
    }
}

/// `GET /balance/{address}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub balance: Option<serde_json::Value>,
    #[serde(default)]
    pub nonce: Option<u64>,
}

impl BalanceResponse {
    pub fn balance_micro(&self) -> u64 {
        self.balance.as_ref().map(parse_amount_micro).unwrap_or(0)
    }

    pub fn nonce(&self) -> u64 {
        self.nonce.unwrap_or(0)
    }
}

/// `GET /view_encrypted_balance/{address}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewEncryptedBalanceResponse {
    /// Display form, e.g. "1.5 OCT".
    #[serde(default)]
    pub encrypted_balance: Option<String>,
    /// Raw total in smallest units.
    #[serde(default)]
    pub encrypted_balance_raw: Option<serde_json::Value>,
}

impl ViewEncryptedBalanceResponse {
    pub fn raw_micro(&self) -> u64 {
        self.encrypted_balance_raw.as_ref().map(parse_amount_micro).unwrap_or(0)
    }
}

/// `GET /staging` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StagingResponse {
    #[serde(default)]
    pub staged_transactions: Vec<StagedTransaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StagedTransaction {
    #[serde(default)]
    pub from: String,
}

/// `GET /address/{address}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressHistoryResponse {
    #[serde(default)]
    pub recent_transactions: Vec<TransactionRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRef {
    pub hash: String,
    #[serde(default)]
    pub epoch: Option<u64>,
}

/// `GET /tx/{hash}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    pub parsed_tx: ParsedTransaction,
    /// Raw JSON payload string; may carry a user message.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedTransaction {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub amount_raw: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl ParsedTransaction {
    /// Amount in smallest units, preferring the raw field.
    pub fn amount_micro(&self) -> u64 {
        self.amount_raw
            .as_ref()
            .or(self.amount.as_ref())
            .map(parse_amount_micro)
            .unwrap_or(0)
    }
}

/// `POST /send-tx` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendTxResponse {
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// Body for `POST /encrypt_balance` and `POST /decrypt_balance`.
#[derive(Debug, Clone, Serialize)]
pub struct EncryptedBalanceRequest {
    pub address: String,
    /// Delta amount in smallest units, as a decimal string.
    pub amount: String,
    /// Base64 seed. Protocol-mandated exposure.
    pub private_key: String,
    /// Replacement blob, `"v2|" + Base64(nonce ‖ ciphertext)`.
    pub encrypted_data: String,
}

/// `GET /public_key/{address}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicKeyResponse {
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Body for `POST /private_transfer`.
#[derive(Debug, Clone, Serialize)]
pub struct PrivateTransferRequest {
    pub from: String,
    pub to: String,
    pub amount: String,
    /// Base64 seed. Protocol-mandated exposure.
    pub from_private_key: String,
    pub to_public_key: String,
}

/// `GET /pending_private_transfers` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingTransfersResponse {
    #[serde(default)]
    pub pending_transfers: Vec<PendingTransfer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingTransfer {
    /// Transfer id; the node emits both numeric and string forms.
    #[serde(alias = "transfer_id")]
    pub id: serde_json::Value,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    /// Amount ciphertext under the pairwise shared secret.
    #[serde(default)]
    pub encrypted_data: Option<String>,
    /// Counterparty public key (Base64) for the shared-secret derivation.
    #[serde(default)]
    pub ephemeral_key: Option<String>,
    #[serde(default)]
    pub epoch_id: Option<u64>,
}

/// Body for `POST /claim_private_transfer`.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimTransferRequest {
    pub recipient_address: String,
    /// Base64 seed. Protocol-mandated exposure.
    pub private_key: String,
    pub transfer_id: serde_json::Value,
}
