//! Balance and history reads.
//!
//! These are display paths: individual fetch failures degrade to zero or
//! skipped entries instead of erroring, except when no session is active at
//! all.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, warn};

use super::WalletManager;
use crate::core::domain::{BalanceSnapshot, Direction, TransactionRecord};
use crate::core::errors::WalletError;

impl WalletManager {
    /// Fetches the active account's balance, nonce, shielded balance and
    /// staging count.
    ///
    /// The public balance query must succeed; the shielded-balance and
    /// staging reads degrade to zero on failure.
    pub async fn fetch_balance(&self) -> Result<BalanceSnapshot, WalletError> {
        let keys = self.session.keys()?;
        let address = keys.address.clone();

        let balance = self.client.balance(&address).await?;

        let encrypted_balance = match self
            .client
            .view_encrypted_balance(&address, &BASE64.encode(keys.seed()))
            .await
        {
            Ok(view) => view.raw_micro(),
            Err(e) => {
                warn!("Encrypted balance fetch failed, showing zero: {}", e);
                0
            }
        };

        let staging_count = match self.client.staging().await {
            Ok(staging) => {
                staging.staged_transactions.iter().filter(|tx| tx.from == address).count()
            }
            Err(e) => {
                warn!("Staging fetch failed, showing zero: {}", e);
                0
            }
        };

        Ok(BalanceSnapshot {
            balance: balance.balance_micro(),
            nonce: balance.nonce(),
            encrypted_balance,
            staging_count,
        })
    }

    /// Fetches and parses recent transactions for the active account.
    ///
    /// Entries whose detail fetch fails are skipped, matching the
    /// degrade-don't-crash policy of read paths.
    pub async fn fetch_history(&self, limit: usize) -> Result<Vec<TransactionRecord>, WalletError> {
        let address = self.active_address()?;

        let refs = self.client.recent_transactions(&address, limit).await?;
        let mut records = Vec::with_capacity(refs.recent_transactions.len());

        for tx_ref in refs.recent_transactions {
            let detail = match self.client.transaction(&tx_ref.hash).await {
                Ok(detail) => detail,
                Err(e) => {
                    debug!("Skipping unparseable transaction {}: {}", tx_ref.hash, e);
                    continue;
                }
            };

            let parsed = detail.parsed_tx;
            let direction =
                if parsed.to == address { Direction::Incoming } else { Direction::Outgoing };
            let counterparty = match direction {
                Direction::Incoming => parsed.from.clone(),
                Direction::Outgoing => parsed.to.clone(),
            };

            // The data payload may carry a user message as JSON.
            let message = detail.data.as_deref().and_then(|data| {
                serde_json::from_str::<serde_json::Value>(data)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            });

            records.push(TransactionRecord {
                hash: tx_ref.hash,
                direction,
                counterparty,
                amount: parsed.amount_micro(),
                timestamp: parsed.timestamp.unwrap_or(0.0),
                epoch: tx_ref.epoch,
                message,
            });
        }

        Ok(records)
    }
}
