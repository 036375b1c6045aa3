//! Public transfers.

use chrono::Utc;
use tracing::info;

use super::WalletManager;
use crate::core::domain::MultiSendReport;
use crate::core::errors::WalletError;
use crate::crypto::signing::{sign_transaction, SignableTransaction};

impl WalletManager {
    /// Signs and submits a public transfer of `amount` smallest units.
    ///
    /// The nonce is `current + 1`, with `current` read from the balance
    /// endpoint immediately before signing. Two concurrent sends can still
    /// observe the same nonce and race; the node resolves the conflict by
    /// accepting one. That window is part of the protocol, not something to
    /// paper over locally.
    pub async fn send_transaction(
        &self,
        to: &str,
        amount: u64,
        message: Option<String>,
    ) -> Result<String, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidInput("Amount must be positive".to_string()));
        }
        let keys = self.session.keys()?;

        let balance = self.client.balance(&keys.address).await?;
        let available = balance.balance_micro();
        if available < amount {
            return Err(WalletError::InsufficientBalance { available, required: amount });
        }

        let timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;
        let tx =
            SignableTransaction::new(&keys.address, to, amount, balance.nonce() + 1, timestamp);
        let signed = sign_transaction(&keys, &tx, message)?;

        // Session may have been locked while we were fetching; a stale
        // completion must not submit.
        if !self.session.is_unlocked() {
            return Err(WalletError::SessionExpiredOrLocked);
        }

        let response = self.client.send_transaction(&signed).await?;
        let tx_hash = response
            .tx_hash
            .ok_or_else(|| WalletError::NetworkError("Node returned no tx hash".to_string()))?;

        info!("Transaction submitted: {}", tx_hash);
        self.session.touch();
        Ok(tx_hash)
    }

    /// Sends to several recipients sequentially, collecting a tally rather
    /// than stopping at the first failure.
    pub async fn send_many(&self, recipients: &[(String, u64)]) -> MultiSendReport {
        let mut report = MultiSendReport::default();
        for (address, amount) in recipients {
            match self.send_transaction(address, *amount, None).await {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    info!("Multi-send to {} failed: {}", address, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
