//! Unlock, lock and active-wallet switching.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::WalletManager;
use crate::core::errors::WalletError;
use crate::security::encryption::decrypt_wallet;

impl WalletManager {
    /// Unlocks the active wallet with a password.
    pub async fn unlock_active_wallet(&self, password: &str) -> Result<(), WalletError> {
        let wallet = self
            .active_wallet()
            .ok_or_else(|| WalletError::NotFoundError("No active wallet".to_string()))?;

        self.session.begin_unlock();
        let mnemonic = match decrypt_wallet(&wallet.encrypted_data, password).await {
            Ok(mnemonic) => mnemonic,
            Err(e) => {
                self.session.abort_unlock();
                return Err(e);
            }
        };

        match crate::crypto::derivation::derive_account_zero(&mnemonic) {
            Ok(keys) => {
                info!("Wallet {} unlocked", wallet.id);
                self.session.complete_unlock(keys, Some(password))
            }
            Err(e) => {
                self.session.abort_unlock();
                Err(e)
            }
        }
    }

    /// Switches the active wallet, attempting a silent re-unlock with the
    /// session password.
    ///
    /// On any failure (no cached password, wrong password for the target
    /// blob, derivation failure) the target becomes active but stays
    /// locked, and no error propagates: the caller shows a lock screen.
    /// The cached password is kept, since it may still fit other wallets.
    pub async fn set_active_wallet(&self, id: Uuid) -> Result<(), WalletError> {
        if self.active_wallet_id() == Some(id) {
            return Ok(());
        }
        let target = self
            .wallet_by_id(id)
            .ok_or_else(|| WalletError::NotFoundError(format!("Wallet {}", id)))?;

        *self.active_wallet_id.write() = Some(id);

        let Some(password) = self.session.cached_password() else {
            debug!("No session password; wallet {} stays locked", id);
            self.session.lock_keys_only();
            return Ok(());
        };

        self.session.begin_unlock();
        match decrypt_wallet(&target.encrypted_data, &password).await {
            Ok(mnemonic) => match crate::crypto::derivation::derive_account_zero(&mnemonic) {
                Ok(keys) => {
                    debug!("Silent re-unlock succeeded for wallet {}", id);
                    self.session.complete_unlock(keys, Some(password.as_str()))
                }
                Err(e) => {
                    warn!("Silent re-unlock derivation failed: {}", e);
                    self.session.lock_keys_only();
                    Ok(())
                }
            },
            Err(_) => {
                // Wrong password for this blob; it may still fit others.
                debug!("Session password does not fit wallet {}; staying locked", id);
                self.session.lock_keys_only();
                Ok(())
            }
        }
    }

    /// Locks the session: erases the password envelope and key material.
    pub fn lock(&self) {
        self.session.lock();
    }
}
