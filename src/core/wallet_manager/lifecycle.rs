//! Wallet lifecycle: onboarding, import, rename, removal and password
//! reset.

use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::WalletManager;
use crate::core::errors::WalletError;
use crate::core::wallet_info::WalletMetadata;
use crate::crypto::derivation::derive_account_zero;
use crate::crypto::mnemonic::{generate_mnemonic, validate_mnemonic};
use crate::security::encryption::{decrypt_wallet, encrypt_wallet};

impl WalletManager {
    /// Creates a brand-new wallet: fresh mnemonic, encrypted registration,
    /// immediate unlock.
    ///
    /// Returns the metadata and the one-time plaintext mnemonic. The caller
    /// shows it to the user for backup and then drops it; it is never
    /// persisted outside the encrypted blob.
    pub async fn create_wallet(
        &self,
        label: &str,
        password: &str,
    ) -> Result<(WalletMetadata, Zeroizing<String>), WalletError> {
        info!("Creating new wallet: {}", label);

        let mnemonic = generate_mnemonic()?;
        let metadata = self.register_wallet(label, &mnemonic, password).await?;
        self.unlock_with_mnemonic(&mnemonic, Some(password))?;

        Ok((metadata, mnemonic))
    }

    /// Imports an existing wallet from its recovery phrase.
    pub async fn import_wallet(
        &self,
        label: &str,
        mnemonic: &str,
        password: &str,
    ) -> Result<WalletMetadata, WalletError> {
        info!("Importing wallet: {}", label);

        if !validate_mnemonic(mnemonic) {
            return Err(WalletError::InvalidMnemonic(
                "Wordlist or checksum check failed".to_string(),
            ));
        }

        let metadata = self.register_wallet(label, mnemonic, password).await?;
        self.unlock_with_mnemonic(mnemonic, Some(password))?;
        Ok(metadata)
    }

    async fn register_wallet(
        &self,
        label: &str,
        mnemonic: &str,
        password: &str,
    ) -> Result<WalletMetadata, WalletError> {
        if label.trim().is_empty() {
            return Err(WalletError::InvalidInput("Wallet label is empty".to_string()));
        }

        let encrypted = encrypt_wallet(mnemonic, password).await?;
        let metadata = WalletMetadata::new(label.trim(), encrypted);

        let mut wallets = self.wallets.write();
        wallets.push(metadata.clone());
        let mut active = self.active_wallet_id.write();
        *active = Some(metadata.id);
        Ok(metadata)
    }

    pub fn rename_wallet(&self, id: Uuid, label: &str) -> Result<(), WalletError> {
        if label.trim().is_empty() {
            return Err(WalletError::InvalidInput("Wallet label is empty".to_string()));
        }
        let mut wallets = self.wallets.write();
        let wallet = wallets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WalletError::NotFoundError(format!("Wallet {}", id)))?;
        wallet.label = label.trim().to_string();
        Ok(())
    }

    /// Removes a wallet. Removing the active one locks the session and
    /// promotes the first remaining wallet (still locked).
    pub fn remove_wallet(&self, id: Uuid) -> Result<(), WalletError> {
        let mut wallets = self.wallets.write();
        let before = wallets.len();
        wallets.retain(|w| w.id != id);
        if wallets.len() == before {
            return Err(WalletError::NotFoundError(format!("Wallet {}", id)));
        }

        let mut active = self.active_wallet_id.write();
        if *active == Some(id) {
            *active = wallets.first().map(|w| w.id);
            drop(active);
            drop(wallets);
            self.session.lock();
        }
        info!("Wallet {} removed", id);
        Ok(())
    }

    /// Replaces a wallet's password given its recovery phrase.
    ///
    /// The phrase must validate; no address is stored independently to
    /// cross-check against, so validation plus re-encryption is the whole
    /// operation.
    pub async fn reset_password(
        &self,
        id: Uuid,
        mnemonic: &str,
        new_password: &str,
    ) -> Result<(), WalletError> {
        info!("Resetting password for wallet {}", id);

        if !validate_mnemonic(mnemonic) {
            return Err(WalletError::InvalidMnemonic(
                "Wordlist or checksum check failed".to_string(),
            ));
        }
        if self.wallet_by_id(id).is_none() {
            return Err(WalletError::NotFoundError(format!("Wallet {}", id)));
        }

        let encrypted = encrypt_wallet(mnemonic, new_password).await?;
        let mut wallets = self.wallets.write();
        let wallet = wallets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WalletError::NotFoundError(format!("Wallet {}", id)))?;
        wallet.encrypted_data = encrypted;
        Ok(())
    }

    /// Changes a wallet's password given the current one.
    pub async fn change_password(
        &self,
        id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), WalletError> {
        let wallet = self
            .wallet_by_id(id)
            .ok_or_else(|| WalletError::NotFoundError(format!("Wallet {}", id)))?;

        let mnemonic = decrypt_wallet(&wallet.encrypted_data, old_password).await?;
        let encrypted = encrypt_wallet(&mnemonic, new_password).await?;

        let mut wallets = self.wallets.write();
        let wallet = wallets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WalletError::NotFoundError(format!("Wallet {}", id)))?;
        wallet.encrypted_data = encrypted;
        Ok(())
    }

    /// Derives keys from a mnemonic and installs them in the session.
    pub(super) fn unlock_with_mnemonic(
        &self,
        mnemonic: &str,
        password: Option<&str>,
    ) -> Result<(), WalletError> {
        self.session.begin_unlock();
        match derive_account_zero(mnemonic) {
            Ok(keys) => self.session.complete_unlock(keys, password),
            Err(e) => {
                self.session.abort_unlock();
                Err(e)
            }
        }
    }
}
