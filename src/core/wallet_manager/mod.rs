//! Wallet manager: the single owner of the wallet registry, the session
//! cache and the node client.
//!
//! Split across focused modules:
//! - `lifecycle`: create/import/rename/remove/password reset
//! - `switching`: unlock, lock, active-wallet switching
//! - `balance`: balance and history reads
//! - `transactions`: public transfers
//! - `shielded`: encrypted balance and private transfers

mod balance;
mod lifecycle;
mod shielded;
mod switching;
mod transactions;

pub use shielded::PendingTransferView;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::config::WalletConfig;
use crate::core::errors::WalletError;
use crate::core::wallet_info::{Contact, WalletMetadata};
use crate::network::client::NodeClient;
use crate::security::session::SessionCache;

pub struct WalletManager {
    config: WalletConfig,
    client: NodeClient,
    session: SessionCache,
    wallets: RwLock<Vec<WalletMetadata>>,
    contacts: RwLock<Vec<Contact>>,
    active_wallet_id: RwLock<Option<Uuid>>,
}

impl WalletManager {
    pub fn new(config: WalletConfig) -> Result<Self, WalletError> {
        let client = NodeClient::new(&config.node)?;
        Ok(Self {
            config,
            client,
            session: SessionCache::new(),
            wallets: RwLock::new(Vec::new()),
            contacts: RwLock::new(Vec::new()),
            active_wallet_id: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    pub fn session(&self) -> &SessionCache {
        &self.session
    }

    /// Snapshot of the registered wallets.
    pub fn wallets(&self) -> Vec<WalletMetadata> {
        self.wallets.read().clone()
    }

    pub fn active_wallet_id(&self) -> Option<Uuid> {
        *self.active_wallet_id.read()
    }

    /// Metadata of the active wallet, if any.
    pub fn active_wallet(&self) -> Option<WalletMetadata> {
        let id = self.active_wallet_id()?;
        self.wallet_by_id(id)
    }

    pub fn wallet_by_id(&self, id: Uuid) -> Option<WalletMetadata> {
        self.wallets.read().iter().find(|w| w.id == id).cloned()
    }

    /// The active account address; errors when locked.
    pub fn active_address(&self) -> Result<String, WalletError> {
        self.session.address().ok_or(WalletError::SessionExpiredOrLocked)
    }

    /// Whether the unlocked session has outlived the configured auto-lock
    /// timeout. The core runs no timers; the embedder polls this and calls
    /// `lock()` on a true result.
    pub fn session_expired(&self) -> bool {
        let timeout = std::time::Duration::from_secs(self.config.security.auto_lock_minutes * 60);
        self.session.is_expired(timeout)
    }

    // --- address book ---

    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts.read().clone()
    }

    pub fn add_contact(&self, name: &str, address: &str) -> Result<Contact, WalletError> {
        if name.trim().is_empty() {
            return Err(WalletError::InvalidInput("Contact name is empty".to_string()));
        }
        if !address.starts_with(crate::crypto::derivation::ADDRESS_PREFIX) {
            return Err(WalletError::InvalidInput("Not an Octra address".to_string()));
        }
        let contact = Contact::new(name.trim(), address);
        self.contacts.write().push(contact.clone());
        Ok(contact)
    }

    pub fn remove_contact(&self, id: Uuid) -> bool {
        let mut contacts = self.contacts.write();
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        contacts.len() != before
    }
}
