//! Client-side wallet engine for the Octra network.
//!
//! Owns the pieces with real cryptographic and protocol-correctness
//! requirements: deterministic key derivation from a BIP-39 mnemonic,
//! password-based encryption of the wallet at rest, transaction signing,
//! the shielded-balance codec, and the session cache that gates access to
//! key material. UI, routing and rendering live elsewhere and talk to this
//! crate through [`core::WalletManager`].
//!
//! Security caveat worth reading twice: several node endpoints require the
//! raw account seed over the wire so the node can compute views of the
//! shielded balance. That exposure is mandated by the remote protocol and
//! preserved here for interoperability; see `network::client`.

pub mod core;
pub mod crypto;
pub mod network;
pub mod security;

pub use crate::core::errors::WalletError;
pub use crate::core::WalletManager;
