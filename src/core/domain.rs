//! Domain types shared across wallet operations.

use serde::{Deserialize, Serialize};

/// Smallest units per OCT.
pub const MICRO_OCT: u64 = 1_000_000;

/// Converts a display amount in OCT to smallest units, rounding to the
/// nearest unit.
pub fn to_micro(oct: f64) -> u64 {
    if oct <= 0.0 || !oct.is_finite() {
        return 0;
    }
    (oct * MICRO_OCT as f64).round() as u64
}

/// Converts smallest units to a display amount in OCT.
pub fn from_micro(micro: u64) -> f64 {
    micro as f64 / MICRO_OCT as f64
}

/// Parses a lenient remote amount value into smallest units.
///
/// The node is inconsistent about number formatting: amounts arrive as JSON
/// numbers, decimal OCT strings ("1.5") or integer micro-unit strings
/// ("1500000"). A string with a decimal point is treated as OCT; anything
/// else as micro units. Unparseable values collapse to zero (read paths
/// degrade, they do not crash).
pub fn parse_amount_micro(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                i
            } else {
                n.as_f64().map(to_micro).unwrap_or(0)
            }
        }
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.contains('.') {
                s.parse::<f64>().map(to_micro).unwrap_or(0)
            } else {
                s.parse::<u64>().unwrap_or(0)
            }
        }
        _ => 0,
    }
}

/// Snapshot of an account's public and shielded state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Public balance in smallest units.
    pub balance: u64,
    /// Current transaction nonce.
    pub nonce: u64,
    /// Shielded balance in smallest units. Zero when the view call fails.
    pub encrypted_balance: u64,
    /// Transactions from this account still in the staging pool.
    pub staging_count: usize,
}

/// Direction of a historical transaction relative to the active account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// A parsed entry of the account's transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub direction: Direction,
    /// The other party: sender for incoming, recipient for outgoing.
    pub counterparty: String,
    /// Amount in smallest units.
    pub amount: u64,
    /// Unix timestamp in seconds.
    pub timestamp: f64,
    pub epoch: Option<u64>,
    pub message: Option<String>,
}

/// Outcome of a multi-recipient send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiSendReport {
    pub succeeded: usize,
    pub failed: usize,
}
