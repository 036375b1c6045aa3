use serde::{Deserialize, Serialize};

/// Remote node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node RPC endpoint URL.
    #[serde(default = "NodeConfig::default_endpoint")]
    pub endpoint: String,

    /// Timeout in seconds for node requests.
    #[serde(default = "NodeConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NodeConfig {
    fn default_endpoint() -> String {
        "https://octra.network".to_string()
    }

    fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Auto-lock timeout in minutes. 0 = never.
    #[serde(default = "SecurityConfig::default_auto_lock_minutes")]
    pub auto_lock_minutes: u64,
}

impl SecurityConfig {
    fn default_auto_lock_minutes() -> u64 {
        15
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { auto_lock_minutes: Self::default_auto_lock_minutes() }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WalletConfig {
    #[serde(default)]
    pub node: NodeConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl WalletConfig {
    /// Builds a configuration from defaults plus environment overrides.
    ///
    /// `OCTRA_NODE_URL` overrides the node endpoint.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OCTRA_NODE_URL") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                config.node.endpoint = trimmed.trim_end_matches('/').to_string();
            }
        }
        config
    }
}
