//! Backend configuration structures and loaders.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use mint_chain_core::ChainId;

/// Address of the deployed mint contract.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x33f1af8a7b9980e8ce9d43a0eb1d5668022c5f07";

/// Chain the contract is deployed to.
pub const DEFAULT_CHAIN_ID: ChainId = ChainId(4);

/// Invalid backend configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// Configuration for the JSON-RPC backend.
///
/// The contract address and expected chain are fixed deployment constants,
/// not runtime-negotiated values.
#[derive(Clone, Debug)]
pub struct EthConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Deployed contract address (`0x` + 40 hex chars).
    pub contract_address: String,

    /// Chain the client expects the provider to be connected to.
    pub expected_chain_id: ChainId,

    /// Interval between transaction-receipt polls.
    pub receipt_poll_interval: Duration,

    /// Interval between event-filter polls.
    pub event_poll_interval: Duration,
}

impl Default for EthConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            expected_chain_id: DEFAULT_CHAIN_ID,
            receipt_poll_interval: Duration::from_secs(1),
            event_poll_interval: Duration::from_secs(2),
        }
    }
}

impl EthConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MINT_RPC_URL` - JSON-RPC endpoint (default: http://localhost:8545)
    /// - `MINT_CONTRACT_ADDRESS` - deployed contract address
    /// - `MINT_EXPECTED_CHAIN_ID` - expected chain id (default: 4)
    /// - `MINT_RECEIPT_POLL_MS` - receipt poll interval in ms (default: 1000)
    /// - `MINT_EVENT_POLL_MS` - event poll interval in ms (default: 2000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("MINT_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(address) = env::var("MINT_CONTRACT_ADDRESS") {
            config.contract_address = address.to_ascii_lowercase();
        }
        if let Some(chain) = read_env::<u64>("MINT_EXPECTED_CHAIN_ID") {
            config.expected_chain_id = ChainId(chain);
        }
        if let Some(ms) = read_env::<u64>("MINT_RECEIPT_POLL_MS") {
            config.receipt_poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(ms) = read_env::<u64>("MINT_EVENT_POLL_MS") {
            config.event_poll_interval = Duration::from_millis(ms.max(1));
        }

        config
    }

    /// Validate endpoint and address formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(ConfigError(format!(
                "rpc_url must be an http(s) endpoint, got {:?}",
                self.rpc_url
            )));
        }

        let address = &self.contract_address;
        let hex_part = address
            .strip_prefix("0x")
            .ok_or_else(|| ConfigError(format!("contract address missing 0x prefix: {address:?}")))?;
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError(format!(
                "contract address must be 20 bytes of hex: {address:?}"
            )));
        }

        Ok(())
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EthConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let config = EthConfig {
            rpc_url: "ws://localhost:8546".to_string(),
            ..EthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_malformed_contract_address() {
        let config = EthConfig {
            contract_address: "0x1234".to_string(),
            ..EthConfig::default()
        };
        assert!(config.validate().is_err());

        let config = EthConfig {
            contract_address: "33f1af8a7b9980e8ce9d43a0eb1d5668022c5f07".to_string(),
            ..EthConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
