//! JSON-RPC backend for the mint client.
//!
//! Implements the `mint-chain-core` traits over an HTTP JSON-RPC endpoint:
//! - [`EthWalletProvider`]: `eth_accounts` / `eth_requestAccounts` / `eth_chainId`
//! - [`EthMintContract`]: `eth_sendTransaction` + receipt polling for mints,
//!   `eth_call` for the minted total, and a polled log filter for mint events
//!
//! Intended for headless use against a node with managed accounts; a
//! browser-injected provider plugs in through the same traits.

pub mod abi;
pub mod config;
pub mod contract;
pub mod provider;
pub mod rpc;

use std::sync::Arc;

pub use config::{ConfigError, DEFAULT_CHAIN_ID, DEFAULT_CONTRACT_ADDRESS, EthConfig};
pub use contract::EthMintContract;
pub use provider::EthWalletProvider;
pub use rpc::{RpcClient, RpcError};

/// Build a validated provider/contract pair sharing one RPC client.
pub fn connect(config: &EthConfig) -> Result<(EthWalletProvider, EthMintContract), ConfigError> {
    config.validate()?;

    let rpc = Arc::new(RpcClient::new(config.rpc_url.clone()));
    let provider = EthWalletProvider::new(Arc::clone(&rpc));
    let contract = EthMintContract::new(rpc, config);
    Ok((provider, contract))
}
