//! Wallet provider backed by node-managed accounts over JSON-RPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use mint_chain_core::{Account, ChainId, WalletError, WalletProvider};

use crate::abi;
use crate::rpc::{RpcClient, wallet_error};

/// [`WalletProvider`] implementation speaking `eth_accounts`,
/// `eth_requestAccounts`, and `eth_chainId` against an HTTP endpoint.
///
/// With node-managed accounts there is no interactive prompt;
/// `eth_requestAccounts` behaves like `eth_accounts`. A browser-bridged
/// provider implements the same trait with a real prompt.
pub struct EthWalletProvider {
    rpc: Arc<RpcClient>,
}

impl EthWalletProvider {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    fn parse_accounts(value: Value) -> Result<Vec<Account>, WalletError> {
        let entries = value
            .as_array()
            .ok_or_else(|| WalletError::Network("accounts response is not an array".to_string()))?;

        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(Account::new)
                    .ok_or_else(|| WalletError::Network("account entry is not a string".to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl WalletProvider for EthWalletProvider {
    async fn authorized_accounts(&self) -> Result<Vec<Account>, WalletError> {
        let result = self
            .rpc
            .call("eth_accounts", json!([]))
            .await
            .map_err(wallet_error)?;
        Self::parse_accounts(result)
    }

    async fn request_accounts(&self) -> Result<Vec<Account>, WalletError> {
        let result = self
            .rpc
            .call("eth_requestAccounts", json!([]))
            .await
            .map_err(wallet_error)?;
        Self::parse_accounts(result)
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        let result = self
            .rpc
            .call("eth_chainId", json!([]))
            .await
            .map_err(wallet_error)?;
        let quantity = result
            .as_str()
            .ok_or_else(|| WalletError::Network("chain id response is not a string".to_string()))?;
        let chain = abi::parse_quantity(quantity)
            .map_err(|e| WalletError::Network(e.to_string()))?;
        Ok(ChainId(chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_are_parsed_and_normalized() {
        let value = json!(["0xAAaa000000000000000000000000000000000001"]);
        let accounts = EthWalletProvider::parse_accounts(value).unwrap();
        assert_eq!(
            accounts,
            vec![Account::new("0xaaaa000000000000000000000000000000000001")]
        );
    }

    #[test]
    fn non_array_response_is_a_network_error() {
        assert!(matches!(
            EthWalletProvider::parse_accounts(json!("0xabc")),
            Err(WalletError::Network(_))
        ));
    }
}
