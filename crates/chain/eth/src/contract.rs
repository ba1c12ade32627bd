//! Contract binding for the mint contract over JSON-RPC.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use mint_chain_core::{
    Account, ContractError, MintContract, MintEvent, MintSubscription, PendingMint,
    SubscriptionGuard, TokenId, TxHash, TxReceipt,
};

use crate::abi;
use crate::config::EthConfig;
use crate::rpc::{RpcClient, contract_error};

/// Canonical signatures of the deployed contract's surface.
const MINT_SIGNATURE: &str = "makeAnEpicNFT()";
const TOTAL_MINTED_SIGNATURE: &str = "getTotalNFTsMintedSoFar(address)";
const MINT_EVENT_SIGNATURE: &str = "newEpicNftMinted(address,uint256)";

/// Capacity of the subscription delivery channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// [`MintContract`] implementation bound to a fixed contract address.
///
/// Writes go through `eth_sendTransaction` (the provider signs on behalf of
/// `from`), confirmation through receipt polling, and the event subscription
/// through an installed log filter polled on a background task.
pub struct EthMintContract {
    rpc: Arc<RpcClient>,
    address: String,
    mint_calldata: String,
    total_minted_selector: [u8; 4],
    mint_event_topic: String,
    receipt_poll_interval: Duration,
    event_poll_interval: Duration,
    subscription_active: Arc<AtomicBool>,
}

impl EthMintContract {
    pub fn new(rpc: Arc<RpcClient>, config: &EthConfig) -> Self {
        Self {
            rpc,
            address: config.contract_address.to_ascii_lowercase(),
            mint_calldata: abi::encode_call(abi::selector(MINT_SIGNATURE)),
            total_minted_selector: abi::selector(TOTAL_MINTED_SIGNATURE),
            mint_event_topic: abi::event_topic(MINT_EVENT_SIGNATURE),
            receipt_poll_interval: config.receipt_poll_interval,
            event_poll_interval: config.event_poll_interval,
            subscription_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Poll until the transaction is mined, then interpret its status.
    async fn await_receipt(
        rpc: Arc<RpcClient>,
        tx_hash: TxHash,
        poll_interval: Duration,
    ) -> Result<TxReceipt, ContractError> {
        loop {
            let receipt = rpc
                .call("eth_getTransactionReceipt", json!([tx_hash.as_str()]))
                .await
                .map_err(contract_error)?;

            if receipt.is_null() {
                tokio::time::sleep(poll_interval).await;
                continue;
            }

            let status = receipt
                .get("status")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ContractError::InvalidData("receipt missing status field".to_string())
                })?;
            if abi::parse_quantity(status)? == 0 {
                return Err(ContractError::TxReverted(format!(
                    "transaction {tx_hash} reverted"
                )));
            }

            let block_number = receipt
                .get("blockNumber")
                .and_then(Value::as_str)
                .map(abi::parse_quantity)
                .transpose()?
                .unwrap_or_default();

            tracing::info!(%tx_hash, block_number, "mint transaction mined");
            return Ok(TxReceipt {
                tx_hash,
                block_number,
            });
        }
    }

    fn decode_mint_log(log: &Value) -> Result<MintEvent, ContractError> {
        let topics = log
            .get("topics")
            .and_then(Value::as_array)
            .ok_or_else(|| ContractError::InvalidData("log missing topics".to_string()))?;
        let from_topic = topics
            .get(1)
            .and_then(Value::as_str)
            .ok_or_else(|| ContractError::InvalidData("log missing sender topic".to_string()))?;
        let from = abi::address_from_topic(from_topic)?;

        let data = log
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| ContractError::InvalidData("log missing data".to_string()))?;
        let token_id = TokenId(abi::parse_u256_word(data)?);

        Ok(MintEvent { from, token_id })
    }
}

#[async_trait]
impl MintContract for EthMintContract {
    async fn mint(&self, from: &Account) -> Result<PendingMint, ContractError> {
        let params = json!([{
            "from": from.as_str(),
            "to": self.address.as_str(),
            "data": self.mint_calldata.as_str(),
        }]);

        let result = self
            .rpc
            .call("eth_sendTransaction", params)
            .await
            .map_err(contract_error)?;
        let tx_hash = result
            .as_str()
            .map(TxHash::new)
            .ok_or_else(|| ContractError::InvalidData("tx hash is not a string".to_string()))?;

        tracing::info!(%tx_hash, from = %from.short(), "mint transaction submitted");

        let confirmation = Self::await_receipt(
            Arc::clone(&self.rpc),
            tx_hash.clone(),
            self.receipt_poll_interval,
        );
        Ok(PendingMint::new(tx_hash, confirmation))
    }

    async fn total_minted(&self, account: &Account) -> Result<u64, ContractError> {
        let data = abi::encode_call_address(self.total_minted_selector, account)?;
        let params = json!([{ "to": self.address.as_str(), "data": data }, "latest"]);

        let result = self
            .rpc
            .call("eth_call", params)
            .await
            .map_err(contract_error)?;
        let word = result
            .as_str()
            .ok_or_else(|| ContractError::InvalidData("eth_call result is not a string".to_string()))?;
        abi::parse_u256_word(word)
    }

    async fn subscribe_mint_events(&self) -> Result<MintSubscription, ContractError> {
        if self.subscription_active.swap(true, Ordering::SeqCst) {
            return Err(ContractError::AlreadySubscribed);
        }

        let filter_params = json!([{
            "address": self.address.as_str(),
            "topics": [self.mint_event_topic.as_str()],
        }]);
        let filter_id = match self.rpc.call("eth_newFilter", filter_params).await {
            Ok(id) => id,
            Err(e) => {
                self.subscription_active.store(false, Ordering::SeqCst);
                return Err(contract_error(e));
            }
        };

        tracing::info!(?filter_id, "mint event subscription established");

        let rpc = Arc::clone(&self.rpc);
        let poll_interval = self.event_poll_interval;
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(poll_interval).await;

                let changes = match rpc
                    .call("eth_getFilterChanges", json!([filter_id.clone()]))
                    .await
                {
                    Ok(Value::Array(logs)) => logs,
                    Ok(other) => {
                        tracing::warn!(?other, "unexpected filter changes payload");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "event filter poll failed");
                        continue;
                    }
                };

                for log in &changes {
                    match Self::decode_mint_log(log) {
                        Ok(event) => {
                            tracing::debug!(from = %event.from.short(), token_id = %event.token_id, "mint event");
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "undecodable mint log"),
                    }
                }
            }
        });

        let guard = SubscriptionGuard::new(task, Arc::clone(&self.subscription_active));
        Ok(MintSubscription::new(rx, guard))
    }
}
