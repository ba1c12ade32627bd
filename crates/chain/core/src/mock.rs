//! In-memory chain backend for tests and offline development.
//!
//! Implements both [`WalletProvider`] and [`MintContract`] with scripted
//! behavior: tests decide whether prompts are granted, whether mints mine or
//! revert, and when mint events are delivered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::traits::{ContractError, MintContract, WalletError, WalletProvider};
use crate::types::{
    Account, ChainId, MintEvent, MintSubscription, PendingMint, SubscriptionGuard, TxHash,
    TxReceipt,
};

/// How the mock responds to an authorization prompt.
#[derive(Clone)]
enum PromptBehavior {
    Grant(Account),
    Reject,
}

/// How the mock resolves a submitted mint.
#[derive(Clone)]
enum MintOutcome {
    Mine,
    RejectPrompt,
    Revert(String),
}

struct MockState {
    chain: ChainId,
    authorized: Vec<Account>,
    prompt: PromptBehavior,
    mint_outcome: MintOutcome,
    total_minted: u64,
    prompt_calls: u64,
    mint_calls: u64,
    tx_counter: u64,
}

/// Scriptable in-memory wallet + contract.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<MockState>>,
    events_tx: broadcast::Sender<MintEvent>,
    subscription_active: Arc<AtomicBool>,
}

impl MockChain {
    pub fn new(chain: ChainId) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            state: Arc::new(Mutex::new(MockState {
                chain,
                authorized: Vec::new(),
                prompt: PromptBehavior::Reject,
                mint_outcome: MintOutcome::Mine,
                total_minted: 0,
                prompt_calls: 0,
                mint_calls: 0,
                tx_counter: 0,
            })),
            events_tx,
            subscription_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pre-authorize an account, as if the user had connected previously.
    pub fn authorize(&self, account: Account) {
        self.state.lock().unwrap().authorized = vec![account];
    }

    /// Make the next authorization prompt grant `account`.
    pub fn grant_on_request(&self, account: Account) {
        self.state.lock().unwrap().prompt = PromptBehavior::Grant(account);
    }

    /// Make authorization prompts fail with a user rejection.
    pub fn reject_authorization(&self) {
        self.state.lock().unwrap().prompt = PromptBehavior::Reject;
    }

    pub fn set_chain(&self, chain: ChainId) {
        self.state.lock().unwrap().chain = chain;
    }

    pub fn set_total_minted(&self, total: u64) {
        self.state.lock().unwrap().total_minted = total;
    }

    /// Make submitted mints revert on confirmation.
    pub fn revert_mints(&self, reason: impl Into<String>) {
        self.state.lock().unwrap().mint_outcome = MintOutcome::Revert(reason.into());
    }

    /// Make mint submissions fail at the wallet prompt.
    pub fn reject_mints(&self) {
        self.state.lock().unwrap().mint_outcome = MintOutcome::RejectPrompt;
    }

    /// Deliver a mint event to the active subscription, if any.
    pub fn emit_mint_event(&self, event: MintEvent) {
        // A send error only means nobody is subscribed.
        let _ = self.events_tx.send(event);
    }

    /// Number of authorization prompts shown so far.
    pub fn prompt_calls(&self) -> u64 {
        self.state.lock().unwrap().prompt_calls
    }

    /// Number of mint transactions submitted so far.
    pub fn mint_calls(&self) -> u64 {
        self.state.lock().unwrap().mint_calls
    }

    pub fn subscription_active(&self) -> bool {
        self.subscription_active.load(Ordering::SeqCst)
    }

    fn next_tx_hash(&self) -> (TxHash, u64) {
        let mut state = self.state.lock().unwrap();
        state.tx_counter += 1;
        (
            TxHash::new(format!("0x{:064x}", state.tx_counter)),
            state.tx_counter,
        )
    }
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn authorized_accounts(&self) -> Result<Vec<Account>, WalletError> {
        Ok(self.state.lock().unwrap().authorized.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Account>, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.prompt_calls += 1;
        match state.prompt.clone() {
            PromptBehavior::Grant(account) => {
                state.authorized = vec![account.clone()];
                Ok(vec![account])
            }
            PromptBehavior::Reject => Err(WalletError::UserRejected),
        }
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        Ok(self.state.lock().unwrap().chain)
    }
}

#[async_trait]
impl MintContract for MockChain {
    async fn mint(&self, _from: &Account) -> Result<PendingMint, ContractError> {
        let outcome = {
            let mut state = self.state.lock().unwrap();
            state.mint_calls += 1;
            state.mint_outcome.clone()
        };

        match outcome {
            MintOutcome::RejectPrompt => Err(ContractError::TxRejected),
            MintOutcome::Mine => {
                let (tx_hash, block) = self.next_tx_hash();
                let receipt = TxReceipt {
                    tx_hash: tx_hash.clone(),
                    block_number: block,
                };
                Ok(PendingMint::new(tx_hash, async move { Ok(receipt) }))
            }
            MintOutcome::Revert(reason) => {
                let (tx_hash, _) = self.next_tx_hash();
                Ok(PendingMint::new(tx_hash, async move {
                    Err(ContractError::TxReverted(reason))
                }))
            }
        }
    }

    async fn total_minted(&self, _account: &Account) -> Result<u64, ContractError> {
        Ok(self.state.lock().unwrap().total_minted)
    }

    async fn subscribe_mint_events(&self) -> Result<MintSubscription, ContractError> {
        if self.subscription_active.swap(true, Ordering::SeqCst) {
            return Err(ContractError::AlreadySubscribed);
        }

        let mut broadcast_rx = self.events_tx.subscribe();
        let (tx, rx) = mpsc::channel(32);

        let task = tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "mock subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let guard = SubscriptionGuard::new(task, Arc::clone(&self.subscription_active));
        Ok(MintSubscription::new(rx, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(tag: u8) -> Account {
        Account::new(format!("0x{:040x}", tag))
    }

    #[tokio::test]
    async fn mint_resolves_with_receipt() {
        let chain = MockChain::new(ChainId(4));
        let pending = chain.mint(&account(1)).await.unwrap();
        let tx_hash = pending.tx_hash().clone();

        let receipt = pending.confirmed().await.unwrap();
        assert_eq!(receipt.tx_hash, tx_hash);
        assert_eq!(chain.mint_calls(), 1);
    }

    #[tokio::test]
    async fn reverted_mint_surfaces_tx_reverted() {
        let chain = MockChain::new(ChainId(4));
        chain.revert_mints("supply exhausted");

        let pending = chain.mint(&account(1)).await.unwrap();
        match pending.confirmed().await {
            Err(ContractError::TxReverted(reason)) => assert_eq!(reason, "supply exhausted"),
            other => panic!("expected TxReverted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_subscription_requires_retiring_the_first() {
        let chain = MockChain::new(ChainId(4));

        let first = chain.subscribe_mint_events().await.unwrap();
        assert!(matches!(
            chain.subscribe_mint_events().await,
            Err(ContractError::AlreadySubscribed)
        ));

        drop(first);
        // Dropping the guard releases the slot.
        let _second = chain.subscribe_mint_events().await.unwrap();
    }

    #[tokio::test]
    async fn subscription_delivers_emitted_events() {
        let chain = MockChain::new(ChainId(4));
        let mut subscription = chain.subscribe_mint_events().await.unwrap();

        chain.emit_mint_event(MintEvent {
            from: account(7),
            token_id: crate::types::TokenId(42),
        });

        let event = subscription.recv().await.unwrap();
        assert_eq!(event.from, account(7));
        assert_eq!(event.token_id.0, 42);
    }
}
