//! Common types shared between wallet gateways, contract clients, and the
//! session layer.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::traits::ContractError;

/// A wallet account address, stored as a lowercase hex string.
///
/// Addresses arriving from providers are normalized on construction so
/// equality checks never depend on the provider's casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated display form (`0x1234...abcd`) for UI layers.
    pub fn short(&self) -> String {
        if self.0.len() > 10 {
            format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the network a provider is currently connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a minted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction hash as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Notification emitted by the contract each time a mint completes.
///
/// Events are contract-wide: `from` may be any account, not just the local
/// user's. Consumers must tolerate events unrelated to their own actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEvent {
    pub from: Account,
    pub token_id: TokenId,
}

/// Result of chain validation against the expected network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCheck {
    /// Provider is on the expected chain.
    Ok,
    /// Provider is on a different chain. Non-fatal: operations continue and
    /// fail at the contract layer if the chain truly cannot serve them.
    Mismatch { actual: ChainId, expected: ChainId },
}

impl ChainCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, ChainCheck::Ok)
    }
}

/// A submitted mint transaction awaiting inclusion.
///
/// The transaction hash is available immediately; [`PendingMint::confirmed`]
/// resolves once the transaction is mined (or reverts).
pub struct PendingMint {
    tx_hash: TxHash,
    confirmation: Pin<Box<dyn Future<Output = Result<TxReceipt, ContractError>> + Send>>,
}

impl PendingMint {
    pub fn new(
        tx_hash: TxHash,
        confirmation: impl Future<Output = Result<TxReceipt, ContractError>> + Send + 'static,
    ) -> Self {
        Self {
            tx_hash,
            confirmation: Box::pin(confirmation),
        }
    }

    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    /// Wait for the transaction to be mined.
    pub async fn confirmed(self) -> Result<TxReceipt, ContractError> {
        self.confirmation.await
    }
}

impl fmt::Debug for PendingMint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingMint")
            .field("tx_hash", &self.tx_hash)
            .finish_non_exhaustive()
    }
}

/// Keeps the backend delivery task alive; retires it when dropped.
///
/// Dropping the guard aborts the delivery task and releases the backend's
/// single-subscription slot, so a new subscription can be established.
pub struct SubscriptionGuard {
    task: Option<JoinHandle<()>>,
    active: Arc<AtomicBool>,
}

impl SubscriptionGuard {
    pub fn new(task: JoinHandle<()>, active: Arc<AtomicBool>) -> Self {
        Self {
            task: Some(task),
            active,
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

/// An active mint-event subscription.
///
/// Exactly one subscription may be live per contract client. The previous
/// subscription must be dropped before a new one is established, otherwise
/// events would be delivered (and counted) twice.
pub struct MintSubscription {
    events: mpsc::Receiver<MintEvent>,
    _guard: SubscriptionGuard,
}

impl MintSubscription {
    pub fn new(events: mpsc::Receiver<MintEvent>, guard: SubscriptionGuard) -> Self {
        Self {
            events,
            _guard: guard,
        }
    }

    /// Receive the next mint event. Returns `None` once the backend
    /// delivery task has stopped.
    pub async fn recv(&mut self) -> Option<MintEvent> {
        self.events.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_is_normalized_to_lowercase() {
        let account = Account::new("0xAbCdEf0123456789aBcDeF0123456789abcdef01");
        assert_eq!(
            account.as_str(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn account_short_form() {
        let account = Account::new("0x1234567890123456789012345678901234567890");
        assert_eq!(account.short(), "0x1234...7890");

        let tiny = Account::new("0x1234");
        assert_eq!(tiny.short(), "0x1234");
    }

    #[test]
    fn chain_check_mismatch_is_not_ok() {
        let check = ChainCheck::Mismatch {
            actual: ChainId(1),
            expected: ChainId(4),
        };
        assert!(!check.is_ok());
        assert!(ChainCheck::Ok.is_ok());
    }
}
