//! Provider and contract abstraction traits.
//!
//! Two seams separate the session core from the outside world:
//! - [`WalletProvider`]: the injected wallet capability (accounts, chain id)
//! - [`MintContract`]: reads/writes against the fixed mint contract
//!
//! Backends (JSON-RPC, browser bridge, in-memory mock) implement both.

use async_trait::async_trait;

use crate::types::{Account, ChainId, MintSubscription, PendingMint};

// ============================================================================
// Error Types
// ============================================================================

/// Wallet-layer errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet provider detected")]
    NoProvider,

    #[error("user rejected the authorization request")]
    UserRejected,

    #[error("wallet network error: {0}")]
    Network(String),
}

/// Contract-layer errors.
///
/// Each failure mode stays a distinct variant so callers can react to
/// rejection, revert, and transport problems differently.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContractError {
    #[error("no wallet provider detected")]
    NoProvider,

    #[error("user rejected the transaction")]
    TxRejected,

    #[error("transaction reverted on-chain: {0}")]
    TxReverted(String),

    #[error("a mint-event subscription is already active")]
    AlreadySubscribed,

    #[error("contract network error: {0}")]
    Network(String),

    #[error("invalid contract response: {0}")]
    InvalidData(String),
}

// ============================================================================
// Traits
// ============================================================================

/// Raw wallet provider capability.
///
/// Mirrors the minimal request surface of an injected browser wallet:
/// `eth_accounts`, `eth_requestAccounts`, `eth_chainId`. Implementations
/// never retry on their own; a rejected prompt is a terminal failure for
/// that attempt.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the user has already authorized, without prompting.
    /// An empty list means "not yet authorized".
    async fn authorized_accounts(&self) -> Result<Vec<Account>, WalletError>;

    /// Prompt the user for authorization and return the granted accounts.
    async fn request_accounts(&self) -> Result<Vec<Account>, WalletError>;

    /// The chain the provider is currently connected to.
    async fn chain_id(&self) -> Result<ChainId, WalletError>;
}

/// Reads, writes, and event subscription against the fixed mint contract.
#[async_trait]
pub trait MintContract: Send + Sync {
    /// Submit a mint transaction on behalf of `from`.
    ///
    /// Resolves once the transaction has been accepted by the provider; the
    /// returned [`PendingMint`] resolves when it is mined.
    async fn mint(&self, from: &Account) -> Result<PendingMint, ContractError>;

    /// Point-in-time read of the minted total. Used to seed the local
    /// counter on connect; subsequent increments come from events only.
    async fn total_minted(&self, account: &Account) -> Result<u64, ContractError>;

    /// Subscribe to mint-completion events.
    ///
    /// The stream is contract-wide, not filtered to any account. At most one
    /// subscription may be live per client; the previous one must be dropped
    /// first or this fails with [`ContractError::AlreadySubscribed`].
    async fn subscribe_mint_events(&self) -> Result<MintSubscription, ContractError>;
}
