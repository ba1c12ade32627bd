//! Chain abstraction layer for the mint client.
//!
//! # Architecture
//!
//! ```text
//! Session layer (mint-session)
//!          │
//!          ├── WalletGateway ── dyn WalletProvider (accounts, chain id)
//!          ├── NetworkGuard ─── chain validation (warn, never block)
//!          └── dyn MintContract (mint, totalMinted, mint events)
//! ```
//!
//! The traits in [`traits`] are the only seam between the session state
//! machine and a concrete chain backend. `mint-chain-eth` implements them
//! over JSON-RPC; [`mock::MockChain`] implements them in memory for tests
//! and offline development.

pub mod gateway;
pub mod mock;
pub mod network;
pub mod traits;
pub mod types;

pub use gateway::WalletGateway;
pub use network::NetworkGuard;
pub use traits::{ContractError, MintContract, WalletError, WalletProvider};
pub use types::{
    Account, ChainCheck, ChainId, MintEvent, MintSubscription, PendingMint, SubscriptionGuard,
    TokenId, TxHash, TxReceipt,
};
