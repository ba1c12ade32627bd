//! Unified error types surfaced by the session API.
//!
//! Wraps failures from the wallet and contract layers plus worker
//! coordination errors so callers see one consistent taxonomy.

use thiserror::Error;
use tokio::sync::oneshot;

use mint_chain_core::{ContractError, WalletError};

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no connected account")]
    NotConnected,

    #[error("a mint is already in flight")]
    MintInFlight,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("session requires a configuration before building")]
    MissingConfig,

    #[error("session requires a wallet gateway before building")]
    MissingGateway,

    #[error("session requires a contract client before building")]
    MissingContract,
}
