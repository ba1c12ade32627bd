//! Events emitted by the session for presentation layers to observe.
//!
//! Consumers subscribe via `SessionHandle::subscribe_events` and react to
//! state changes without blocking the worker loop.

use mint_chain_core::{Account, ChainId, ContractError, MintEvent, TxHash, TxReceipt};

/// Events published on the session's broadcast channel.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An account was authorized and the session is fully established.
    Connected { account: Account },

    /// The session returned to the disconnected state.
    Disconnected,

    /// The provider is on a different chain than expected. Warning only;
    /// no operation is blocked.
    ChainMismatch { actual: ChainId, expected: ChainId },

    /// The minted counter was re-synchronized from the contract.
    CountSeeded { minted_count: u64 },

    /// A mint transaction was accepted by the provider.
    MintSubmitted { tx_hash: TxHash },

    /// A locally submitted mint transaction was mined.
    MintMined { receipt: TxReceipt },

    /// A mint submission or confirmation failed. The in-flight flag has
    /// been cleared; the counter is untouched.
    MintFailed { error: ContractError },

    /// A mint event arrived from the contract (any account, not just the
    /// local one) and the counter was incremented.
    MintObserved { event: MintEvent, minted_count: u64 },
}
