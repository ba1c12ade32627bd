//! Session configuration.

use mint_chain_core::ChainId;

/// Configuration shared across the session orchestrator and worker.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Chain the client expects the provider to be connected to.
    pub expected_chain_id: ChainId,

    /// Collection size, if the renderer should show "N of M minted".
    /// Informational only; supply enforcement lives in the contract.
    pub max_supply: Option<u64>,

    /// Capacity of the outbound event broadcast channel.
    pub event_buffer_size: usize,

    /// Capacity of the inbound command channel.
    pub command_buffer_size: usize,

    /// Attempt silent reconnection from previously authorized accounts on
    /// startup (default: true).
    pub silent_reconnect: bool,
}

impl SessionConfig {
    pub fn new(expected_chain_id: ChainId) -> Self {
        Self {
            expected_chain_id,
            max_supply: None,
            event_buffer_size: 100,
            command_buffer_size: 32,
            silent_reconnect: true,
        }
    }
}
