//! High-level session orchestrator.
//!
//! Owns the background worker, wires up command/event channels, and exposes
//! a builder-based API for presentation layers to drive the session.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use mint_chain_core::{MintContract, WalletGateway};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::handle::SessionHandle;
use crate::worker::SessionWorker;

/// Main session orchestrator.
///
/// Design: `Session` owns the worker task; [`SessionHandle`] provides a
/// cloneable façade for clients.
pub struct Session {
    handle: SessionHandle,
    worker_handle: JoinHandle<()>,
}

impl Session {
    /// Create a new session builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Get a cloneable handle to this session.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Subscribe to session events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.handle.subscribe_events()
    }

    /// Shut down the session gracefully.
    ///
    /// The worker exits once every handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(SessionError::WorkerJoin)
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    config: Option<SessionConfig>,
    gateway: Option<WalletGateway>,
    contract: Option<Arc<dyn MintContract>>,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: None,
            gateway: None,
            contract: None,
        }
    }

    /// Set the session configuration (required).
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the wallet gateway (required).
    pub fn gateway(mut self, gateway: WalletGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the contract client (required).
    pub fn contract(mut self, contract: Arc<dyn MintContract>) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Spawn the worker and return the running session.
    ///
    /// If silent reconnection is enabled (the default), the worker first
    /// attempts to resume a previously authorized session without a prompt.
    pub fn build(self) -> Result<Session> {
        let config = self.config.ok_or(SessionError::MissingConfig)?;
        let gateway = self.gateway.ok_or(SessionError::MissingGateway)?;
        let contract = self.contract.ok_or(SessionError::MissingContract)?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);
        let (event_tx, _) = broadcast::channel(config.event_buffer_size);

        let worker = SessionWorker::new(&config, gateway, contract, command_rx, event_tx.clone());
        let worker_handle = tokio::spawn(worker.run());

        Ok(Session {
            handle: SessionHandle::new(command_tx, event_tx),
            worker_handle,
        })
    }
}
