//! Client-facing handle to interact with the session worker.

use tokio::sync::{broadcast, mpsc, oneshot};

use mint_chain_core::{Account, TxHash};

use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::state::SessionSnapshot;
use crate::worker::Command;

/// Cloneable façade over the session worker.
///
/// This is the only mutation surface exposed to presentation layers:
/// `connect`, `mint`, `disconnect`. Everything else is read-only
/// observation via [`SessionHandle::snapshot`] and
/// [`SessionHandle::subscribe_events`].
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
        }
    }

    /// Request wallet authorization and establish the session.
    pub async fn connect(&self) -> Result<Account> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Connect { reply: reply_tx })
            .await
            .map_err(|_| SessionError::CommandChannelClosed)?;
        reply_rx.await.map_err(SessionError::ReplyChannelClosed)?
    }

    /// Submit a mint transaction.
    ///
    /// Resolves with the transaction hash once the provider accepts the
    /// submission. Confirmation (or revert) is reported asynchronously as
    /// [`SessionEvent::MintMined`] / [`SessionEvent::MintFailed`]. Rejected
    /// locally with [`SessionError::MintInFlight`] while a mint is pending.
    pub async fn mint(&self) -> Result<TxHash> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Mint { reply: reply_tx })
            .await
            .map_err(|_| SessionError::CommandChannelClosed)?;
        reply_rx.await.map_err(SessionError::ReplyChannelClosed)?
    }

    /// Tear down the session and return to the disconnected state.
    pub async fn disconnect(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Disconnect { reply: reply_tx })
            .await
            .map_err(|_| SessionError::CommandChannelClosed)?;
        reply_rx.await.map_err(SessionError::ReplyChannelClosed)
    }

    /// Query the current session state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| SessionError::CommandChannelClosed)?;
        reply_rx.await.map_err(SessionError::ReplyChannelClosed)
    }

    /// Subscribe to session events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }
}
