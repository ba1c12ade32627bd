//! Session worker that owns the authoritative session state.
//!
//! Receives commands from `SessionHandle`, drives the wallet/contract
//! layers, and publishes [`SessionEvent`]s. All state mutations happen here,
//! on one task; mint submissions run on spawned tasks and report back over
//! an internal channel so the loop never blocks on the network.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use mint_chain_core::{
    Account, ChainCheck, ContractError, MintContract, MintEvent, MintSubscription, NetworkGuard,
    TxHash, TxReceipt, WalletError, WalletGateway,
};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::state::{SessionSnapshot, SessionState};

/// Commands that can be sent to the session worker.
pub(crate) enum Command {
    /// Prompt for authorization and establish the session.
    Connect {
        reply: oneshot::Sender<Result<Account>>,
    },
    /// Submit a mint transaction. Replies once submission is accepted or
    /// rejected; confirmation outcomes arrive as events.
    Mint {
        reply: oneshot::Sender<Result<TxHash>>,
    },
    /// Tear down the session and return to the disconnected state.
    Disconnect { reply: oneshot::Sender<()> },
    /// Query the current session state (read-only).
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Outcomes of spawned submission/confirmation tasks, fed back into the
/// worker loop so the state machine stays single-writer.
enum MintProgress {
    Submitted { tx_hash: TxHash },
    SubmissionFailed { error: ContractError },
    Mined { receipt: TxReceipt },
    ConfirmationFailed { error: ContractError },
}

/// Background task that processes session commands and mint events.
pub(crate) struct SessionWorker {
    state: SessionState,
    gateway: WalletGateway,
    network: NetworkGuard,
    contract: Arc<dyn MintContract>,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<SessionEvent>,
    progress_tx: mpsc::Sender<MintProgress>,
    progress_rx: mpsc::Receiver<MintProgress>,
    subscription: Option<MintSubscription>,
    silent_reconnect: bool,
}

impl SessionWorker {
    pub(crate) fn new(
        config: &SessionConfig,
        gateway: WalletGateway,
        contract: Arc<dyn MintContract>,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let (progress_tx, progress_rx) = mpsc::channel(config.command_buffer_size);
        Self {
            state: SessionState::new(config.max_supply),
            gateway,
            network: NetworkGuard::new(config.expected_chain_id),
            contract,
            command_rx,
            event_tx,
            progress_tx,
            progress_rx,
            subscription: None,
            silent_reconnect: config.silent_reconnect,
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        if self.silent_reconnect {
            self.try_resume().await;
        }

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                Some(progress) = self.progress_rx.recv() => {
                    self.handle_mint_progress(progress);
                }
                event = Self::next_mint_event(&mut self.subscription) => match event {
                    Some(event) => self.handle_mint_event(event),
                    None => {
                        warn!("mint event subscription closed by backend");
                        self.subscription = None;
                    }
                },
            }
        }
    }

    async fn next_mint_event(subscription: &mut Option<MintSubscription>) -> Option<MintEvent> {
        match subscription {
            Some(subscription) => subscription.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { reply } => {
                let result = self.handle_connect().await;
                if reply.send(result).is_err() {
                    debug!("connect reply channel closed (caller dropped)");
                }
            }
            Command::Mint { reply } => self.handle_mint(reply),
            Command::Disconnect { reply } => {
                self.handle_disconnect();
                if reply.send(()).is_err() {
                    debug!("disconnect reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.state.snapshot()).is_err() {
                    debug!("snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Startup path: resume a previously authorized session without a
    /// prompt, replaying the same establishment steps as `connect`.
    async fn try_resume(&mut self) {
        let accounts = match self.gateway.authorized_accounts().await {
            Ok(accounts) => accounts,
            Err(WalletError::NoProvider) => {
                debug!("no wallet provider; starting disconnected");
                return;
            }
            Err(e) => {
                warn!(error = %e, "authorization check failed on startup");
                return;
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            debug!("no previously authorized account");
            return;
        };

        info!(account = %account.short(), "resuming previously authorized session");
        if let Err(e) = self.establish(account).await {
            warn!(error = %e, "silent reconnection failed");
        }
    }

    async fn handle_connect(&mut self) -> Result<Account> {
        if let Some(account) = self.state.account() {
            debug!(account = %account.short(), "connect requested while already connected");
            return Ok(account.clone());
        }

        self.state.begin_connect();
        match self.gateway.request_authorization().await {
            Ok(account) => self.establish(account).await,
            Err(e) => {
                self.reset_to_disconnected();
                Err(e.into())
            }
        }
    }

    /// Post-authorization path shared by `connect` and startup resumption:
    /// validate the chain, (re)establish the event subscription, seed the
    /// counter. Any failure leaves the machine fully disconnected; no
    /// partial state or dangling subscription survives.
    async fn establish(&mut self, account: Account) -> Result<Account> {
        // Chain validation completes before the subscription binds.
        match self.network.validate(&self.gateway).await {
            Ok(ChainCheck::Ok) => self.state.set_chain_warning(None),
            Ok(ChainCheck::Mismatch { actual, expected }) => {
                self.state.set_chain_warning(Some(actual));
                self.emit(SessionEvent::ChainMismatch { actual, expected });
            }
            Err(e) => {
                self.reset_to_disconnected();
                return Err(e.into());
            }
        }

        // Retire any previous subscription before rebinding; two live
        // subscriptions would double-count events.
        self.subscription = None;

        let subscription = match self.contract.subscribe_mint_events().await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.reset_to_disconnected();
                return Err(e.into());
            }
        };

        let seeded_count = match self.contract.total_minted(&account).await {
            Ok(count) => count,
            Err(e) => {
                drop(subscription);
                self.reset_to_disconnected();
                return Err(e.into());
            }
        };

        self.subscription = Some(subscription);
        self.state.connect(account.clone(), seeded_count);
        info!(account = %account.short(), minted_count = seeded_count, "session connected");
        self.emit(SessionEvent::Connected {
            account: account.clone(),
        });
        self.emit(SessionEvent::CountSeeded {
            minted_count: seeded_count,
        });
        Ok(account)
    }

    fn handle_mint(&mut self, reply: oneshot::Sender<Result<TxHash>>) {
        // Local guard: no re-entrant submission, and no contract contact
        // when the guard rejects.
        let from = match self.state.begin_mint() {
            Ok(from) => from,
            Err(e) => {
                if reply.send(Err(e)).is_err() {
                    debug!("mint reply channel closed (caller dropped)");
                }
                return;
            }
        };

        let contract = Arc::clone(&self.contract);
        let progress_tx = self.progress_tx.clone();
        tokio::spawn(async move {
            match contract.mint(&from).await {
                Ok(pending) => {
                    let tx_hash = pending.tx_hash().clone();
                    let _ = progress_tx
                        .send(MintProgress::Submitted {
                            tx_hash: tx_hash.clone(),
                        })
                        .await;
                    let _ = reply.send(Ok(tx_hash));

                    match pending.confirmed().await {
                        Ok(receipt) => {
                            let _ = progress_tx.send(MintProgress::Mined { receipt }).await;
                        }
                        Err(error) => {
                            let _ = progress_tx
                                .send(MintProgress::ConfirmationFailed { error })
                                .await;
                        }
                    }
                }
                Err(error) => {
                    let _ = progress_tx
                        .send(MintProgress::SubmissionFailed {
                            error: error.clone(),
                        })
                        .await;
                    let _ = reply.send(Err(error.into()));
                }
            }
        });
    }

    fn handle_mint_progress(&mut self, progress: MintProgress) {
        match progress {
            MintProgress::Submitted { tx_hash } => {
                info!(%tx_hash, "mint transaction submitted");
                self.emit(SessionEvent::MintSubmitted { tx_hash });
            }
            MintProgress::SubmissionFailed { error } => {
                error!(error = %error, "mint submission failed");
                self.state.clear_minting();
                self.emit(SessionEvent::MintFailed { error });
            }
            MintProgress::Mined { receipt } => {
                // The in-flight flag is cleared by the event subscription,
                // not here; mining and event delivery race freely.
                debug!(tx_hash = %receipt.tx_hash, "mint transaction mined");
                self.emit(SessionEvent::MintMined { receipt });
            }
            MintProgress::ConfirmationFailed { error } => {
                error!(error = %error, "mint confirmation failed");
                self.state.clear_minting();
                self.emit(SessionEvent::MintFailed { error });
            }
        }
    }

    fn handle_mint_event(&mut self, event: MintEvent) {
        // Contract-wide tally: every event increments the counter and
        // clears the in-flight flag, whether or not it originated from the
        // local account.
        let minted_count = self.state.record_mint_event();
        debug!(
            from = %event.from.short(),
            token_id = %event.token_id,
            minted_count,
            "mint event received"
        );
        self.emit(SessionEvent::MintObserved {
            event,
            minted_count,
        });
    }

    fn handle_disconnect(&mut self) {
        info!("session disconnected");
        self.reset_to_disconnected();
        self.emit(SessionEvent::Disconnected);
    }

    fn reset_to_disconnected(&mut self) {
        self.subscription = None;
        self.state.disconnect();
    }

    fn emit(&self, event: SessionEvent) {
        // A send error only means nobody is subscribed right now.
        let _ = self.event_tx.send(event);
    }
}
