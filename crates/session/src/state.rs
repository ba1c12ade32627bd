//! Session state: the single owner of `{account, is_minting, minted_count}`.
//!
//! Only the worker mutates this; everything else observes it through
//! [`SessionSnapshot`].

use mint_chain_core::{Account, ChainId};

use crate::error::SessionError;

/// Coarse lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Connected,
}

/// Read-only view of the session state for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub account: Option<Account>,
    pub is_minting: bool,
    pub minted_count: u64,
    /// Chain the provider is actually on, when it differs from the expected
    /// one. Informational; operations proceed regardless.
    pub chain_warning: Option<ChainId>,
    pub max_supply: Option<u64>,
}

impl SessionSnapshot {
    /// Abbreviated account form (`0x1234...abcd`) for display.
    pub fn display_account(&self) -> Option<String> {
        self.account.as_ref().map(Account::short)
    }
}

/// Mutable session state, owned exclusively by the worker.
pub(crate) struct SessionState {
    phase: SessionPhase,
    account: Option<Account>,
    is_minting: bool,
    minted_count: u64,
    chain_warning: Option<ChainId>,
    max_supply: Option<u64>,
}

impl SessionState {
    pub(crate) fn new(max_supply: Option<u64>) -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            account: None,
            is_minting: false,
            minted_count: 0,
            chain_warning: None,
            max_supply,
        }
    }

    pub(crate) fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub(crate) fn begin_connect(&mut self) {
        self.phase = SessionPhase::Connecting;
    }

    /// Enter the connected state with a freshly seeded counter.
    ///
    /// The counter is re-synchronized from the contract here; between
    /// connects it only ever moves forward via [`Self::record_mint_event`].
    pub(crate) fn connect(&mut self, account: Account, seeded_count: u64) {
        self.phase = SessionPhase::Connected;
        self.account = Some(account);
        self.is_minting = false;
        self.minted_count = seeded_count;
    }

    pub(crate) fn disconnect(&mut self) {
        self.phase = SessionPhase::Disconnected;
        self.account = None;
        self.is_minting = false;
        self.chain_warning = None;
    }

    pub(crate) fn set_chain_warning(&mut self, warning: Option<ChainId>) {
        self.chain_warning = warning;
    }

    /// Guard and record a mint submission.
    ///
    /// Rejects locally (before any contract contact) when disconnected or
    /// when a mint is already in flight. On success the in-flight flag is
    /// set at submission time, not at confirmation time.
    pub(crate) fn begin_mint(&mut self) -> Result<Account, SessionError> {
        let account = self.account.clone().ok_or(SessionError::NotConnected)?;
        if self.is_minting {
            return Err(SessionError::MintInFlight);
        }
        self.is_minting = true;
        Ok(account)
    }

    /// Clear the in-flight flag. Idempotent: clearing an already-clear flag
    /// is a no-op.
    pub(crate) fn clear_minting(&mut self) {
        self.is_minting = false;
    }

    /// Apply one mint event: increment the tally by exactly one and clear
    /// the in-flight flag unconditionally. Returns the new count.
    pub(crate) fn record_mint_event(&mut self) -> u64 {
        self.minted_count += 1;
        self.is_minting = false;
        self.minted_count
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            account: self.account.clone(),
            is_minting: self.is_minting,
            minted_count: self.minted_count,
            chain_warning: self.chain_warning,
            max_supply: self.max_supply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("0x1234567890123456789012345678901234567890")
    }

    #[test]
    fn mint_requires_a_connected_account() {
        let mut state = SessionState::new(None);
        assert!(matches!(
            state.begin_mint(),
            Err(SessionError::NotConnected)
        ));
    }

    #[test]
    fn second_mint_is_rejected_while_in_flight() {
        let mut state = SessionState::new(None);
        state.connect(account(), 0);

        state.begin_mint().unwrap();
        assert!(matches!(state.begin_mint(), Err(SessionError::MintInFlight)));

        state.clear_minting();
        state.begin_mint().unwrap();
    }

    #[test]
    fn events_increment_by_exactly_one_and_clear_the_flag() {
        let mut state = SessionState::new(None);
        state.connect(account(), 5);
        state.begin_mint().unwrap();

        assert_eq!(state.record_mint_event(), 6);
        assert!(!state.snapshot().is_minting);

        // A foreign event with no local mint pending still counts; the
        // already-clear flag stays clear.
        assert_eq!(state.record_mint_event(), 7);
        assert!(!state.snapshot().is_minting);
    }

    #[test]
    fn clear_minting_is_idempotent() {
        let mut state = SessionState::new(None);
        state.connect(account(), 0);
        state.clear_minting();
        state.clear_minting();
        assert!(!state.snapshot().is_minting);
    }

    #[test]
    fn disconnect_resets_account_and_warning() {
        let mut state = SessionState::new(Some(50));
        state.connect(account(), 3);
        state.set_chain_warning(Some(ChainId(1)));

        state.disconnect();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Disconnected);
        assert_eq!(snapshot.account, None);
        assert_eq!(snapshot.chain_warning, None);
        // Supply metadata survives; it is configuration, not session state.
        assert_eq!(snapshot.max_supply, Some(50));
    }

    #[test]
    fn connect_reseeds_the_counter() {
        let mut state = SessionState::new(None);
        state.connect(account(), 3);
        state.record_mint_event();
        assert_eq!(state.snapshot().minted_count, 4);

        state.disconnect();
        state.connect(account(), 10);
        assert_eq!(state.snapshot().minted_count, 10);
    }
}
