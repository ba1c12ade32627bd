//! Session state machine for the mint client.
//!
//! This crate wires the wallet gateway, network guard, and contract client
//! into a single state machine owning `{account, is_minting, minted_count}`.
//! Consumers embed [`Session`] and interact through [`SessionHandle`]:
//! trigger `connect()` / `mint()`, observe state via `snapshot()`, and react
//! to [`SessionEvent`]s.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the orchestrator and builder
//! - [`handle`] exposes the client-facing façade
//! - [`state`] holds the state machine data and its invariants
//! - [`events`] defines the outbound event surface
//! - `worker` keeps the background task internal to the crate
//!
//! # State machine
//!
//! ```text
//! Disconnected --connect--> Connecting --authorized--> Connected{minting: false}
//!       ^                       │                        │          ^
//!       │                       └──rejected/failed───────┤ mint     │ mint event
//!       └────── zero accounts / disconnect ──────────────┴──> Connected{minting: true}
//! ```
//!
//! The worker is the sole owner of all mutable state; mint events reach it
//! over a channel, so count increments stay commutative and flag clears
//! idempotent regardless of delivery order.

pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod session;
pub mod state;

mod worker;

pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use session::{Session, SessionBuilder};
pub use state::{SessionPhase, SessionSnapshot};
