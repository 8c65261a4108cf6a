//! Daemon link state tracking.
//!
//! The executor drives a small state machine over the daemon connection:
//!
//! ```text
//! Connecting --handshake ok--> Ready --cycle failed--> Degraded
//!     ^  |                       ^                        |
//!     +--+ handshake failed      +------cycle ok----------+
//! ```
//!
//! The current state is published on a watch channel so other tasks can
//! observe it without touching the poll loop.

use std::fmt;

use tokio::sync::watch;
use tracing::debug;

/// Where the relay stands with respect to the miner daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Startup handshake has not succeeded yet.
    Connecting,
    /// The last poll cycle completed.
    Ready,
    /// The last poll cycle failed, with the reason.
    Degraded(String),
}

impl LinkState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LinkState::Ready)
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkState::Connecting => "Connecting",
            LinkState::Ready => "Ready",
            LinkState::Degraded(_) => "Degraded",
        }
    }

    /// The failure reason for `Degraded`, otherwise an empty string.
    pub fn reason(&self) -> &str {
        match self {
            LinkState::Degraded(reason) => reason,
            _ => "",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Degraded(reason) => write!(f, "Degraded: {}", reason),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Shared, observable holder of the current [`LinkState`].
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    state_tx: watch::Sender<LinkState>,
    state_rx: watch::Receiver<LinkState>,
}

impl LinkMonitor {
    /// Creates a monitor in the `Connecting` state.
    pub fn new() -> Self {
        let (state_tx, state_rx) = watch::channel(LinkState::Connecting);
        Self { state_tx, state_rx }
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    pub fn current_state(&self) -> LinkState {
        self.state_rx.borrow().clone()
    }

    /// Publishes a new state and logs the transition at debug level.
    pub fn set_state(&self, state: LinkState) {
        let old_state = self.state_tx.send_replace(state.clone());
        if old_state != state {
            debug!("Link state changed: {} -> {}", old_state, state);
        }
    }
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
