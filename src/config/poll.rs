//! Timing of the startup handshake and the poll loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    /// Wait between failed startup handshake attempts, in seconds.
    #[validate(range(min = 1, message = "Handshake retry must be at least 1 second"))]
    pub handshake_retry_secs: u64,

    /// Pause after a successful poll cycle, in seconds.
    #[validate(range(min = 1, message = "Cycle interval must be at least 1 second"))]
    pub cycle_interval_secs: u64,

    /// Pause after a failed poll cycle, in seconds.
    #[validate(range(min = 1, message = "Degraded backoff must be at least 1 second"))]
    pub degraded_backoff_secs: u64,
}

impl PollConfig {
    pub fn handshake_retry(&self) -> Duration {
        Duration::from_secs(self.handshake_retry_secs)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }

    pub fn degraded_backoff(&self) -> Duration {
        Duration::from_secs(self.degraded_backoff_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            handshake_retry_secs: 10,
            cycle_interval_secs: 1,
            degraded_backoff_secs: 15,
        }
    }
}
