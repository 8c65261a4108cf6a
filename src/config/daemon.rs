//! Miner API daemon connection settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where the cgminer/sgminer API listens.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    /// Host name or IP address of the API socket.
    #[validate(length(min = 1, message = "Daemon host must not be empty"))]
    pub host: String,

    /// API port (cgminer listens on 4028 by default).
    #[validate(range(min = 1, message = "Daemon port must be between 1 and 65535"))]
    pub port: u16,

    /// Upper bound in seconds for each of connect, write and read.
    #[validate(range(min = 1, message = "Daemon timeout must be at least 1 second"))]
    pub timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4028,
            timeout_secs: 5,
        }
    }
}
