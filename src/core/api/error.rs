use thiserror::Error;

/// Errors raised while talking to the miner API daemon.
///
/// `Unavailable` is the transient class: the daemon could not be reached or
/// went away before answering. `Protocol` and `Rejected` mean an answer was
/// received but cannot be used. The orchestrator folds all three into the same
/// cycle-fatal path; the distinction exists for logging.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, reset, timed out, or closed before any byte arrived.
    #[error("Daemon at {addr} is unavailable: {reason}")]
    Unavailable { addr: String, reason: String },

    /// The response violates the wire grammar (bad escape, truncated payload,
    /// missing STATUS section, or a typed field that does not parse).
    #[error("Malformed response to '{command}': {reason}")]
    Protocol { command: String, reason: String },

    /// The daemon answered with an `E` or `F` status section.
    #[error("Daemon rejected '{command}' (code {code}): {message}")]
    Rejected {
        command: String,
        code: i64,
        message: String,
    },
}

impl ApiError {
    pub(crate) fn unavailable(addr: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::Unavailable {
            addr: addr.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn protocol(command: impl Into<String>, reason: impl Into<String>) -> Self {
        ApiError::Protocol {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// True for the connection-level failures the retry loops wait out.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::Unavailable { .. })
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
