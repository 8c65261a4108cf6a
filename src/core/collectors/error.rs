use thiserror::Error;

use crate::core::api::ApiError;

/// Errors raised while turning daemon records into metrics.
///
/// Any of these aborts the whole poll cycle: a cycle either reports every
/// metric of the plan or nothing.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The query itself failed (daemon unavailable, malformed or rejected response).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A field the extraction rule depends on is absent from a record.
    #[error("Missing required field: {field} in {location}")]
    MissingField { field: String, location: String },

    /// A field is present but does not hold the expected kind of value.
    #[error("Invalid format in {location}: {reason}")]
    InvalidFormat { location: String, reason: String },

    /// The command returned no rows where at least one is required.
    #[error("'{command}' returned no records")]
    MissingRecord { command: String },
}

impl CollectorError {
    /// True when the cycle failed because the daemon could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CollectorError::Api(e) if e.is_unavailable())
    }
}
