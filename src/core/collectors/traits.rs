use tracing::debug;

use super::{
    error::CollectorError,
    types::{CollectorResult, MetricSet},
};
use crate::core::api::{DaemonApi, DeviceRecord};

/// One step of the poll plan: a daemon command plus the rule that flattens its
/// rows into metrics.
///
/// `extract` is pure so rules can be tested on fixture records; `produce` adds
/// the round trip to the daemon.
#[async_trait::async_trait]
pub trait MetricRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The API command whose rows this rule consumes.
    fn command(&self) -> &'static str;

    /// Flattens decoded rows into this rule's slice of the metric namespace.
    fn extract(&self, records: &[DeviceRecord]) -> CollectorResult<MetricSet>;

    /// Queries the daemon and extracts the rows.
    async fn produce(&self, api: &dyn DaemonApi) -> CollectorResult<MetricSet> {
        let records = api.send(self.command(), None).await?;
        let metrics = self.extract(&records)?;
        debug!(
            "Rule '{}' produced {} metric(s) from {} record(s)",
            self.name(),
            metrics.len(),
            records.len()
        );
        Ok(metrics)
    }
}

/// Typed field access that reports which field of which command was at fault.
pub(crate) trait RequireField {
    fn require_f64(&self, field: &str, location: &str) -> CollectorResult<f64>;
    fn require_i64(&self, field: &str, location: &str) -> CollectorResult<i64>;
}

impl RequireField for DeviceRecord {
    fn require_f64(&self, field: &str, location: &str) -> CollectorResult<f64> {
        match self.get(field) {
            None => Err(CollectorError::MissingField {
                field: field.to_string(),
                location: location.to_string(),
            }),
            Some(value) => value.as_f64().ok_or_else(|| {
                CollectorError::InvalidFormat {
                    location: location.to_string(),
                    reason: format!("'{}' is not numeric: '{}'", field, value),
                }
            }),
        }
    }

    fn require_i64(&self, field: &str, location: &str) -> CollectorResult<i64> {
        match self.get(field) {
            None => Err(CollectorError::MissingField {
                field: field.to_string(),
                location: location.to_string(),
            }),
            Some(value) => value.as_i64().ok_or_else(|| {
                CollectorError::InvalidFormat {
                    location: location.to_string(),
                    reason: format!("'{}' is not an integer: '{}'", field, value),
                }
            }),
        }
    }
}
