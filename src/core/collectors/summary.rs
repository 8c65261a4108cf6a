use super::{
    error::CollectorError,
    traits::{MetricRule, RequireField},
    types::{CollectorResult, MetricSet},
};
use crate::core::api::DeviceRecord;

const COMMAND: &str = "summary";

/// Rig-wide totals from the single `summary` row.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub mhs_5s: f64,
    pub rejected_percent: f64,
}

impl SummaryRecord {
    pub fn from_record(record: &DeviceRecord) -> CollectorResult<Self> {
        Ok(SummaryRecord {
            mhs_5s: record.require_f64("MHS 5s", COMMAND)?,
            rejected_percent: record.require_f64("Device Rejected%", COMMAND)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRule;

#[async_trait::async_trait]
impl MetricRule for SummaryRule {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn command(&self) -> &'static str {
        COMMAND
    }

    fn extract(&self, records: &[DeviceRecord]) -> CollectorResult<MetricSet> {
        let record = records.first().ok_or_else(|| CollectorError::MissingRecord {
            command: COMMAND.to_string(),
        })?;
        let summary = SummaryRecord::from_record(record)?;

        let mut metrics = MetricSet::new();
        metrics.insert("Component/MHS", summary.mhs_5s);
        metrics.insert("Component/RejectedPercentage", summary.rejected_percent);
        Ok(metrics)
    }
}
