//! Per-ASIC device metrics from the `devs` command.
//!
//! Every listed device takes part in the max-temperature scan. Only devices
//! reporting `Enabled=Y` emit their own temperature, hash rate, rejection rate
//! and hardware error count.

use super::{
    traits::{MetricRule, RequireField},
    types::{CollectorResult, MetricSet},
};
use crate::core::api::DeviceRecord;

const COMMAND: &str = "devs";

/// Literal the daemon uses for an enabled device. Anything else counts as disabled.
pub const ENABLED_FLAG: &str = "Y";

pub const MAX_TEMPERATURE: &str = "Component/MaxTemperature";

/// Fields guaranteed for an enabled device.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAsc {
    pub asc: i64,
    pub temperature: f64,
    pub mhs_5s: f64,
    pub rejected_percent: f64,
    pub hardware_errors: i64,
}

/// One `devs` row, split by the enabled flag.
#[derive(Debug, Clone, PartialEq)]
pub enum AscDevice {
    Enabled(ActiveAsc),
    Disabled { asc: i64, temperature: f64 },
}

impl AscDevice {
    pub fn from_record(record: &DeviceRecord) -> CollectorResult<Self> {
        let asc = record.require_i64("ASC", COMMAND)?;
        let temperature = record.require_f64("Temperature", COMMAND)?;

        if record.text("Enabled") != Some(ENABLED_FLAG) {
            return Ok(AscDevice::Disabled { asc, temperature });
        }

        Ok(AscDevice::Enabled(ActiveAsc {
            asc,
            temperature,
            mhs_5s: record.require_f64("MHS 5s", COMMAND)?,
            rejected_percent: record.require_f64("Device Rejected%", COMMAND)?,
            hardware_errors: record.require_i64("Hardware Errors", COMMAND)?,
        }))
    }

    pub fn asc(&self) -> i64 {
        match self {
            AscDevice::Enabled(active) => active.asc,
            AscDevice::Disabled { asc, .. } => *asc,
        }
    }

    pub fn temperature(&self) -> f64 {
        match self {
            AscDevice::Enabled(active) => active.temperature,
            AscDevice::Disabled { temperature, .. } => *temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DevsRule;

#[async_trait::async_trait]
impl MetricRule for DevsRule {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn command(&self) -> &'static str {
        COMMAND
    }

    fn extract(&self, records: &[DeviceRecord]) -> CollectorResult<MetricSet> {
        let mut metrics = MetricSet::new();
        // Starts at zero, so a rig with no devices (or only sub-zero readings) reports 0.
        let mut max_temperature = 0.0_f64;

        for record in records {
            let device = AscDevice::from_record(record)?;
            max_temperature = max_temperature.max(device.temperature());

            if let AscDevice::Enabled(active) = device {
                let id = active.asc;
                metrics.insert(format!("Component/Temperature/ASC#{}", id), active.temperature);
                metrics.insert(format!("Component/MHS/ASC#{}", id), active.mhs_5s);
                metrics.insert(
                    format!("Component/RejectedPercentage/ASC#{}", id),
                    active.rejected_percent,
                );
                metrics.insert(
                    format!("Component/HardwareErrors/ASC#{}", id),
                    active.hardware_errors as f64,
                );
            }
        }

        metrics.insert(MAX_TEMPERATURE, max_temperature);
        Ok(metrics)
    }
}
