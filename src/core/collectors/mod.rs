/// Coin collector module.
/// Network difficulty per coin, numbered by position.
pub mod coin;

/// ASC device collector module.
/// Per-device temperature, hash rate, rejection rate and hardware errors,
/// plus the rig-wide maximum temperature.
pub mod devs;

/// Error types shared by all collectors.
pub mod error;

/// Poll plan module.
/// Runs the rules in a fixed order and merges their output.
pub mod plan;

/// Board statistics collector module.
/// Per-chip sensor readings from firmware exposing the extended sensor block.
pub mod stats;

/// Summary collector module.
/// Rig-wide hash rate and rejection rate.
pub mod summary;

/// The `MetricRule` trait implemented by every collector.
pub mod traits;

/// Result alias and the `MetricSet` accumulator.
pub mod types;

pub use error::CollectorError;
pub use plan::QueryPlan;
pub use traits::MetricRule;
pub use types::{CollectorResult, MetricSet};
