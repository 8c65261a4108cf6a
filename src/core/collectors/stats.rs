//! Board and per-chip sensor metrics from the `stats` command.
//!
//! `stats` mixes rows from very different sources: controller boards, pools,
//! and firmware that only exposes counters. Rows are classified into
//! [`BoardRecord`] variants and only boards carrying the extended sensor block
//! with a plausible die temperature produce metrics. Everything else is skipped
//! silently.

use std::ops::RangeInclusive;

use tracing::trace;

use super::{
    traits::{MetricRule, RequireField},
    types::{CollectorResult, MetricSet},
};
use crate::core::api::DeviceRecord;

const COMMAND: &str = "stats";

/// Present only on firmware that publishes per-chip sensors.
pub const EXTENDED_SENSOR_MARKER: &str = "sequence modulus";

/// The die temperature used to decide whether the sensor block is live.
pub const DIE_SAMPLE_FIELD: &str = "Asic2 die temperature";

/// Readings outside this window come from a sensor that is not reporting.
pub const PLAUSIBLE_DIE_RANGE: RangeInclusive<f64> = 50.0..=150.0;

/// Number of chip slots read from every extended board.
pub const CHIP_SLOTS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ChipReading {
    pub board_temperature: f64,
    pub die_temperature: f64,
    pub hash_clockrate: i64,
    pub voltage: f64,
}

impl ChipReading {
    fn from_record(record: &DeviceRecord, slot: usize) -> CollectorResult<Self> {
        Ok(ChipReading {
            board_temperature: record
                .require_f64(&format!("Asic{} board temperature", slot), COMMAND)?,
            die_temperature: record.require_f64(&format!("Asic{} die temperature", slot), COMMAND)?,
            hash_clockrate: record.require_i64(&format!("Asic{} hash clockrate", slot), COMMAND)?,
            voltage: record.require_f64(&format!("Asic{} voltage 0", slot), COMMAND)?,
        })
    }
}

/// A board whose extended sensor block is present and live.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedBoard {
    pub stats: i64,
    /// Exactly [`CHIP_SLOTS`] readings, slot 0 first.
    pub chips: Vec<ChipReading>,
    pub base_clockrate: i64,
    pub fan_percent: i64,
}

/// One `stats` row, classified by schema variant.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardRecord {
    Extended(ExtendedBoard),
    /// Sensor block present but the sampled die reading is implausible.
    OutOfRange {
        stats: Option<i64>,
        die_temperature: f64,
    },
    /// No sensor block (pool rows, other drivers, older firmware).
    Basic { stats: Option<i64> },
}

impl BoardRecord {
    pub fn classify(record: &DeviceRecord) -> CollectorResult<Self> {
        let stats = record.int("STATS");
        if !record.contains(EXTENDED_SENSOR_MARKER) {
            return Ok(BoardRecord::Basic { stats });
        }

        let die_temperature = record.float(DIE_SAMPLE_FIELD).unwrap_or(0.0);
        if !PLAUSIBLE_DIE_RANGE.contains(&die_temperature) {
            return Ok(BoardRecord::OutOfRange {
                stats,
                die_temperature,
            });
        }

        let chips = (0..CHIP_SLOTS)
            .map(|slot| ChipReading::from_record(record, slot))
            .collect::<CollectorResult<Vec<_>>>()?;

        Ok(BoardRecord::Extended(ExtendedBoard {
            stats: record.require_i64("STATS", COMMAND)?,
            chips,
            base_clockrate: record.require_i64("base clockrate", COMMAND)?,
            fan_percent: record.require_i64("fan percent", COMMAND)?,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsRule;

#[async_trait::async_trait]
impl MetricRule for StatsRule {
    fn name(&self) -> &'static str {
        "boards"
    }

    fn command(&self) -> &'static str {
        COMMAND
    }

    fn extract(&self, records: &[DeviceRecord]) -> CollectorResult<MetricSet> {
        let mut metrics = MetricSet::new();

        for record in records {
            let board = match BoardRecord::classify(record)? {
                BoardRecord::Extended(board) => board,
                skipped => {
                    trace!("Skipping stats row: {:?}", skipped);
                    continue;
                }
            };

            // Chip slots are not qualified by board: with several extended boards
            // the last one listed wins.
            for (slot, chip) in board.chips.iter().enumerate() {
                metrics.insert(
                    format!("Component/BoardTemperature/ASIC#{}", slot),
                    chip.board_temperature,
                );
                metrics.insert(
                    format!("Component/DieTemperature/ASIC#{}", slot),
                    chip.die_temperature,
                );
                metrics.insert(
                    format!("Component/HashClockrate/ASIC#{}", slot),
                    chip.hash_clockrate as f64,
                );
                metrics.insert(format!("Component/Voltage/ASIC#{}", slot), chip.voltage);
            }
            metrics.insert(
                format!("Component/BaseClockrate/STATS#{}", board.stats),
                board.base_clockrate as f64,
            );
            metrics.insert(
                format!("Component/FanPercent/STATS#{}", board.stats),
                board.fan_percent as f64,
            );
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        api::{
            testing::{extended_board, pool_stats, text},
            Value,
        },
        collectors::error::CollectorError,
    };

    #[test]
    fn test_extended_board_emits_chip_and_board_metrics() {
        let metrics = StatsRule.extract(&[extended_board(0, 90.0)]).unwrap();

        assert_eq!(metrics.len(), CHIP_SLOTS * 4 + 2);
        assert_eq!(metrics.get("Component/BoardTemperature/ASIC#1"), Some(61.0));
        assert_eq!(metrics.get("Component/DieTemperature/ASIC#2"), Some(90.0));
        assert_eq!(metrics.get("Component/DieTemperature/ASIC#3"), Some(83.0));
        assert_eq!(metrics.get("Component/HashClockrate/ASIC#3"), Some(603.0));
        assert_eq!(metrics.get("Component/Voltage/ASIC#0"), Some(0.75));
        assert_eq!(metrics.get("Component/BaseClockrate/STATS#0"), Some(650.0));
        assert_eq!(metrics.get("Component/FanPercent/STATS#0"), Some(70.0));
    }

    #[test]
    fn test_die_range_is_inclusive() {
        for reading in [50.0, 150.0] {
            let metrics = StatsRule.extract(&[extended_board(0, reading)]).unwrap();
            assert_eq!(metrics.len(), CHIP_SLOTS * 4 + 2, "reading {reading}");
        }
        for reading in [49.0, 151.0, 49.99] {
            let metrics = StatsRule.extract(&[extended_board(0, reading)]).unwrap();
            assert!(metrics.is_empty(), "reading {reading}");
        }
    }

    #[test]
    fn test_missing_marker_emits_nothing_even_with_plausible_sensors() {
        let mut record = DeviceRecord::new();
        for (key, value) in extended_board(0, 90.0).iter() {
            if key != EXTENDED_SENSOR_MARKER {
                record.insert(key, value.clone());
            }
        }

        assert_eq!(
            BoardRecord::classify(&record).unwrap(),
            BoardRecord::Basic { stats: Some(0) }
        );
        assert!(StatsRule.extract(&[record]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_die_reading_defaults_to_zero_and_is_skipped() {
        let record = DeviceRecord::new()
            .with("STATS", Value::Int(4))
            .with(EXTENDED_SENSOR_MARKER, Value::Int(4));

        assert_eq!(
            BoardRecord::classify(&record).unwrap(),
            BoardRecord::OutOfRange {
                stats: Some(4),
                die_temperature: 0.0
            }
        );
    }

    #[test]
    fn test_pool_rows_are_skipped() {
        let metrics = StatsRule
            .extract(&[pool_stats(1), extended_board(0, 75.0), pool_stats(2)])
            .unwrap();
        assert_eq!(metrics.len(), CHIP_SLOTS * 4 + 2);
    }

    #[test]
    fn test_later_board_overwrites_chip_slots() {
        let first = extended_board(0, 70.0);
        let second = extended_board(1, 120.0);

        let metrics = StatsRule.extract(&[first, second]).unwrap();

        assert_eq!(metrics.get("Component/DieTemperature/ASIC#2"), Some(120.0));
        assert!(metrics.contains("Component/FanPercent/STATS#0"));
        assert!(metrics.contains("Component/FanPercent/STATS#1"));
        assert_eq!(metrics.len(), CHIP_SLOTS * 4 + 4);
    }

    #[test]
    fn test_live_board_missing_chip_field_is_an_error() {
        let mut record = DeviceRecord::new();
        for (key, value) in extended_board(0, 90.0).iter() {
            if key != "Asic3 voltage 0" {
                record.insert(key, value.clone());
            }
        }

        let err = StatsRule.extract(&[record]).unwrap_err();
        assert!(
            matches!(err, CollectorError::MissingField { ref field, .. } if field == "Asic3 voltage 0")
        );
    }

    #[test]
    fn test_non_numeric_die_reading_counts_as_zero() {
        let record = extended_board(0, 90.0).with(DIE_SAMPLE_FIELD, text(""));
        assert!(matches!(
            BoardRecord::classify(&record).unwrap(),
            BoardRecord::OutOfRange { .. }
        ));
    }
}
