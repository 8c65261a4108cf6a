use super::{
    traits::{MetricRule, RequireField},
    types::{CollectorResult, MetricSet},
};
use crate::core::api::DeviceRecord;

const COMMAND: &str = "coin";

#[derive(Debug, Clone, PartialEq)]
pub struct CoinRecord {
    pub network_difficulty: f64,
}

impl CoinRecord {
    pub fn from_record(record: &DeviceRecord) -> CollectorResult<Self> {
        Ok(CoinRecord {
            network_difficulty: record.require_f64("Network Difficulty", COMMAND)?,
        })
    }
}

/// Network difficulty per coin the rig is mining against.
///
/// Coins are numbered by their position in the answer, starting at 1; no field
/// of the row takes part in the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinRule;

#[async_trait::async_trait]
impl MetricRule for CoinRule {
    fn name(&self) -> &'static str {
        "coins"
    }

    fn command(&self) -> &'static str {
        COMMAND
    }

    fn extract(&self, records: &[DeviceRecord]) -> CollectorResult<MetricSet> {
        let mut metrics = MetricSet::new();
        for (position, record) in records.iter().enumerate() {
            let coin = CoinRecord::from_record(record)?;
            metrics.insert(
                format!("Component/NetworkDifficulty/Coin#{}", position + 1),
                coin.network_difficulty,
            );
        }
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::{
        testing::{coin, text},
        Value,
    };

    #[test]
    fn test_empty_coin_list_emits_nothing() {
        assert!(CoinRule.extract(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_coins_are_numbered_from_one_in_list_order() {
        let records = vec![coin(300.0), coin(100.0), coin(200.0)];

        let metrics = CoinRule.extract(&records).unwrap();

        let collected: Vec<_> = metrics.iter().collect();
        assert_eq!(
            collected,
            vec![
                ("Component/NetworkDifficulty/Coin#1", 300.0),
                ("Component/NetworkDifficulty/Coin#2", 100.0),
                ("Component/NetworkDifficulty/Coin#3", 200.0),
            ]
        );
    }

    #[test]
    fn test_coin_index_ignores_record_fields() {
        let record = coin(5.0).with("COIN", Value::Int(7)).with("Name", text("btc"));
        let metrics = CoinRule.extract(&[record]).unwrap();
        assert_eq!(metrics.get("Component/NetworkDifficulty/Coin#1"), Some(5.0));
    }
}
