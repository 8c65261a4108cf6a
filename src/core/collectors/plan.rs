//! The fixed sequence of queries run once per poll cycle.

use tracing::{debug, warn};

use super::{
    coin::CoinRule,
    devs::DevsRule,
    stats::StatsRule,
    summary::SummaryRule,
    traits::MetricRule,
    types::{CollectorResult, MetricSet},
};
use crate::core::api::DaemonApi;

/// Ordered list of rules. Queries run strictly one after another; the daemon
/// expects a single request in flight.
pub struct QueryPlan {
    rules: Vec<Box<dyn MetricRule>>,
}

impl QueryPlan {
    pub fn new(rules: Vec<Box<dyn MetricRule>>) -> Self {
        Self { rules }
    }

    /// devs, stats, summary, coin.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(DevsRule),
            Box::new(StatsRule),
            Box::new(SummaryRule),
            Box::new(CoinRule),
        ])
    }

    pub fn commands(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.command()).collect()
    }

    /// Runs every rule and merges the results into one metric set.
    ///
    /// The first failing query aborts the cycle and whatever was gathered so
    /// far is dropped: a cycle reports everything or nothing.
    pub async fn collect(&self, api: &dyn DaemonApi) -> CollectorResult<MetricSet> {
        let mut metrics = MetricSet::new();
        for rule in &self.rules {
            let produced = rule.produce(api).await?;
            for name in metrics.merge(produced) {
                warn!("Rule '{}' overwrote metric '{}'", rule.name(), name);
            }
        }
        debug!("Poll cycle collected {} metric(s)", metrics.len());
        Ok(metrics)
    }
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self::standard()
    }
}
