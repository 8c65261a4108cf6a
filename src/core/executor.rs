//! Poll loop orchestration.
//!
//! The `Executor` identifies the daemon, then runs collect-and-report
//! cycles forever. Failures never end the loop: an unreachable daemon only
//! changes how long the executor waits before trying again.

use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use super::{
    api::DaemonApi,
    collectors::{CollectorError, MetricSet, QueryPlan},
    handshake::{self, DaemonIdentity},
    link::{LinkMonitor, LinkState},
};
use crate::config::poll::PollConfig;

/// Destination for the metrics gathered in one cycle.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    async fn report(
        &self,
        metrics: &MetricSet,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// Nothing was reported; the daemon could not be queried or answered
    /// with something unusable.
    #[error(transparent)]
    Collect(#[from] CollectorError),

    #[error("Reporting failed: {0}")]
    Report(Box<dyn std::error::Error + Send + Sync>),
}

pub struct Executor {
    api: Arc<dyn DaemonApi>,
    reporter: Arc<dyn Reporter>,
    plan: QueryPlan,
    poll: PollConfig,
    link: LinkMonitor,
}

impl Executor {
    /// Creates an executor running the standard query plan.
    pub fn new(
        api: Arc<dyn DaemonApi>,
        reporter: Arc<dyn Reporter>,
        poll: PollConfig,
        link: LinkMonitor,
    ) -> Self {
        Self {
            api,
            reporter,
            plan: QueryPlan::standard(),
            poll,
            link,
        }
    }

    pub fn with_plan(mut self, plan: QueryPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Retries the version/devdetails handshake until it succeeds.
    pub async fn handshake(&self) -> DaemonIdentity {
        self.link.set_state(LinkState::Connecting);
        loop {
            match handshake::identify(self.api.as_ref()).await {
                Ok(identity) => {
                    self.link.set_state(LinkState::Ready);
                    return identity;
                }
                Err(e) => {
                    debug!("Handshake failed: {}", e);
                    warn!(
                        "cgminer is not available. Waiting {} seconds",
                        self.poll.handshake_retry_secs
                    );
                    sleep(self.poll.handshake_retry()).await;
                }
            }
        }
    }

    /// Collects one full metric set and hands it to the reporter.
    ///
    /// Returns the number of metrics reported.
    pub async fn run_cycle(&self) -> Result<usize, CycleError> {
        let metrics = self.plan.collect(self.api.as_ref()).await?;
        self.reporter
            .report(&metrics)
            .await
            .map_err(CycleError::Report)?;
        Ok(metrics.len())
    }

    /// Runs one cycle, updates the link state and returns how long to wait
    /// before the next one.
    async fn poll_once(&self) -> Duration {
        match self.run_cycle().await {
            Ok(count) => {
                debug!("Reported {} metric(s)", count);
                if !self.link.current_state().is_ready() {
                    info!("cgminer is available again, polling resumed");
                }
                self.link.set_state(LinkState::Ready);
                self.poll.cycle_interval()
            }
            Err(CycleError::Collect(e)) => {
                let secs = self.poll.degraded_backoff_secs;
                if e.is_unavailable() {
                    warn!("cgminer is not available. Waiting {} seconds", secs);
                } else {
                    warn!("Poll cycle failed: {}. Waiting {} seconds", e, secs);
                }
                self.link.set_state(LinkState::Degraded(e.to_string()));
                self.poll.degraded_backoff()
            }
            Err(CycleError::Report(e)) => {
                error!("Failed to report metrics: {}", e);
                self.poll.cycle_interval()
            }
        }
    }

    /// Runs the handshake and then the poll loop indefinitely.
    pub async fn run(self) -> ! {
        let identity = self.handshake().await;
        info!(
            "Polling {} ({} device(s)) with queries: {}",
            identity.flavor.as_str(),
            identity.devices.len(),
            self.plan.commands().join(", ")
        );

        loop {
            let wait = self.poll_once().await;
            sleep(wait).await;
        }
    }
}
