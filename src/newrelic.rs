//! New Relic Platform API reporter.
//!
//! Each cycle's metrics are posted as one plugin component:
//!
//! ```json
//! {
//!   "agent": { "host": "rig-07", "pid": 1234, "version": "0.1.0" },
//!   "components": [{
//!     "name": "cgminer",
//!     "guid": "com.github.cgminer.newrelic",
//!     "duration": 1,
//!     "metrics": { "Component/MHS": 26001.0 }
//!   }]
//! }
//! ```

use std::{sync::Mutex, time::Duration};

use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::{
    config::reporter::ReporterConfig,
    core::{collectors::MetricSet, executor::Reporter},
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Reporter setup failed: {0}")]
    Setup(String),

    #[error("Failed to reach New Relic: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("New Relic answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    agent: Agent<'a>,
    components: [Component<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Agent<'a> {
    host: &'a str,
    pid: u32,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct Component<'a> {
    name: &'a str,
    guid: &'a str,
    /// Seconds covered by this batch.
    duration: u64,
    metrics: &'a MetricSet,
}

pub struct NewRelicReporter {
    client: reqwest::Client,
    endpoint: String,
    license_key: String,
    component_name: String,
    guid: String,
    host: String,
    last_report: Mutex<Instant>,
}

impl NewRelicReporter {
    /// # Errors
    ///
    /// Fails with `ReportError::Setup` when the license key is empty or the
    /// HTTP client cannot be built.
    pub fn new(config: &ReporterConfig) -> Result<Self, ReportError> {
        if config.license_key.trim().is_empty() {
            return Err(ReportError::Setup(
                "a New Relic license key is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("minebee/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReportError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            license_key: config.license_key.clone(),
            component_name: config.component_name.clone(),
            guid: config.guid.clone(),
            host: config.resolved_host(),
            last_report: Mutex::new(Instant::now()),
        })
    }

    fn payload<'a>(&'a self, metrics: &'a MetricSet, duration: u64) -> Payload<'a> {
        Payload {
            agent: Agent {
                host: &self.host,
                pid: std::process::id(),
                version: env!("CARGO_PKG_VERSION"),
            },
            components: [Component {
                name: &self.component_name,
                guid: &self.guid,
                duration,
                metrics,
            }],
        }
    }

    /// Whole seconds since the last accepted batch (or since creation), at least 1.
    fn elapsed_secs(&self) -> u64 {
        let last = match self.last_report.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        last.elapsed().as_secs().max(1)
    }

    fn mark_reported(&self) {
        match self.last_report.lock() {
            Ok(mut guard) => *guard = Instant::now(),
            Err(poisoned) => *poisoned.into_inner() = Instant::now(),
        }
    }

    /// Posts one batch.
    pub async fn send(&self, metrics: &MetricSet) -> Result<(), ReportError> {
        let payload = self.payload(metrics, self.elapsed_secs());
        trace!("New Relic payload: {:?}", payload);

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-License-Key", &self.license_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        self.mark_reported();
        debug!("Sent {} metric(s) to New Relic", metrics.len());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Reporter for NewRelicReporter {
    async fn report(
        &self,
        metrics: &MetricSet,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.send(metrics).await.map_err(|e| Box::new(e) as _)
    }
}
