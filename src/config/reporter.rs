//! New Relic Platform API settings.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub const DEFAULT_ENDPOINT: &str = "https://platform-api.newrelic.com/platform/v1/metrics";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ReporterConfig {
    /// Metrics ingestion URL.
    #[validate(custom(function = "validate_endpoint"))]
    pub endpoint: String,

    /// Sent as `X-License-Key`. Usually passed on the command line.
    pub license_key: String,

    /// Component name shown in the New Relic UI.
    #[validate(length(min = 1, message = "Component name must not be empty"))]
    pub component_name: String,

    /// Plugin GUID the metrics are filed under.
    #[validate(length(min = 1, message = "Plugin GUID must not be empty"))]
    pub guid: String,

    /// Host reported in the agent block. Empty means the local host name.
    pub host: String,

    /// HTTP request timeout in seconds.
    #[validate(range(min = 1, message = "Reporter timeout must be at least 1 second"))]
    pub timeout_secs: u64,
}

fn validate_endpoint(endpoint: &str) -> Result<(), ValidationError> {
    match url::Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_endpoint");
            err.message = Some(format!("Invalid ingestion endpoint: {}", endpoint).into());
            Err(err)
        }
    }
}

impl ReporterConfig {
    /// The configured host, falling back to the system host name and then `localhost`.
    pub fn resolved_host(&self) -> String {
        if !self.host.is_empty() {
            return self.host.clone();
        }
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            license_key: String::new(),
            component_name: "cgminer".to_string(),
            guid: "com.github.cgminer.newrelic".to_string(),
            host: String::new(),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_is_valid() {
        assert!(ReporterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_http_endpoint_is_rejected() {
        for endpoint in ["not a url", "ftp://example.com/metrics"] {
            let config = ReporterConfig {
                endpoint: endpoint.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{endpoint}");
        }
    }

    #[test]
    fn test_explicit_host_wins() {
        let config = ReporterConfig {
            host: "rig-07".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolved_host(), "rig-07");
    }

    #[test]
    fn test_empty_host_uses_system_hostname() {
        let config = ReporterConfig::default();
        let expected = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        let host = config.resolved_host();

        assert!(!host.is_empty());
        assert_eq!(host, expected);
    }
}
