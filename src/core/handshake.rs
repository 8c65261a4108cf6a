//! Startup identification of the miner daemon.
//!
//! Before polling starts the relay asks the daemon who it is (`version`) and
//! which devices it drives (`devdetails`), logging both. The answers are for
//! operators only; nothing here feeds the metric namespace.

use tracing::{debug, info};

use super::api::{ApiError, ApiResult, DaemonApi, DeviceRecord};

/// Which daemon fork answered the `version` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerFlavor {
    CgMiner,
    SgMiner,
    Unknown,
}

impl MinerFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            MinerFlavor::CgMiner => "cgminer",
            MinerFlavor::SgMiner => "sgminer",
            MinerFlavor::Unknown => "unknown miner",
        }
    }
}

/// One `devdetails` row, as shown in the startup log.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSummary {
    pub name: String,
    pub id: String,
    pub driver: String,
}

impl DeviceSummary {
    fn from_record(record: &DeviceRecord) -> Self {
        let field = |key: &str| {
            record
                .get(key)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string())
        };
        DeviceSummary {
            name: field("Name"),
            id: field("ID"),
            driver: field("Driver"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonIdentity {
    pub flavor: MinerFlavor,
    pub version: Option<String>,
    pub devices: Vec<DeviceSummary>,
}

fn detect_flavor(record: &DeviceRecord) -> (MinerFlavor, Option<String>) {
    for (key, flavor) in [("CGMiner", MinerFlavor::CgMiner), ("SGMiner", MinerFlavor::SgMiner)] {
        if let Some(version) = record.get(key) {
            return (flavor, Some(version.to_string()));
        }
    }
    (MinerFlavor::Unknown, None)
}

/// Runs the `version` + `devdetails` handshake and logs what the daemon reports.
pub async fn identify(api: &dyn DaemonApi) -> ApiResult<DaemonIdentity> {
    let versions = api.send("version", None).await?;
    let version_record = versions
        .first()
        .ok_or_else(|| ApiError::protocol("version", "no VERSION record"))?;

    let (flavor, version) = detect_flavor(version_record);
    match &version {
        Some(v) => info!("{} v {}", flavor.as_str(), v),
        None => debug!("Unrecognised version record: {:?}", version_record),
    }

    let devices: Vec<DeviceSummary> = api
        .send("devdetails", None)
        .await?
        .iter()
        .map(DeviceSummary::from_record)
        .collect();
    for device in &devices {
        info!("{}#{}: {}", device.name, device.id, device.driver);
    }

    Ok(DaemonIdentity {
        flavor,
        version,
        devices,
    })
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::core::api::testing::{healthy_daemon, text, ScriptedDaemon};

    #[tokio::test]
    #[traced_test]
    async fn test_identify_cgminer() {
        let daemon = healthy_daemon();

        let identity = identify(&daemon).await.unwrap();

        assert_eq!(identity.flavor, MinerFlavor::CgMiner);
        assert_eq!(identity.version.as_deref(), Some("4.9.2"));
        assert_eq!(
            identity.devices,
            vec![DeviceSummary {
                name: "BAJ".into(),
                id: "0".into(),
                driver: "BitmainAsic".into(),
            }]
        );
        assert_eq!(daemon.commands(), vec!["version", "devdetails"]);
        assert!(logs_contain("cgminer v 4.9.2"));
        assert!(logs_contain("BAJ#0: BitmainAsic"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_identify_sgminer() {
        let daemon = ScriptedDaemon::new()
            .answer(
                "version",
                vec![DeviceRecord::new().with("SGMiner", text("5.1.0"))],
            )
            .answer("devdetails", vec![]);

        let identity = identify(&daemon).await.unwrap();

        assert_eq!(identity.flavor, MinerFlavor::SgMiner);
        assert!(identity.devices.is_empty());
        assert!(logs_contain("sgminer v 5.1.0"));
    }

    #[tokio::test]
    async fn test_identify_unknown_flavor_still_succeeds() {
        let daemon = ScriptedDaemon::new()
            .answer("version", vec![DeviceRecord::new().with("BMMiner", text("2.0"))])
            .answer("devdetails", vec![DeviceRecord::new().with("Name", text("X"))]);

        let identity = identify(&daemon).await.unwrap();

        assert_eq!(identity.flavor, MinerFlavor::Unknown);
        assert_eq!(identity.version, None);
        assert_eq!(identity.devices[0].driver, "?");
    }

    #[tokio::test]
    async fn test_identify_propagates_unavailable() {
        let daemon = healthy_daemon().fail_times("version", 1);
        let err = identify(&daemon).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_identify_without_version_record_is_protocol_error() {
        let daemon = ScriptedDaemon::new().answer("version", vec![]);
        let err = identify(&daemon).await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol { .. }));
    }
}
