use std::{
    path::PathBuf,
    process,
    sync::{Arc, OnceLock},
};

use clap::Parser;
use minebee::{
    config::{CliOverrides, Config},
    core::{
        api::TcpDaemonClient,
        executor::{Executor, Reporter},
        link::LinkMonitor,
    },
    logger::LoggerManager,
    newrelic::NewRelicReporter,
    print_error,
};
use tracing::{debug, error, info};

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "minebee",
    version,
    about = "Relays cgminer/sgminer rig telemetry to New Relic"
)]
struct Cli {
    /// New Relic license key
    license_key: Option<String>,

    /// Address of the cgminer API
    #[arg(long = "cgminer-ip")]
    cgminer_ip: Option<String>,

    /// Port of the cgminer API
    #[arg(long = "cgminer-port")]
    cgminer_port: Option<u16>,

    /// New Relic metrics endpoint
    #[arg(long = "newrelic-url")]
    newrelic_url: Option<String>,

    /// Configuration file (overrides MINEBEE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            license_key: self.license_key.clone(),
            daemon_host: self.cgminer_ip.clone(),
            daemon_port: self.cgminer_port,
            endpoint: self.newrelic_url.clone(),
            verbose: self.verbose,
        }
    }
}

fn config(cli: &Cli) -> &'static Config {
    CONFIG.get_or_init(|| {
        Config::new(cli.config.as_deref(), cli.overrides()).unwrap_or_else(|e| {
            print_error!("{}", e);
            process::exit(1);
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config(&cli);

    let logger_manager = LoggerManager::new(cfg.logger.clone()).unwrap_or_else(|e| {
        print_error!("Failed to setup Log Manager: {}", e);
        process::exit(1);
    });
    logger_manager.init().unwrap_or_else(|e| {
        print_error!("Failed to init Log Manager: {}", e);
        process::exit(1);
    });
    info!("Starting minebee version {}...", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", cfg.logger.level);
    debug!("{:#?}", cfg.daemon);
    debug!("{:#?}", cfg.poll);

    let reporter = NewRelicReporter::new(&cfg.reporter).unwrap_or_else(|e| {
        error!("Failed to create New Relic reporter: {}", e);
        process::exit(1);
    });
    info!(
        "Reporting as component '{}' to {}",
        cfg.reporter.component_name, cfg.reporter.endpoint
    );

    let client = TcpDaemonClient::from_config(&cfg.daemon);
    info!("Polling cgminer API at {}", client.addr());

    let executor = Executor::new(
        Arc::new(client),
        Arc::new(reporter) as Arc<dyn Reporter>,
        cfg.poll.clone(),
        LinkMonitor::new(),
    );

    tokio::select! {
        _ = executor.run() => {
            error!("Executor unexpectedly finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }
    Ok(())
}
