//! minebee: relays cgminer/sgminer rig telemetry to New Relic
//!
//! The agent talks to the miner's text API socket, turns the `devs`,
//! `stats`, `summary` and `coin` replies into a flat set of
//! `Component/...` metrics once per cycle and posts them to the New Relic
//! Platform API. A daemon that goes away is waited for, never fatal.
//!
//! ## Modules
//!
//! * `config`: TOML configuration with defaults, command-line overrides
//!   and validation via the `validator` crate.
//!
//! * `core`: Runtime components:
//!   - Miner API client and wire codec
//!   - Metric extraction rules and the per-cycle query plan
//!   - Startup handshake and link state tracking
//!   - Poll loop executor and the `Reporter` abstraction
//!
//! * `logger`: `tracing` subscriber setup with console output in
//!   compact, pretty or JSON form and optional systemd journald output.
//!
//! * `newrelic`: `Reporter` implementation for the New Relic Platform API.

pub mod config;
pub mod core;
pub mod logger;
pub mod newrelic;
