//! In-memory daemon used by collector and executor tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use tokio::time::Instant;

use super::{
    client::DaemonApi,
    error::{ApiError, ApiResult},
    record::{DeviceRecord, Value},
};

/// Answers commands from a fixed table, with optional one-shot failures queued
/// per command. Every call is logged with the (possibly paused) tokio clock.
#[derive(Default)]
pub struct ScriptedDaemon {
    answers: HashMap<String, Vec<DeviceRecord>>,
    failures: Mutex<HashMap<String, VecDeque<ApiError>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, command: &str, records: Vec<DeviceRecord>) -> Self {
        self.answers.insert(command.to_string(), records);
        self
    }

    /// Queues `count` unavailability failures for `command` before it succeeds.
    pub fn fail_times(self, command: &str, count: usize) -> Self {
        {
            let mut failures = self.failures.lock().unwrap();
            let queue = failures.entry(command.to_string()).or_default();
            for _ in 0..count {
                queue.push_back(ApiError::unavailable("127.0.0.1:4028", "connection refused"));
            }
        }
        self
    }

    /// Queues an arbitrary error for the next call of `command`.
    pub fn fail_with(self, command: &str, error: ApiError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(error);
        self
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(c, _)| c).collect()
    }
}

#[async_trait::async_trait]
impl DaemonApi for ScriptedDaemon {
    async fn send(&self, command: &str, _argument: Option<&str>) -> ApiResult<Vec<DeviceRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), Instant::now()));

        if let Some(err) = self
            .failures
            .lock()
            .unwrap()
            .get_mut(command)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }

        self.answers
            .get(command)
            .cloned()
            .ok_or_else(|| ApiError::Rejected {
                command: command.to_string(),
                code: 14,
                message: "Invalid command".to_string(),
            })
    }
}

pub fn text(v: &str) -> Value {
    Value::Text(v.to_string())
}

pub fn asc(id: i64, enabled: bool, temperature: f64) -> DeviceRecord {
    DeviceRecord::new()
        .with("ASC", Value::Int(id))
        .with("Name", text("BAJ"))
        .with("ID", text(&id.to_string()))
        .with("Enabled", text(if enabled { "Y" } else { "N" }))
        .with("Temperature", Value::Float(temperature))
        .with("MHS 5s", Value::Float(13_000.0 + id as f64))
        .with("Device Rejected%", Value::Float(0.5))
        .with("Hardware Errors", Value::Int(id * 2))
}

/// A stats row from a board exposing the extended per-chip sensor block.
pub fn extended_board(stats: i64, die_reading: f64) -> DeviceRecord {
    let mut record = DeviceRecord::new()
        .with("STATS", Value::Int(stats))
        .with("ID", text(&format!("BAJ{}", stats)))
        .with("sequence modulus", Value::Int(4))
        .with("base clockrate", Value::Int(650))
        .with("fan percent", Value::Int(70));
    for chip in 0..4 {
        let die = if chip == 2 { die_reading } else { 80.0 + chip as f64 };
        record = record
            .with(format!("Asic{} board temperature", chip), Value::Float(60.0 + chip as f64))
            .with(format!("Asic{} die temperature", chip), Value::Float(die))
            .with(format!("Asic{} hash clockrate", chip), Value::Int(600 + chip))
            .with(format!("Asic{} voltage 0", chip), Value::Float(0.75));
    }
    record
}

pub fn pool_stats(stats: i64) -> DeviceRecord {
    DeviceRecord::new()
        .with("STATS", Value::Int(stats))
        .with("ID", text(&format!("POOL{}", stats)))
        .with("Elapsed", Value::Int(3600))
}

pub fn summary() -> DeviceRecord {
    DeviceRecord::new()
        .with("SUMMARY", text(""))
        .with("MHS 5s", Value::Float(26_001.0))
        .with("Device Rejected%", Value::Float(1.25))
}

pub fn coin(difficulty: f64) -> DeviceRecord {
    DeviceRecord::new()
        .with("COIN", text(""))
        .with("Hash Method", text("sha256"))
        .with("Network Difficulty", Value::Float(difficulty))
}

/// A daemon answering every command of the startup handshake and the poll plan.
pub fn healthy_daemon() -> ScriptedDaemon {
    ScriptedDaemon::new()
        .answer(
            "version",
            vec![DeviceRecord::new()
                .with("CGMiner", text("4.9.2"))
                .with("API", text("3.7"))],
        )
        .answer(
            "devdetails",
            vec![DeviceRecord::new()
                .with("DEVDETAILS", Value::Int(0))
                .with("Name", text("BAJ"))
                .with("ID", text("0"))
                .with("Driver", text("BitmainAsic"))
                .with("Kernel", text(""))],
        )
        .answer("devs", vec![asc(0, true, 61.0), asc(1, false, 74.0)])
        .answer("stats", vec![extended_board(0, 90.0), pool_stats(1)])
        .answer("summary", vec![summary()])
        .answer("coin", vec![coin(1.5e13)])
}
