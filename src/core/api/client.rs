//! One-shot request/response client for the miner API socket.
//!
//! The daemon serves exactly one command per connection and closes the stream
//! after answering, so every `send` dials a fresh connection. There is no pooling
//! and no retry here; both belong to the orchestrator.

use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::timeout,
};
use tracing::{debug, trace, warn};

use super::{
    codec::{decode_response, encode_request, StatusKind},
    error::{ApiError, ApiResult},
    record::DeviceRecord,
};
use crate::config::daemon::DaemonConfig;

/// Responses larger than this are treated as garbage rather than buffered forever.
const MAX_RESPONSE_BYTES: usize = 1 << 20;

/// Anything that can answer miner API commands.
///
/// The collectors and the executor only see this trait, which keeps the TCP
/// transport swappable for an in-memory daemon in tests.
#[async_trait::async_trait]
pub trait DaemonApi: Send + Sync {
    /// Sends `command` (with an optional argument) and returns the decoded records.
    async fn send(&self, command: &str, argument: Option<&str>) -> ApiResult<Vec<DeviceRecord>>;
}

/// TCP implementation of [`DaemonApi`].
#[derive(Debug, Clone)]
pub struct TcpDaemonClient {
    addr: String,
    timeout: Duration,
}

impl TcpDaemonClient {
    /// Creates a client for `host:port`; `timeout` bounds each of connect, write and read.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            addr: format!("{}:{}", host, port),
            timeout,
        }
    }

    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::new(
            &config.host,
            config.port,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn exchange(&self, request: &str) -> ApiResult<Vec<u8>> {
        let mut stream = timeout(self.timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| ApiError::unavailable(&self.addr, "connect timed out"))?
            .map_err(|e| ApiError::unavailable(&self.addr, e))?;

        timeout(self.timeout, stream.write_all(request.as_bytes()))
            .await
            .map_err(|_| ApiError::unavailable(&self.addr, "write timed out"))?
            .map_err(|e| ApiError::unavailable(&self.addr, e))?;

        let mut payload = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = timeout(self.timeout, stream.read(&mut chunk))
                .await
                .map_err(|_| ApiError::unavailable(&self.addr, "read timed out"))?
                .map_err(|e| ApiError::unavailable(&self.addr, e))?;
            if n == 0 {
                break;
            }
            // The daemon terminates its answer with a NUL byte.
            if let Some(end) = chunk[..n].iter().position(|b| *b == 0) {
                payload.extend_from_slice(&chunk[..end]);
                break;
            }
            payload.extend_from_slice(&chunk[..n]);
            if payload.len() > MAX_RESPONSE_BYTES {
                return Err(ApiError::protocol(
                    request,
                    format!("response exceeds {} bytes", MAX_RESPONSE_BYTES),
                ));
            }
        }

        if payload.is_empty() {
            return Err(ApiError::unavailable(
                &self.addr,
                "connection closed before any response",
            ));
        }
        Ok(payload)
    }
}

#[async_trait::async_trait]
impl DaemonApi for TcpDaemonClient {
    async fn send(&self, command: &str, argument: Option<&str>) -> ApiResult<Vec<DeviceRecord>> {
        let request = encode_request(command, argument);
        debug!("Sending '{}' to {}", request, self.addr);

        let payload = self.exchange(&request).await?;
        trace!("Raw response to '{}': {} bytes", command, payload.len());

        let response = decode_response(command, &payload)?;
        if response.status.kind == StatusKind::Warning {
            warn!(
                "Daemon warned on '{}': {}",
                command, response.status.message
            );
        }
        debug!(
            "'{}' returned {} record(s)",
            command,
            response.records.len()
        );
        Ok(response.records)
    }
}
