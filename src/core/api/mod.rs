//! Client side of the cgminer/sgminer API.
//!
//! * `codec`: text wire grammar (sections, fields, escapes, STATUS handling)
//! * `record`: decoded rows and the field-name type table
//! * `client`: the `DaemonApi` seam and its TCP implementation
//! * `error`: `ApiError`

pub mod client;
pub mod codec;
pub mod error;
pub mod record;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{DaemonApi, TcpDaemonClient};
pub use error::{ApiError, ApiResult};
pub use record::{DeviceRecord, FieldKind, Value};
