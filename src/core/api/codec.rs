//! Text codec for the cgminer/sgminer API.
//!
//! Response grammar:
//!
//! ```text
//! response := section* NUL?
//! section  := field ("," field)* "|"
//! field    := key "=" value | label
//! ```
//!
//! The first section is always the `STATUS` section; every later section is one
//! record. A backslash escapes the next character, so `\,` `\|` `\=` and `\\`
//! can appear inside keys and values.

use std::fmt::Write as _;

use super::{
    error::{ApiError, ApiResult},
    record::{DeviceRecord, FieldKind, Value},
};

/// Severity letter carried by the `STATUS` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Info,
    Warning,
    Error,
    Fatal,
}

impl StatusKind {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "S" => Some(StatusKind::Success),
            "I" => Some(StatusKind::Info),
            "W" => Some(StatusKind::Warning),
            "E" => Some(StatusKind::Error),
            "F" => Some(StatusKind::Fatal),
            _ => None,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            StatusKind::Success => "S",
            StatusKind::Info => "I",
            StatusKind::Warning => "W",
            StatusKind::Error => "E",
            StatusKind::Fatal => "F",
        }
    }

    /// `E` and `F` mean the command did not produce data.
    pub fn is_failure(&self) -> bool {
        matches!(self, StatusKind::Error | StatusKind::Fatal)
    }
}

/// The leading `STATUS` section of every response.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSection {
    pub kind: StatusKind,
    pub code: i64,
    pub message: String,
    pub description: String,
}

impl StatusSection {
    pub fn success(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            code,
            message: message.into(),
            description: String::new(),
        }
    }
}

/// A fully decoded response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusSection,
    pub records: Vec<DeviceRecord>,
}

/// Builds the request line: `command` or `command|argument`.
pub fn encode_request(command: &str, argument: Option<&str>) -> String {
    match argument {
        Some(arg) => format!("{}|{}", command, arg),
        None => command.to_string(),
    }
}

type RawField = (String, Option<String>);

/// Splits wire text into sections of raw `(key, value)` pairs, resolving escapes.
fn split_sections(text: &str) -> Result<Vec<Vec<RawField>>, String> {
    let mut sections = Vec::new();
    let mut fields: Vec<RawField> = Vec::new();
    let mut key = String::new();
    let mut value: Option<String> = None;
    let mut escaped = false;

    fn finish(
        key: &mut String,
        value: &mut Option<String>,
        fields: &mut Vec<RawField>,
    ) -> Result<(), String> {
        if key.is_empty() {
            if value.is_some() {
                return Err("field with empty name".to_string());
            }
            return Ok(());
        }
        fields.push((std::mem::take(key), value.take()));
        Ok(())
    }

    for c in text.chars() {
        if escaped {
            value.as_mut().unwrap_or(&mut key).push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' if value.is_none() => value = Some(String::new()),
            ',' => finish(&mut key, &mut value, &mut fields)?,
            '|' => {
                finish(&mut key, &mut value, &mut fields)?;
                sections.push(std::mem::take(&mut fields));
            }
            _ => value.as_mut().unwrap_or(&mut key).push(c),
        }
    }

    if escaped {
        return Err("dangling escape at end of payload".to_string());
    }
    if !key.is_empty() || value.is_some() || !fields.is_empty() {
        return Err("payload truncated before section terminator".to_string());
    }
    Ok(sections)
}

fn decode_fields(command: &str, raw: Vec<RawField>) -> ApiResult<DeviceRecord> {
    raw.into_iter()
        .map(|(key, value)| {
            let raw_value = value.unwrap_or_default();
            let decoded = FieldKind::of(&key).decode(&raw_value).ok_or_else(|| {
                ApiError::protocol(
                    command,
                    format!("field '{}' has non-numeric value '{}'", key, raw_value),
                )
            })?;
            Ok((key, decoded))
        })
        .collect()
}

fn decode_status(command: &str, record: &DeviceRecord) -> ApiResult<StatusSection> {
    let letter = record
        .text("STATUS")
        .ok_or_else(|| ApiError::protocol(command, "response does not start with STATUS"))?;
    let kind = StatusKind::from_letter(letter)
        .ok_or_else(|| ApiError::protocol(command, format!("unknown status '{}'", letter)))?;

    Ok(StatusSection {
        kind,
        code: record.int("Code").unwrap_or_default(),
        message: record.text("Msg").unwrap_or_default().to_string(),
        description: record.text("Description").unwrap_or_default().to_string(),
    })
}

/// Decodes a complete response payload.
///
/// Trailing NUL bytes are ignored. A daemon-side `E`/`F` status is returned as
/// `ApiError::Rejected`; an answer with zero records is a valid, empty result.
pub fn decode_response(command: &str, payload: &[u8]) -> ApiResult<Response> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| ApiError::protocol(command, format!("payload is not UTF-8: {}", e)))?
        .trim_end_matches('\0');

    let mut sections = split_sections(text)
        .map_err(|reason| ApiError::protocol(command, reason))?
        .into_iter();

    let status_fields = sections
        .next()
        .ok_or_else(|| ApiError::protocol(command, "missing STATUS section"))?;
    let status = decode_status(command, &decode_fields(command, status_fields)?)?;

    if status.kind.is_failure() {
        return Err(ApiError::Rejected {
            command: command.to_string(),
            code: status.code,
            message: status.message,
        });
    }

    let records = sections
        .filter(|fields| !fields.is_empty())
        .map(|fields| decode_fields(command, fields))
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Response { status, records })
}

fn push_escaped(out: &mut String, raw: &str) {
    for c in raw.chars() {
        if matches!(c, ',' | '|' | '=' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Encodes a response the way the daemon writes it, including the NUL terminator.
pub fn encode_response(status: &StatusSection, records: &[DeviceRecord]) -> String {
    let mut out = String::new();
    out.push_str("STATUS=");
    out.push_str(status.kind.letter());
    let _ = write!(out, ",Code={},Msg=", status.code);
    push_escaped(&mut out, &status.message);
    out.push_str(",Description=");
    push_escaped(&mut out, &status.description);
    out.push('|');

    for record in records {
        for (i, (key, value)) in record.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_escaped(&mut out, key);
            out.push('=');
            push_escaped(&mut out, &value.to_string());
        }
        out.push('|');
    }
    out.push('\0');
    out
}
