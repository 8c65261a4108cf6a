//! Decoded daemon records and the field-name type table.
//!
//! The miner API does not describe its own types: every value travels as text.
//! `FieldKind::of` is the single table that decides which keys are integers,
//! which are floats, and which stay text. Decoding consults it once per field,
//! so collectors only ever see typed values.

use std::{collections::BTreeMap, fmt};

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value. Integers widen to `f64`; text never converts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Wire type of a known field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Text,
}

const INT_FIELDS: &[&str] = &[
    "ASC",
    "STATS",
    "Code",
    "When",
    "Elapsed",
    "Accepted",
    "Rejected",
    "Hardware Errors",
    "base clockrate",
    "fan percent",
    "sequence modulus",
];

const FLOAT_FIELDS: &[&str] = &[
    "Temperature",
    "MHS 5s",
    "MHS av",
    "Device Rejected%",
    "Network Difficulty",
];

impl FieldKind {
    /// Looks up the wire type of `name`.
    ///
    /// Per-chip sensor keys (`Asic<N> die temperature`, `Asic<N> voltage <M>`, ...)
    /// are matched by shape rather than listed one by one.
    pub fn of(name: &str) -> FieldKind {
        if INT_FIELDS.contains(&name) {
            return FieldKind::Int;
        }
        if FLOAT_FIELDS.contains(&name) {
            return FieldKind::Float;
        }
        Self::asic_sensor(name).unwrap_or(FieldKind::Text)
    }

    fn asic_sensor(name: &str) -> Option<FieldKind> {
        let rest = name.strip_prefix("Asic")?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        match &rest[digits..] {
            " hash clockrate" => Some(FieldKind::Int),
            " board temperature" | " die temperature" => Some(FieldKind::Float),
            suffix => {
                let index = suffix.strip_prefix(" voltage ")?;
                (!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
                    .then_some(FieldKind::Float)
            }
        }
    }

    /// Converts raw field text according to this kind.
    ///
    /// Empty text is always accepted and kept as empty text, whatever the kind.
    /// Returns `None` when non-empty text does not parse as the expected number.
    /// `inf` and `NaN` spellings are not numbers here.
    pub fn decode(self, raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return Some(Value::Text(String::new()));
        }
        match self {
            FieldKind::Int => raw.trim().parse().ok().map(Value::Int),
            FieldKind::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float),
            FieldKind::Text => Some(Value::Text(raw.to_string())),
        }
    }
}

/// One row of a daemon response: field name to typed value.
///
/// The field set depends on the command, the device driver, and the firmware,
/// so nothing here assumes a schema. Typed views live in the collectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRecord {
    fields: BTreeMap<String, Value>,
}

impl DeviceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing any earlier value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Builder-style `insert`, handy for fixtures.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for DeviceRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        DeviceRecord {
            fields: iter.into_iter().collect(),
        }
    }
}
