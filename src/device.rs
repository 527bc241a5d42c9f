//! Device records
//!
//! The enumeration command prints one JSON object per line:
//!
//! ```text
//! {"id": 52, "desc": "Built-in Audio Analog Stereo"}
//! {"id": "61"}
//! ```
//!
//! `id` is required (number or string), `desc` is optional display text.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

// ============================================================================
// Types
// ============================================================================

/// Opaque device identifier, carried in the string form passed to the switch command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create an identifier from raw text
    ///
    /// Returns `None` for blank input. Surrounding whitespace is stripped.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract an identifier from a JSON value
    ///
    /// Numbers and non-blank strings are accepted; everything else counts as absent.
    /// Integral floats (`52.0`, `1e2`) are written without a fraction.
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.is_f64() => {
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 {
                    // `+ 0.0` folds -0.0 into 0.0
                    Self::new(&format!("{:.0}", f + 0.0))
                } else {
                    Self::new(&n.to_string())
                }
            }
            Value::Number(n) => Self::new(&n.to_string()),
            Value::String(s) => Self::new(s),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One audio output endpoint reported by the enumeration command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: DeviceId,
    /// Trimmed, non-empty description (if the record carried one)
    pub description: Option<String>,
}

impl Device {
    #[must_use]
    pub fn new(id: DeviceId, description: Option<&str>) -> Self {
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);
        Self { id, description }
    }

    /// Display label: the description, or `Device {id}` when there is none
    #[must_use]
    pub fn label(&self) -> String {
        match &self.description {
            Some(desc) => desc.clone(),
            None => format!("Device {}", self.id),
        }
    }
}

// ============================================================================
// Line Parsing
// ============================================================================

/// Result of parsing a single output line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A usable device record
    Device(Device),
    /// Well-formed record without a usable `id`
    MissingId,
    /// Not a JSON object
    Malformed(String),
}

/// Parse one line of enumeration output
#[must_use]
pub fn parse_line(line: &str) -> ParsedLine {
    let value: Value = match serde_json::from_str(line.trim()) {
        Ok(value) => value,
        Err(e) => return ParsedLine::Malformed(e.to_string()),
    };

    let Value::Object(record) = value else {
        return ParsedLine::Malformed("expected a JSON object".to_string());
    };

    let Some(id) = record.get("id").and_then(DeviceId::from_json) else {
        return ParsedLine::MissingId;
    };

    let description = record.get("desc").and_then(Value::as_str);
    ParsedLine::Device(Device::new(id, description))
}
