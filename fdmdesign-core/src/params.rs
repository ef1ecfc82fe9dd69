//! Parameter Record - The Single Geometry Snapshot
//!
//! Created from defaults per request, mutated by inference then correction.
//! Lengths are millimetres, angles are degrees.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadClass {
    #[default]
    Normal,
    High,
}

impl LoadClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadClass::Normal => "normal",
            LoadClass::High => "high",
        }
    }
}

impl fmt::Display for LoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names in their fixed order. Also the template placeholder names.
pub const PARAMETER_NAMES: [&str; 8] = [
    "height", "width", "depth", "angle", "wall", "slots", "drain", "load",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub angle: f64,
    pub wall: f64,
    pub slots: u32,
    pub drain: u32,
    pub load: LoadClass,
}

impl Default for ParameterRecord {
    fn default() -> Self {
        Self {
            height: 120.0,
            width: 80.0,
            depth: 80.0,
            angle: 60.0,
            wall: 4.0,
            slots: 0,
            drain: 0,
            load: LoadClass::Normal,
        }
    }
}

impl ParameterRecord {
    /// Height over width, with width floored at 1 so a zero width never divides.
    pub fn ratio(&self) -> f64 {
        self.height / self.width.max(1.0)
    }

    /// `(name, literal)` pairs in field order. Strings are unquoted.
    pub fn named_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("height", self.height.to_string()),
            ("width", self.width.to_string()),
            ("depth", self.depth.to_string()),
            ("angle", self.angle.to_string()),
            ("wall", self.wall.to_string()),
            ("slots", self.slots.to_string()),
            ("drain", self.drain.to_string()),
            ("load", self.load.to_string()),
        ]
    }

    /// Render the mapping literal used by the `PARAMS` artifact key.
    pub fn to_literal(&self) -> String {
        let entries: Vec<String> = self
            .named_values()
            .into_iter()
            .map(|(name, value)| match name {
                "load" => format!("'{}': '{}'", name, value),
                _ => format!("'{}': {}", name, value),
            })
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

impl fmt::Display for ParameterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsParseError {
    #[error("Parameter literal must be wrapped in braces")]
    NotAMapping,

    #[error("Malformed parameter entry: {0}")]
    MalformedEntry(String),

    #[error("Unknown parameter: {0}")]
    UnknownKey(String),

    #[error("Missing parameter: {0}")]
    MissingKey(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| s.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(s)
}

fn parse_length(key: &str, value: &str) -> Result<f64, ParamsParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| ParamsParseError::InvalidValue(key.to_string(), value.to_string()))
}

fn parse_count(key: &str, value: &str) -> Result<u32, ParamsParseError> {
    value
        .parse::<u32>()
        .map_err(|_| ParamsParseError::InvalidValue(key.to_string(), value.to_string()))
}

impl FromStr for ParameterRecord {
    type Err = ParamsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .trim()
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or(ParamsParseError::NotAMapping)?;

        let mut record = ParameterRecord::default();
        let mut seen = [false; PARAMETER_NAMES.len()];

        for entry in body.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once(':')
                .ok_or_else(|| ParamsParseError::MalformedEntry(entry.to_string()))?;
            let key = unquote(key);
            let value = unquote(value);

            match key {
                "height" => record.height = parse_length(key, value)?,
                "width" => record.width = parse_length(key, value)?,
                "depth" => record.depth = parse_length(key, value)?,
                "angle" => record.angle = parse_length(key, value)?,
                "wall" => record.wall = parse_length(key, value)?,
                "slots" => record.slots = parse_count(key, value)?,
                "drain" => record.drain = parse_count(key, value)?,
                "load" => {
                    record.load = match value {
                        "normal" => LoadClass::Normal,
                        "high" => LoadClass::High,
                        _ => {
                            return Err(ParamsParseError::InvalidValue(
                                key.to_string(),
                                value.to_string(),
                            ))
                        }
                    }
                }
                other => return Err(ParamsParseError::UnknownKey(other.to_string())),
            }

            if let Some(idx) = PARAMETER_NAMES.iter().position(|n| *n == key) {
                seen[idx] = true;
            }
        }

        if let Some(idx) = seen.iter().position(|s| !s) {
            return Err(ParamsParseError::MissingKey(PARAMETER_NAMES[idx]));
        }

        Ok(record)
    }
}
