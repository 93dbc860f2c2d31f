//! Pin-settings decoding.
//!
//! The settings topic carries JSON describing pins to bind.  Two spellings
//! are accepted for every field:
//!
//! ```text
//!   {"p":5,"v":"light1","a":["on","off"],"i":false}
//!   {"pin":"D5","variable":"light1","alias":["on","off"],"initial":0}
//! ```
//!
//! A single object adds one pin.  An array replaces the whole binding set.
//! Oversized names and labels are truncated, never rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::pins;
use crate::registry::PinSpec;
use crate::text::{Label, Name, truncate};

const DEFAULT_HIGH: &str = "1";
const DEFAULT_LOW: &str = "0";

// ───────────────────────────────────────────────────────────────
// Wire shape
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WirePin {
    #[serde(rename = "p", alias = "pin")]
    pin: PinId,
    #[serde(rename = "v", alias = "variable")]
    name: String,
    #[serde(rename = "a", alias = "alias", default)]
    labels: Vec<String>,
    #[serde(rename = "i", alias = "initial", default)]
    initial: Option<Initial>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PinId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Initial {
    Flag(bool),
    Number(i64),
}

// ───────────────────────────────────────────────────────────────
// Decoded forms
// ───────────────────────────────────────────────────────────────

/// One settings publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinSettings {
    /// Add (or replace) one binding.
    Add(PinSpec),
    /// Remove everything, then add each decodable entry.  Entries that
    /// fail to decode are kept as errors so the caller can report them.
    Replace(Vec<Result<PinSpec, DecodeError>>),
}

/// Decode a settings payload.
pub fn decode_settings(payload: &str) -> Result<PinSettings, DecodeError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    match value {
        Value::Array(items) => Ok(PinSettings::Replace(
            items.into_iter().map(decode_value).collect(),
        )),
        other => decode_value(other).map(PinSettings::Add),
    }
}

/// Decode one pin object.
pub fn decode_pin(payload: &str) -> Result<PinSpec, DecodeError> {
    let wire: WirePin =
        serde_json::from_str(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    into_spec(wire)
}

fn decode_value(value: Value) -> Result<PinSpec, DecodeError> {
    let wire: WirePin =
        serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    into_spec(wire)
}

fn into_spec(wire: WirePin) -> Result<PinSpec, DecodeError> {
    let pin = match wire.pin {
        PinId::Number(n) => u8::try_from(n).map_err(|_| DecodeError::BadPin)?,
        PinId::Text(s) => parse_pin_name(&s).ok_or(DecodeError::BadPin)?,
    };
    if !pins::is_bindable(pin) {
        return Err(DecodeError::ReservedPin(pin));
    }
    if wire.name.is_empty() {
        return Err(DecodeError::EmptyName);
    }

    let mut labels = wire.labels.iter().map(String::as_str);
    let high: Label = truncate(labels.next().unwrap_or(DEFAULT_HIGH));
    let low: Label = truncate(labels.next().unwrap_or(DEFAULT_LOW));
    let initial = match wire.initial {
        None => false,
        Some(Initial::Flag(b)) => b,
        Some(Initial::Number(n)) => n != 0,
    };
    let name: Name = truncate(&wire.name);

    Ok(PinSpec {
        pin,
        name,
        high,
        low,
        initial,
    })
}

/// Pin number from `5`, `D5` or `GPIO5`.
pub fn parse_pin_name(text: &str) -> Option<u8> {
    let digits = text
        .strip_prefix("GPIO")
        .or_else(|| text.strip_prefix('D'))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Pin addressed by a per-pin settings topic (`<settings>/D5`).
pub fn pin_from_settings_topic(settings: &str, topic: &str) -> Option<u8> {
    let suffix = topic.strip_prefix(settings)?.strip_prefix('/')?;
    parse_pin_name(suffix)
}
