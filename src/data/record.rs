//! Sensor records as received from the device.
//!
//! Each line on the serial link is a JSON object such as
//! `{"temperature":23.4,"airQuality":120,"soundLevel":41}`.

use serde_json::{Map, Value};

use super::metric::Metric;
use crate::error::RecordError;

/// One parsed sensor reading.
///
/// The decoded JSON object is kept alongside the extracted metrics so the
/// record can be forwarded exactly as it was received, including any extra
/// fields the firmware adds.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    /// Temperature in °C.
    pub temperature: f64,
    /// Air quality in ppm.
    pub air_quality: f64,
    /// Sound level in dB.
    pub sound_level: f64,
    raw: Map<String, Value>,
}

impl SensorRecord {
    /// Parse a single trimmed line of device output.
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_value(value)
    }

    /// Build a record from an already decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let raw = match value {
            Value::Object(map) => map,
            other => return Err(RecordError::NotAnObject(json_kind(&other))),
        };

        Ok(Self {
            temperature: metric_field(&raw, Metric::Temperature)?,
            air_quality: metric_field(&raw, Metric::AirQuality)?,
            sound_level: metric_field(&raw, Metric::SoundLevel)?,
            raw,
        })
    }

    /// Value of the given metric.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::AirQuality => self.air_quality,
            Metric::SoundLevel => self.sound_level,
        }
    }

    /// The record as received, for forwarding.
    pub fn to_json(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

fn metric_field(raw: &Map<String, Value>, metric: Metric) -> Result<f64, RecordError> {
    let key = metric.json_key();
    match raw.get(key) {
        None | Some(Value::Null) => Err(RecordError::MissingField(key)),
        Some(value) => value.as_f64().ok_or(RecordError::NotANumber(key)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Format a number the way a JSON number prints: integral values have no
/// fractional part, everything else uses the shortest exact representation.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Format with exactly one decimal. Values exactly halfway between two
/// tenths round away from zero (`22.25` prints as `22.3`); everything else
/// rounds to the nearest tenth of the exact binary value.
pub fn format_tenths(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    if !value.is_finite() {
        return format!("{}", value);
    }

    let magnitude = value.abs();
    let scaled = magnitude * 20.0;
    // A tie is an odd number of twentieths, and only counts if the
    // multiplication above was exact.
    let exact = magnitude.mul_add(20.0, -scaled) == 0.0;
    if exact && scaled < 1e15 && scaled.fract() == 0.0 && (scaled as u64) % 2 == 1 {
        let tenths = (scaled as u64 + 1) / 2;
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}{}.{}", sign, tenths / 10, tenths % 10);
    }

    format!("{:.1}", value)
}
