//! Conversion between attribute file content and typed values
//!
//! Decoders take the raw file text. Malformed numeric content is a
//! [`ParseError`]; out-of-domain content (a flag that is neither `0` nor `1`,
//! a percent above its max) is logged and the best-effort value returned.
//!
//! `attr` is only used to give the warnings some context.

use tracing::warn;

use crate::error::ParseError;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Decode a `"0"` / `"1"` flag.
///
/// Other integers are accepted (anything but `1` is false) with a warning.
pub fn decode_flag(attr: &str, text: &str) -> Result<bool, ParseError> {
    let text = text.trim();
    if text != "0" && text != "1" {
        warn!(attribute = attr, content = text, "expected 0 or 1 in flag attribute");
    }
    let value = text
        .parse::<i64>()
        .map_err(|_| ParseError::new(text, "flag"))?;
    Ok(value == 1)
}

/// Decode an integer in `base` (2..=36)
pub fn decode_int(text: &str, base: u32) -> Result<i64, ParseError> {
    let text = text.trim();
    if !(2..=36).contains(&base) {
        return Err(ParseError::new(text, "integer with a valid base"));
    }
    i64::from_str_radix(text, base).map_err(|_| ParseError::new(text, "integer"))
}

/// Decode a percent value.
///
/// With `max`, the file holds `0..=max` and the result is scaled to 0-100.
/// A raw value above `max` is returned unclamped.
pub fn decode_percent(attr: &str, text: &str, max: Option<u32>) -> Result<f64, ParseError> {
    let text = text.trim();
    let raw: f64 = text
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ParseError::new(text, "number"))?;

    let value = match scale(attr, max) {
        Some(max) => {
            if raw > max {
                warn!(attribute = attr, raw, max, "attribute value exceeds its max");
            }
            raw * 100.0 / max
        }
        None => raw,
    };
    Ok(round2(value))
}

/// Decode text content, stripped of surrounding whitespace and newlines
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

pub fn encode_flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

pub fn encode_int(value: i64) -> String {
    value.to_string()
}

/// Clamp a percent into 0-100, warning when it was outside
pub fn clamp_percent(attr: &str, value: f64) -> f64 {
    if value.is_nan() {
        warn!(attribute = attr, "percent value is NaN, using 0");
        return 0.0;
    }
    if !(0.0..=100.0).contains(&value) {
        warn!(attribute = attr, value, "expected a percent in 0-100, clamping");
        return value.clamp(0.0, 100.0);
    }
    value
}

/// Encode a percent.
///
/// Returns the clamped percent together with the text to write: the value
/// scaled to `round(max * value / 100)` when `max` is given, otherwise the
/// raw value.
pub fn encode_percent(attr: &str, value: f64, max: Option<u32>) -> (f64, String) {
    let value = clamp_percent(attr, value);
    let text = match scale(attr, max) {
        Some(max) => format!("{}", (max * value / 100.0).round() as i64),
        None => format_raw(value),
    };
    (value, text)
}

pub fn encode_text(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

pub fn encode_bytes(value: &[u8]) -> Vec<u8> {
    value.to_vec()
}

fn scale(attr: &str, max: Option<u32>) -> Option<f64> {
    match max {
        Some(0) => {
            warn!(attribute = attr, "percent max of 0 ignored");
            None
        }
        Some(max) => Some(f64::from(max)),
        None => None,
    }
}

fn format_raw(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
