//! Human-readable durations ("45s", "3m", "1h30m", "250ms").
//!
//! Used for every duration field in the config file, for duration-typed
//! override strings, and when rendering a resolved config back to text.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;
use std::time::Duration;

/// Error returned when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration '{input}': {reason}")]
pub struct DurationParseError {
    pub input: String,
    pub reason: &'static str,
}

impl DurationParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a duration string.
///
/// Accepts one or more `<number><unit>` segments where unit is one of
/// `ns`, `us`, `ms`, `s`, `m`, `h`, `d`. Numbers may be fractional.
/// A bare number with no unit is taken as whole seconds.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::new(input, "empty string"));
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| DurationParseError::new(input, "missing unit"))?;
        if num_len == 0 {
            return Err(DurationParseError::new(input, "expected a number"));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| DurationParseError::new(input, "malformed number"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            "d" => 86_400.0 * 1e9,
            _ => return Err(DurationParseError::new(input, "unknown unit")),
        };
        rest = &rest[unit_len..];
        total_nanos += value * nanos_per_unit;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(DurationParseError::new(input, "out of range"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Render a duration in the compact form `parse_duration` accepts.
///
/// Whole seconds are written as `h`/`m`/`s` segments and any sub-second part
/// in the coarsest unit that keeps it exact, so parsing the output gives back
/// the same duration.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let mut secs = d.as_secs();
    let mut out = String::new();
    let hours = secs / 3600;
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
        secs %= 3600;
    }
    let minutes = secs / 60;
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
        secs %= 60;
    }
    if secs > 0 {
        out.push_str(&format!("{}s", secs));
    }

    match d.subsec_nanos() {
        0 => {}
        n if n % 1_000_000 == 0 => out.push_str(&format!("{}ms", n / 1_000_000)),
        n if n % 1_000 == 0 => out.push_str(&format!("{}us", n / 1_000)),
        n => out.push_str(&format!("{}ns", n)),
    }
    out
}

/// Serde adapter for `#[serde(with = "crate::config::duration::human")]`.
pub mod human {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(HumanDurationVisitor)
    }

    struct HumanDurationVisitor;

    impl<'de> Visitor<'de> for HumanDurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration such as \"45s\" or \"3m\", or whole seconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            parse_duration(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom(format!("duration cannot be negative (got {})", v)))
        }
    }
}
