//! Caller-supplied overrides, applied after the environment.
//!
//! Overrides arrive either as a dynamically typed map (what a CLI layer
//! naturally produces) or through the typed [`Overrides`] builder. The map is
//! first coerced into a list of [`Override`] values, one closed variant per
//! recognised key; applying that list is an exhaustive match and cannot fail.
//!
//! Unknown keys are ignored. A known key carrying the wrong type is a caller
//! bug and fails the whole resolution.

use super::duration::parse_duration;
use super::types::SimConfig;
use crate::error::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// A dynamically typed override value.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Duration(Duration),
}

impl OverrideValue {
    fn describe(&self) -> String {
        match self {
            OverrideValue::Int(v) => format!("integer {}", v),
            OverrideValue::Float(v) => format!("float {}", v),
            OverrideValue::Bool(v) => format!("boolean {}", v),
            OverrideValue::Str(v) => format!("string {:?}", v),
            OverrideValue::Duration(v) => format!("duration {:?}", v),
        }
    }
}

impl From<i64> for OverrideValue {
    fn from(v: i64) -> Self {
        OverrideValue::Int(v)
    }
}

impl From<f64> for OverrideValue {
    fn from(v: f64) -> Self {
        OverrideValue::Float(v)
    }
}

impl From<bool> for OverrideValue {
    fn from(v: bool) -> Self {
        OverrideValue::Bool(v)
    }
}

impl From<&str> for OverrideValue {
    fn from(v: &str) -> Self {
        OverrideValue::Str(v.to_string())
    }
}

impl From<String> for OverrideValue {
    fn from(v: String) -> Self {
        OverrideValue::Str(v)
    }
}

impl From<Duration> for OverrideValue {
    fn from(v: Duration) -> Self {
        OverrideValue::Duration(v)
    }
}

/// Override map keyed by [`OverrideKey`] names. Sorted, so coercion errors
/// are reported in a stable order.
pub type OverrideMap = BTreeMap<String, OverrideValue>;

/// The primitive kind a key expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Str,
    Duration,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Int => "an integer",
            ValueKind::Float => "a float",
            ValueKind::Bool => "a boolean",
            ValueKind::Str => "a string",
            ValueKind::Duration => "a duration",
        })
    }
}

/// Recognised override keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverrideKey {
    DefenderCount,
    ThreatCount,
    EngagementMix,
    Formation,
    Placement,
    WaveCount,
    WaveDelay,
    Autonomy,
    EvasionProbability,
    Difficulty,
    Verbose,
    EnableAar,
    LogLevel,
}

impl OverrideKey {
    pub const ALL: [OverrideKey; 13] = [
        OverrideKey::DefenderCount,
        OverrideKey::ThreatCount,
        OverrideKey::EngagementMix,
        OverrideKey::Formation,
        OverrideKey::Placement,
        OverrideKey::WaveCount,
        OverrideKey::WaveDelay,
        OverrideKey::Autonomy,
        OverrideKey::EvasionProbability,
        OverrideKey::Difficulty,
        OverrideKey::Verbose,
        OverrideKey::EnableAar,
        OverrideKey::LogLevel,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OverrideKey::DefenderCount => "defender_count",
            OverrideKey::ThreatCount => "threat_count",
            OverrideKey::EngagementMix => "engagement_mix",
            OverrideKey::Formation => "formation",
            OverrideKey::Placement => "placement",
            OverrideKey::WaveCount => "wave_count",
            OverrideKey::WaveDelay => "wave_delay",
            OverrideKey::Autonomy => "autonomy",
            OverrideKey::EvasionProbability => "evasion_probability",
            OverrideKey::Difficulty => "difficulty",
            OverrideKey::Verbose => "verbose",
            OverrideKey::EnableAar => "enable_aar",
            OverrideKey::LogLevel => "log_level",
        }
    }

    pub const fn kind(self) -> ValueKind {
        match self {
            OverrideKey::DefenderCount | OverrideKey::ThreatCount | OverrideKey::WaveCount => {
                ValueKind::Int
            }
            OverrideKey::EngagementMix
            | OverrideKey::EvasionProbability
            | OverrideKey::Difficulty => ValueKind::Float,
            OverrideKey::Formation
            | OverrideKey::Placement
            | OverrideKey::Autonomy
            | OverrideKey::LogLevel => ValueKind::Str,
            OverrideKey::WaveDelay => ValueKind::Duration,
            OverrideKey::Verbose | OverrideKey::EnableAar => ValueKind::Bool,
        }
    }
}

impl FromStr for OverrideKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OverrideKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed override.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    DefenderCount(i32),
    ThreatCount(i32),
    EngagementMix(f64),
    Formation(String),
    Placement(String),
    WaveCount(i32),
    WaveDelay(Duration),
    Autonomy(String),
    EvasionProbability(f64),
    /// Sets `defense_behavior.success_rate_modifier`.
    Difficulty(f64),
    /// Sets `advanced.verbose_logging`.
    Verbose(bool),
    EnableAar(bool),
    LogLevel(String),
}

impl Override {
    pub fn key(&self) -> OverrideKey {
        match self {
            Override::DefenderCount(_) => OverrideKey::DefenderCount,
            Override::ThreatCount(_) => OverrideKey::ThreatCount,
            Override::EngagementMix(_) => OverrideKey::EngagementMix,
            Override::Formation(_) => OverrideKey::Formation,
            Override::Placement(_) => OverrideKey::Placement,
            Override::WaveCount(_) => OverrideKey::WaveCount,
            Override::WaveDelay(_) => OverrideKey::WaveDelay,
            Override::Autonomy(_) => OverrideKey::Autonomy,
            Override::EvasionProbability(_) => OverrideKey::EvasionProbability,
            Override::Difficulty(_) => OverrideKey::Difficulty,
            Override::Verbose(_) => OverrideKey::Verbose,
            Override::EnableAar(_) => OverrideKey::EnableAar,
            Override::LogLevel(_) => OverrideKey::LogLevel,
        }
    }

    /// Coerce a dynamic value into the override for `key`.
    ///
    /// Floats also accept integers. Durations also accept a parseable string.
    pub fn coerce(key: OverrideKey, value: &OverrideValue) -> ConfigResult<Self> {
        let mismatch = || ConfigError::InvalidOverrideType {
            key: key.as_str().to_string(),
            expected: key.kind(),
            found: value.describe(),
        };

        let int = || match value {
            OverrideValue::Int(v) => i32::try_from(*v).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        };
        let float = || match value {
            OverrideValue::Float(v) => Ok(*v),
            OverrideValue::Int(v) => Ok(*v as f64),
            _ => Err(mismatch()),
        };
        let boolean = || match value {
            OverrideValue::Bool(v) => Ok(*v),
            _ => Err(mismatch()),
        };
        let string = || match value {
            OverrideValue::Str(v) => Ok(v.clone()),
            _ => Err(mismatch()),
        };

        Ok(match key {
            OverrideKey::DefenderCount => Override::DefenderCount(int()?),
            OverrideKey::ThreatCount => Override::ThreatCount(int()?),
            OverrideKey::WaveCount => Override::WaveCount(int()?),
            OverrideKey::EngagementMix => Override::EngagementMix(float()?),
            OverrideKey::EvasionProbability => Override::EvasionProbability(float()?),
            OverrideKey::Difficulty => Override::Difficulty(float()?),
            OverrideKey::Formation => Override::Formation(string()?),
            OverrideKey::Placement => Override::Placement(string()?),
            OverrideKey::Autonomy => Override::Autonomy(string()?),
            OverrideKey::LogLevel => Override::LogLevel(string()?),
            OverrideKey::Verbose => Override::Verbose(boolean()?),
            OverrideKey::EnableAar => Override::EnableAar(boolean()?),
            OverrideKey::WaveDelay => Override::WaveDelay(match value {
                OverrideValue::Duration(d) => *d,
                OverrideValue::Str(s) => parse_duration(s).map_err(|_| mismatch())?,
                _ => return Err(mismatch()),
            }),
        })
    }

    /// Write this override into `config`.
    pub fn apply(&self, config: &mut SimConfig) {
        match self {
            Override::DefenderCount(v) => config.numeric_defaults.defender_count = *v,
            Override::ThreatCount(v) => config.numeric_defaults.threat_count = *v,
            Override::EngagementMix(v) => config.numeric_defaults.engagement_mix = *v,
            Override::Formation(v) => config.swarm_behavior.formation = v.clone(),
            Override::Placement(v) => config.defense_behavior.placement = v.clone(),
            Override::WaveCount(v) => config.swarm_behavior.wave_count = *v,
            Override::WaveDelay(v) => config.swarm_behavior.wave_delay = *v,
            Override::Autonomy(v) => config.swarm_behavior.autonomy = v.clone(),
            Override::EvasionProbability(v) => config.swarm_behavior.evasion_probability = *v,
            Override::Difficulty(v) => config.defense_behavior.success_rate_modifier = *v,
            Override::Verbose(v) => config.advanced.verbose_logging = *v,
            Override::EnableAar(v) => config.logging.enable_aar = *v,
            Override::LogLevel(v) => config.logging.console_level = v.clone(),
        }
    }
}

/// Coerce every recognised entry of `map`. Unknown keys are skipped.
pub fn parse_map(map: &OverrideMap) -> ConfigResult<Vec<Override>> {
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        match key.parse::<OverrideKey>() {
            Ok(known) => out.push(Override::coerce(known, value)?),
            Err(()) => debug!(key = %key, "Ignoring unrecognised override key"),
        }
    }
    Ok(out)
}

/// Apply overrides in order; later entries for the same key win.
pub fn apply(config: &mut SimConfig, overrides: &[Override]) {
    for o in overrides {
        debug!(key = %o.key(), "Applied override");
        o.apply(config);
    }
}

/// Typed builder for overrides.
///
/// ```
/// use swarm_sim_config::config::{Override, Overrides};
///
/// let overrides = Overrides::new().defender_count(15).formation("waves").build();
/// assert_eq!(overrides, vec![Override::DefenderCount(15), Override::Formation("waves".into())]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Overrides(Vec<Override>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defender_count(mut self, v: i32) -> Self {
        self.0.push(Override::DefenderCount(v));
        self
    }

    pub fn threat_count(mut self, v: i32) -> Self {
        self.0.push(Override::ThreatCount(v));
        self
    }

    pub fn engagement_mix(mut self, v: f64) -> Self {
        self.0.push(Override::EngagementMix(v));
        self
    }

    pub fn formation(mut self, v: impl Into<String>) -> Self {
        self.0.push(Override::Formation(v.into()));
        self
    }

    pub fn placement(mut self, v: impl Into<String>) -> Self {
        self.0.push(Override::Placement(v.into()));
        self
    }

    pub fn wave_count(mut self, v: i32) -> Self {
        self.0.push(Override::WaveCount(v));
        self
    }

    pub fn wave_delay(mut self, v: Duration) -> Self {
        self.0.push(Override::WaveDelay(v));
        self
    }

    pub fn autonomy(mut self, v: impl Into<String>) -> Self {
        self.0.push(Override::Autonomy(v.into()));
        self
    }

    pub fn evasion_probability(mut self, v: f64) -> Self {
        self.0.push(Override::EvasionProbability(v));
        self
    }

    pub fn difficulty(mut self, v: f64) -> Self {
        self.0.push(Override::Difficulty(v));
        self
    }

    pub fn verbose(mut self, v: bool) -> Self {
        self.0.push(Override::Verbose(v));
        self
    }

    pub fn enable_aar(mut self, v: bool) -> Self {
        self.0.push(Override::EnableAar(v));
        self
    }

    pub fn log_level(mut self, v: impl Into<String>) -> Self {
        self.0.push(Override::LogLevel(v.into()));
        self
    }

    pub fn build(self) -> Vec<Override> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, OverrideValue)>) -> OverrideMap {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_key_names_roundtrip() {
        for key in OverrideKey::ALL {
            assert_eq!(key.as_str().parse::<OverrideKey>(), Ok(key));
        }
        assert!("defenders".parse::<OverrideKey>().is_err());
    }

    #[test]
    fn test_parse_and_apply_map() {
        let overrides = parse_map(&map(vec![
            ("defender_count", 15.into()),
            ("formation", "waves".into()),
            ("evasion_probability", 0.45.into()),
            ("difficulty", 2.into()),
            ("verbose", true.into()),
            ("wave_delay", "1m30s".into()),
        ]))
        .unwrap();

        let mut config = SimConfig::defaults();
        apply(&mut config, &overrides);

        assert_eq!(config.numeric_defaults.defender_count, 15);
        assert_eq!(config.swarm_behavior.formation, "waves");
        assert!((config.swarm_behavior.evasion_probability - 0.45).abs() < f64::EPSILON);
        assert!((config.defense_behavior.success_rate_modifier - 2.0).abs() < f64::EPSILON);
        assert!(config.advanced.verbose_logging);
        assert_eq!(config.swarm_behavior.wave_delay, Duration::from_secs(90));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let overrides = parse_map(&map(vec![
            ("weather", "stormy".into()),
            ("threat_count", 40.into()),
        ]))
        .unwrap();
        assert_eq!(overrides, vec![Override::ThreatCount(40)]);
    }

    #[test]
    fn test_wrong_type_is_fatal() {
        let err = parse_map(&map(vec![("defender_count", "fifteen".into())])).unwrap_err();
        match err {
            ConfigError::InvalidOverrideType {
                key,
                expected,
                found,
            } => {
                assert_eq!(key, "defender_count");
                assert_eq!(expected, ValueKind::Int);
                assert_eq!(found, "string \"fifteen\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_int_does_not_accept_float() {
        assert!(Override::coerce(OverrideKey::WaveCount, &OverrideValue::Float(3.0)).is_err());
    }

    #[test]
    fn test_int_out_of_range_rejected() {
        let err = Override::coerce(OverrideKey::ThreatCount, &OverrideValue::Int(i64::MAX))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "override 'threat_count' expects an integer, got integer {}",
                i64::MAX
            )
        );
    }

    #[test]
    fn test_bool_and_string_are_strict() {
        assert!(Override::coerce(OverrideKey::Verbose, &"true".into()).is_err());
        assert!(Override::coerce(OverrideKey::LogLevel, &OverrideValue::Int(3)).is_err());
    }

    #[test]
    fn test_duration_accepts_native_and_string() {
        assert_eq!(
            Override::coerce(OverrideKey::WaveDelay, &Duration::from_secs(5).into()).unwrap(),
            Override::WaveDelay(Duration::from_secs(5))
        );
        assert_eq!(
            Override::coerce(OverrideKey::WaveDelay, &"45s".into()).unwrap(),
            Override::WaveDelay(Duration::from_secs(45))
        );
        assert!(Override::coerce(OverrideKey::WaveDelay, &"later".into()).is_err());
        assert!(Override::coerce(OverrideKey::WaveDelay, &OverrideValue::Int(5)).is_err());
    }

    #[test]
    fn test_first_bad_key_in_sorted_order_reported() {
        let err = parse_map(&map(vec![
            ("wave_count", "x".into()),
            ("autonomy", 1.into()),
        ]))
        .unwrap_err();
        assert!(err.to_string().starts_with("override 'autonomy'"));
    }

    #[test]
    fn test_builder_covers_every_key() {
        let overrides = Overrides::new()
            .defender_count(1)
            .threat_count(2)
            .engagement_mix(0.5)
            .formation("waves")
            .placement("line")
            .wave_count(4)
            .wave_delay(Duration::from_secs(10))
            .autonomy("high")
            .evasion_probability(0.1)
            .difficulty(1.5)
            .verbose(true)
            .enable_aar(false)
            .log_level("warn")
            .build();

        let mut keys: Vec<_> = overrides.iter().map(Override::key).collect();
        keys.sort();
        assert_eq!(keys, OverrideKey::ALL.to_vec());

        let mut config = SimConfig::defaults();
        apply(&mut config, &overrides);
        assert_eq!(config.defense_behavior.placement, "line");
        assert_eq!(config.swarm_behavior.autonomy, "high");
        assert!(!config.logging.enable_aar);
        assert_eq!(config.logging.console_level, "warn");
    }

    #[test]
    fn test_later_override_wins() {
        let overrides = Overrides::new().threat_count(10).threat_count(12).build();
        let mut config = SimConfig::defaults();
        apply(&mut config, &overrides);
        assert_eq!(config.numeric_defaults.threat_count, 12);
    }
}
