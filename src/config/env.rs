//! Environment variable overlay.
//!
//! A fixed set of variables is read through an [`EnvSource`], so tests can
//! supply a plain map instead of mutating the real process environment.
//! A variable that is set but unparseable is skipped and logged; a bad shell
//! export must not abort a run.

use super::types::SimConfig;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Key/value lookup for environment variables.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        // Non-UTF-8 values are treated as unset.
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Environment variables recognised by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnvVar {
    OrganizationId,
    DefenderCount,
    ThreatCount,
    CenterLat,
    CenterLon,
    EngagementMix,
    FormationType,
    PlacementPattern,
    LogLevel,
    EnableAar,
    AarOutputPath,
    VerboseLogging,
}

impl EnvVar {
    /// Every variable, in the order the overlay applies them.
    pub const ALL: [EnvVar; 12] = [
        EnvVar::OrganizationId,
        EnvVar::DefenderCount,
        EnvVar::ThreatCount,
        EnvVar::CenterLat,
        EnvVar::CenterLon,
        EnvVar::EngagementMix,
        EnvVar::FormationType,
        EnvVar::PlacementPattern,
        EnvVar::LogLevel,
        EnvVar::EnableAar,
        EnvVar::AarOutputPath,
        EnvVar::VerboseLogging,
    ];

    /// The variable name as exported in the shell.
    pub const fn as_str(self) -> &'static str {
        match self {
            EnvVar::OrganizationId => "ORGANIZATION_ID",
            EnvVar::DefenderCount => "DEFENDER_COUNT",
            EnvVar::ThreatCount => "THREAT_COUNT",
            EnvVar::CenterLat => "CENTER_LAT",
            EnvVar::CenterLon => "CENTER_LON",
            EnvVar::EngagementMix => "ENGAGEMENT_MIX",
            EnvVar::FormationType => "FORMATION_TYPE",
            EnvVar::PlacementPattern => "PLACEMENT_PATTERN",
            EnvVar::LogLevel => "LOG_LEVEL",
            EnvVar::EnableAar => "ENABLE_AAR",
            EnvVar::AarOutputPath => "AAR_OUTPUT_PATH",
            EnvVar::VerboseLogging => "VERBOSE_LOGGING",
        }
    }

    /// Dotted path of the field this variable sets.
    pub const fn field(self) -> &'static str {
        match self {
            EnvVar::OrganizationId => "simulation.organization_id",
            EnvVar::DefenderCount => "numeric_defaults.defender_count",
            EnvVar::ThreatCount => "numeric_defaults.threat_count",
            EnvVar::CenterLat => "numeric_defaults.center.latitude",
            EnvVar::CenterLon => "numeric_defaults.center.longitude",
            EnvVar::EngagementMix => "numeric_defaults.engagement_mix",
            EnvVar::FormationType => "swarm_behavior.formation",
            EnvVar::PlacementPattern => "defense_behavior.placement",
            EnvVar::LogLevel => "logging.console_level",
            EnvVar::EnableAar => "logging.enable_aar",
            EnvVar::AarOutputPath => "logging.aar_output_path",
            EnvVar::VerboseLogging => "advanced.verbose_logging",
        }
    }

    /// Parse `raw` and write it into `config`. On error `config` is untouched.
    fn apply(self, config: &mut SimConfig, raw: &str) -> Result<(), &'static str> {
        match self {
            EnvVar::OrganizationId => config.simulation.organization_id = raw.to_string(),
            EnvVar::DefenderCount => config.numeric_defaults.defender_count = parse_int(raw)?,
            EnvVar::ThreatCount => config.numeric_defaults.threat_count = parse_int(raw)?,
            EnvVar::CenterLat => config.numeric_defaults.center.latitude = parse_float(raw)?,
            EnvVar::CenterLon => config.numeric_defaults.center.longitude = parse_float(raw)?,
            EnvVar::EngagementMix => config.numeric_defaults.engagement_mix = parse_float(raw)?,
            EnvVar::FormationType => config.swarm_behavior.formation = raw.to_string(),
            EnvVar::PlacementPattern => config.defense_behavior.placement = raw.to_string(),
            EnvVar::LogLevel => config.logging.console_level = raw.to_string(),
            EnvVar::EnableAar => config.logging.enable_aar = parse_bool(raw)?,
            EnvVar::AarOutputPath => config.logging.aar_output_path = raw.to_string(),
            EnvVar::VerboseLogging => config.advanced.verbose_logging = parse_bool(raw)?,
        }
        Ok(())
    }
}

impl std::fmt::Display for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable that was set but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSkip {
    pub var: EnvVar,
    pub value: String,
    pub reason: &'static str,
}

/// What the overlay did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvReport {
    pub applied: Vec<EnvVar>,
    pub skipped: Vec<EnvSkip>,
}

/// Overlay recognised environment variables onto `config`.
///
/// Unset and blank variables are ignored. Values are trimmed before parsing.
pub fn apply_env(config: &mut SimConfig, env: &impl EnvSource) -> EnvReport {
    let mut report = EnvReport::default();

    for var in EnvVar::ALL {
        let Some(raw) = env.get(var.as_str()) else {
            continue;
        };
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }

        match var.apply(config, value) {
            Ok(()) => {
                debug!(var = %var, field = var.field(), "Applied environment override");
                report.applied.push(var);
            }
            Err(reason) => {
                warn!(
                    var = %var,
                    value = %value,
                    "Ignoring environment override: {}",
                    reason
                );
                report.skipped.push(EnvSkip {
                    var,
                    value: value.to_string(),
                    reason,
                });
            }
        }
    }

    report
}

fn parse_int(raw: &str) -> Result<i32, &'static str> {
    raw.parse().map_err(|_| "expected an integer")
}

fn parse_float(raw: &str) -> Result<f64, &'static str> {
    raw.parse().map_err(|_| "expected a number")
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`, case-insensitively.
pub fn parse_bool(raw: &str) -> Result<bool, &'static str> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err("expected a boolean"),
    }
}
