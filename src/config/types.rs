//! Configuration types and structures.
//!
//! `SimConfig` is the canonical, fully-typed configuration for one simulation
//! run. Every section deserializes with `#[serde(default)]` so a config file
//! only needs to name the fields it changes, and rejects unknown keys so a
//! typo surfaces as a malformed file instead of being silently dropped.
//!
//! Enum-like fields (formation, placement, ...) are stored as the raw strings
//! they arrive as from files, environment variables, and overrides. The typed
//! views (`Formation`, `Placement`, ...) are what the validator checks them
//! against and what consumers should use once a config has been validated.

use super::duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Root configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub performance: PerformanceConfig,
    pub swarm_behavior: SwarmBehaviorConfig,
    pub defense_behavior: DefenseBehaviorConfig,
    pub logging: LoggingConfig,
    pub numeric_defaults: NumericDefaults,
    pub advanced: AdvancedConfig,
    pub engagement: EngagementConfig,
    pub target_priority: TargetPriorityConfig,
    pub termination: TerminationConfig,
}

/// Identity of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Run name, shown in reports. Must not be empty.
    pub name: String,
    pub description: String,
    /// Owning organization, usually supplied via `ORGANIZATION_ID`.
    pub organization_id: String,
    /// Simulation tick interval.
    #[serde(with = "duration::human")]
    pub update_interval: Duration,
    /// Wall-clock budget for the whole run.
    #[serde(with = "duration::human")]
    pub max_duration: Duration,
    /// RNG seed; 0 lets the engine pick one.
    pub random_seed: u64,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceConfig {
    pub max_entities: i32,
    pub worker_threads: i32,
    /// Edge length of a spatial-index cell, in meters.
    pub spatial_grid_cell: f64,
    #[serde(with = "duration::human")]
    pub tick_budget: Duration,
}

/// How the attacking swarm behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwarmBehaviorConfig {
    /// One of `distributed`, `concentrated`, `waves`.
    pub formation: String,
    pub wave_count: i32,
    #[serde(with = "duration::human")]
    pub wave_delay: Duration,
    /// One of `low`, `mixed`, `high`.
    pub autonomy: String,
    pub evasion_probability: f64,
    /// Threat speed in m/s.
    pub speed_range: Range<f64>,
}

/// How the defending systems are placed and engage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefenseBehaviorConfig {
    /// One of `ring`, `cluster`, `line`.
    pub placement: String,
    /// One of `closest`, `highest_threat`, `distributed`.
    pub engagement_rule: String,
    pub kinetic_ratio: f64,
    /// Multiplier applied to every success roll. Set by the `difficulty` override.
    pub success_rate_modifier: f64,
    /// Meters.
    pub detection_radius: f64,
    /// Meters. Expected to be within `detection_radius` but not enforced.
    pub engagement_radius: f64,
    /// Seconds between kinetic shots.
    pub kinetic_cooldown: Range<f64>,
    /// Seconds between electronic-warfare activations.
    pub electronic_cooldown: Range<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub console_level: String,
    /// Write an after-action report when the run ends.
    pub enable_aar: bool,
    pub aar_output_path: String,
    /// One of `json`, `markdown`.
    pub aar_format: String,
    pub log_engagements: bool,
}

/// Scenario-scale numbers most runs tweak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumericDefaults {
    pub defender_count: i32,
    pub threat_count: i32,
    /// Share of kinetic (vs electronic) engagements, in [0, 1].
    pub engagement_mix: f64,
    pub center: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above mean sea level.
    pub altitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdvancedConfig {
    pub verbose_logging: bool,
    pub deterministic: bool,
    pub debug_overlay: bool,
    pub profile_performance: bool,
}

/// Engagement outcome parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngagementConfig {
    pub kinetic_success_rate: Range<f64>,
    pub electronic_success_rate: Range<f64>,
    pub ammo_capacity: i32,
    /// Threats with jamming susceptibility above this are jammable.
    pub jamming_threshold: f64,
}

/// Weights used to rank threats for engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetPriorityConfig {
    pub distance_weight: f64,
    pub speed_weight: f64,
    pub role_weight: f64,
    /// Per-role score multipliers, keyed by threat role name.
    pub role_multipliers: BTreeMap<String, f64>,
}

impl TargetPriorityConfig {
    pub fn weight_sum(&self) -> f64 {
        self.distance_weight + self.speed_weight + self.role_weight
    }
}

/// Condition tags that end a run. Interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminationConfig {
    pub success: Vec<String>,
    pub failure: Vec<String>,
    pub stalemate: Vec<String>,
}

/// A `min`/`max` pair. Valid only when `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// True when `min < max`.
    pub fn is_ordered(&self) -> bool {
        self.min < self.max
    }

    /// Half-open containment: `min <= value < max`.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value < self.max
    }
}

impl Range<f64> {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

// ============================================================================
// Typed views of enum-like string fields
// ============================================================================

/// Error returned when a string is not a member of its enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of: {}", .allowed.join(", "))]
pub struct UnknownVariant {
    pub value: String,
    pub allowed: &'static [&'static str],
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted spelling, in declaration order.
            pub const ALL: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        value: s.to_string(),
                        allowed: Self::ALL,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Swarm formation.
    pub enum Formation {
        Distributed => "distributed",
        Concentrated => "concentrated",
        Waves => "waves",
    }
}

string_enum! {
    /// Distribution of autonomy levels across the swarm.
    pub enum Autonomy {
        Low => "low",
        Mixed => "mixed",
        High => "high",
    }
}

string_enum! {
    /// Defender placement pattern.
    pub enum Placement {
        Ring => "ring",
        Cluster => "cluster",
        Line => "line",
    }
}

string_enum! {
    /// Target selection rule for defenders.
    pub enum EngagementRule {
        Closest => "closest",
        HighestThreat => "highest_threat",
        Distributed => "distributed",
    }
}

string_enum! {
    /// Console log level.
    pub enum LogLevel {
        Trace => "trace",
        Debug => "debug",
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

string_enum! {
    /// After-action report format.
    pub enum AarFormat {
        Json => "json",
        Markdown => "markdown",
    }
}

impl SwarmBehaviorConfig {
    pub fn formation(&self) -> Result<Formation, UnknownVariant> {
        self.formation.parse()
    }

    pub fn autonomy(&self) -> Result<Autonomy, UnknownVariant> {
        self.autonomy.parse()
    }
}

impl DefenseBehaviorConfig {
    pub fn placement(&self) -> Result<Placement, UnknownVariant> {
        self.placement.parse()
    }

    pub fn engagement_rule(&self) -> Result<EngagementRule, UnknownVariant> {
        self.engagement_rule.parse()
    }
}

impl LoggingConfig {
    pub fn console_level(&self) -> Result<LogLevel, UnknownVariant> {
        self.console_level.parse()
    }

    pub fn aar_format(&self) -> Result<AarFormat, UnknownVariant> {
        self.aar_format.parse()
    }
}

impl SimConfig {
    /// Check every invariant. See [`super::validation::validate`].
    pub fn validate(&self) -> Result<(), super::ValidationError> {
        super::validation::validate(self)
    }
}
