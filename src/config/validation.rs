//! Semantic validation for a resolved configuration.
//!
//! A config that deserialized cleanly can still be unusable: a zero tick
//! interval, a probability of 1.5, a speed range with `min > max`. This module
//! is the only gate that certifies a config for use. Checks run in a fixed
//! order (section order of `SimConfig`) and stop at the first violation, so
//! the same bad input always produces the same message.

use super::types::*;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A single violated invariant. Every variant names the dotted field path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: String },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: String },

    #[error("{field} must be in [0, 1] (got {value:.4})")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("{field}: min ({min}) must be less than max ({max})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be one of [{allowed}] (got '{value}')")]
    UnknownVariant {
        field: &'static str,
        value: String,
        allowed: String,
    },

    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("target_priority weights must sum to a positive value (got {sum:.4})")]
    WeightSum { sum: f64 },
}

impl ValidationError {
    /// Dotted path of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::NonPositive { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::OutOfUnitRange { field, .. }
            | ValidationError::InvertedRange { field, .. }
            | ValidationError::NotFinite { field, .. }
            | ValidationError::UnknownVariant { field, .. } => field,
            ValidationError::WeightSum { .. } => "target_priority",
        }
    }
}

/// Validate a fully resolved configuration. Never mutates its argument.
pub fn validate(config: &SimConfig) -> Result<(), ValidationError> {
    validate_simulation(&config.simulation)?;
    validate_performance(&config.performance)?;
    validate_swarm(&config.swarm_behavior)?;
    validate_defense(&config.defense_behavior)?;
    validate_logging(&config.logging)?;
    validate_numeric(&config.numeric_defaults)?;
    validate_engagement(&config.engagement)?;
    validate_target_priority(&config.target_priority)?;
    Ok(())
}

fn validate_simulation(sim: &SimulationConfig) -> Result<(), ValidationError> {
    if sim.name.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: "simulation.name",
        });
    }
    positive_duration("simulation.update_interval", sim.update_interval)?;
    positive_duration("simulation.max_duration", sim.max_duration)?;
    Ok(())
}

fn validate_performance(perf: &PerformanceConfig) -> Result<(), ValidationError> {
    positive_count("performance.max_entities", perf.max_entities)?;
    positive_count("performance.worker_threads", perf.worker_threads)?;
    positive_f64("performance.spatial_grid_cell", perf.spatial_grid_cell)?;
    positive_duration("performance.tick_budget", perf.tick_budget)?;
    Ok(())
}

fn validate_swarm(swarm: &SwarmBehaviorConfig) -> Result<(), ValidationError> {
    member::<Formation>("swarm_behavior.formation", &swarm.formation)?;
    if swarm.wave_count < 0 {
        return Err(ValidationError::Negative {
            field: "swarm_behavior.wave_count",
            value: swarm.wave_count.to_string(),
        });
    }
    // wave_delay is a Duration and cannot be negative.
    member::<Autonomy>("swarm_behavior.autonomy", &swarm.autonomy)?;
    unit_interval(
        "swarm_behavior.evasion_probability",
        swarm.evasion_probability,
    )?;
    ordered("swarm_behavior.speed_range", &swarm.speed_range)?;
    Ok(())
}

fn validate_defense(defense: &DefenseBehaviorConfig) -> Result<(), ValidationError> {
    member::<Placement>("defense_behavior.placement", &defense.placement)?;
    member::<EngagementRule>("defense_behavior.engagement_rule", &defense.engagement_rule)?;
    unit_interval("defense_behavior.kinetic_ratio", defense.kinetic_ratio)?;
    positive_f64("defense_behavior.detection_radius", defense.detection_radius)?;
    positive_f64(
        "defense_behavior.engagement_radius",
        defense.engagement_radius,
    )?;
    ordered("defense_behavior.kinetic_cooldown", &defense.kinetic_cooldown)?;
    ordered(
        "defense_behavior.electronic_cooldown",
        &defense.electronic_cooldown,
    )?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ValidationError> {
    member::<LogLevel>("logging.console_level", &logging.console_level)?;
    member::<AarFormat>("logging.aar_format", &logging.aar_format)?;
    Ok(())
}

fn validate_numeric(numeric: &NumericDefaults) -> Result<(), ValidationError> {
    positive_count("numeric_defaults.defender_count", numeric.defender_count)?;
    positive_count("numeric_defaults.threat_count", numeric.threat_count)?;
    unit_interval("numeric_defaults.engagement_mix", numeric.engagement_mix)?;
    // Any finite position is accepted.
    finite("numeric_defaults.center.latitude", numeric.center.latitude)?;
    finite("numeric_defaults.center.longitude", numeric.center.longitude)?;
    finite("numeric_defaults.center.altitude", numeric.center.altitude)?;
    Ok(())
}

fn validate_engagement(eng: &EngagementConfig) -> Result<(), ValidationError> {
    unit_range("engagement.kinetic_success_rate", &eng.kinetic_success_rate)?;
    unit_range(
        "engagement.electronic_success_rate",
        &eng.electronic_success_rate,
    )?;
    positive_count("engagement.ammo_capacity", eng.ammo_capacity)?;
    unit_interval("engagement.jamming_threshold", eng.jamming_threshold)?;
    Ok(())
}

fn validate_target_priority(tp: &TargetPriorityConfig) -> Result<(), ValidationError> {
    let sum = tp.weight_sum();
    // NaN fails this comparison too.
    if !(sum > 0.0) {
        return Err(ValidationError::WeightSum { sum });
    }
    Ok(())
}

// ============================================================================
// Primitive checks
// ============================================================================

fn positive_count(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(non_positive(field, value));
    }
    Ok(())
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    Ok(())
}

fn positive_f64(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !(value > 0.0) {
        return Err(non_positive(field, value));
    }
    Ok(())
}

fn positive_duration(field: &'static str, value: Duration) -> Result<(), ValidationError> {
    if value.is_zero() {
        return Err(non_positive(field, format!("{:?}", value)));
    }
    Ok(())
}

fn non_positive(field: &'static str, value: impl Display) -> ValidationError {
    ValidationError::NonPositive {
        field,
        value: value.to_string(),
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::OutOfUnitRange { field, value });
    }
    Ok(())
}

fn ordered(field: &'static str, range: &Range<f64>) -> Result<(), ValidationError> {
    if !range.is_ordered() {
        return Err(ValidationError::InvertedRange {
            field,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

/// An ordered range whose bounds are both probabilities.
fn unit_range(field: &'static str, range: &Range<f64>) -> Result<(), ValidationError> {
    ordered(field, range)?;
    unit_interval(field, range.min)?;
    unit_interval(field, range.max)?;
    Ok(())
}

fn member<T>(field: &'static str, value: &str) -> Result<(), ValidationError>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse::<T>()
        .map(|_| ())
        .map_err(|e| ValidationError::UnknownVariant {
            field,
            value: e.value,
            allowed: e.allowed.join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> SimConfig {
        SimConfig::defaults()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate(&defaults()), Ok(()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut config = defaults();
        config.simulation.name = "   ".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(err.field(), "simulation.name");
        assert_eq!(err.to_string(), "simulation.name must not be empty");
    }

    #[test]
    fn test_zero_update_interval_rejected() {
        let mut config = defaults();
        config.simulation.update_interval = Duration::ZERO;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.field(), "simulation.update_interval");
    }

    #[test]
    fn test_non_positive_counts_rejected() {
        let mut config = defaults();
        config.numeric_defaults.defender_count = 0;
        let err = validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "numeric_defaults.defender_count must be positive (got 0)"
        );

        let mut config = defaults();
        config.numeric_defaults.threat_count = -4;
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "numeric_defaults.threat_count"
        );

        let mut config = defaults();
        config.engagement.ammo_capacity = 0;
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "engagement.ammo_capacity"
        );
    }

    #[test]
    fn test_negative_wave_count_rejected_zero_allowed() {
        let mut config = defaults();
        config.swarm_behavior.wave_count = 0;
        assert!(validate(&config).is_ok());

        config.swarm_behavior.wave_count = -1;
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "swarm_behavior.wave_count"
        );
    }

    #[test]
    fn test_probabilities_out_of_range_rejected() {
        let mut config = defaults();
        config.swarm_behavior.evasion_probability = 1.5;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.field(), "swarm_behavior.evasion_probability");
        assert!(err.to_string().contains("must be in [0, 1]"));

        let mut config = defaults();
        config.numeric_defaults.engagement_mix = -0.1;
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "numeric_defaults.engagement_mix"
        );

        let mut config = defaults();
        config.engagement.jamming_threshold = f64::NAN;
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "engagement.jamming_threshold"
        );
    }

    #[test]
    fn test_probability_bounds_inclusive() {
        let mut config = defaults();
        config.swarm_behavior.evasion_probability = 0.0;
        config.defense_behavior.kinetic_ratio = 1.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_degenerate_and_inverted_ranges_rejected() {
        let mut config = defaults();
        config.swarm_behavior.speed_range = Range::new(40.0, 40.0);
        let err = validate(&config).unwrap_err();
        assert_eq!(err.field(), "swarm_behavior.speed_range");

        let mut config = defaults();
        config.defense_behavior.electronic_cooldown = Range::new(3.0, 1.0);
        assert_eq!(
            validate(&config).unwrap_err().to_string(),
            "defense_behavior.electronic_cooldown: min (3) must be less than max (1)"
        );
    }

    #[test]
    fn test_success_rate_range_must_be_probabilities() {
        let mut config = defaults();
        config.engagement.kinetic_success_rate = Range::new(0.8, 1.2);
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfUnitRange { .. }));
        assert_eq!(err.field(), "engagement.kinetic_success_rate");
    }

    #[test]
    fn test_weight_sum_must_be_positive() {
        let mut config = defaults();
        config.target_priority.distance_weight = 0.0;
        config.target_priority.speed_weight = 0.0;
        config.target_priority.role_weight = 0.0;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::WeightSum { .. })
        ));

        // Individual weights are unbounded; only the sum matters.
        config.target_priority.distance_weight = -1.0;
        config.target_priority.speed_weight = 2.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_enum_values_rejected() {
        let mut config = defaults();
        config.swarm_behavior.formation = "spiral".to_string();
        let err = validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "swarm_behavior.formation must be one of [distributed, concentrated, waves] (got 'spiral')"
        );

        let mut config = defaults();
        config.defense_behavior.placement = "grid".to_string();
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "defense_behavior.placement"
        );

        let mut config = defaults();
        config.logging.console_level = "loud".to_string();
        assert_eq!(
            validate(&config).unwrap_err().field(),
            "logging.console_level"
        );
    }

    #[test]
    fn test_center_accepts_any_finite_position() {
        let mut config = defaults();
        config.numeric_defaults.center.latitude = 123.0;
        config.numeric_defaults.center.altitude = -400.0;
        assert!(validate(&config).is_ok());

        config.numeric_defaults.center.latitude = f64::NAN;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.field(), "numeric_defaults.center.latitude");
        assert!(matches!(err, ValidationError::NotFinite { .. }));

        let mut config = defaults();
        config.numeric_defaults.center.longitude = f64::INFINITY;
        assert_eq!(
            validate(&config).unwrap_err().to_string(),
            "numeric_defaults.center.longitude must be a finite number (got inf)"
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let mut config = defaults();
        config.simulation.name.clear();
        config.numeric_defaults.defender_count = 0;
        assert_eq!(validate(&config).unwrap_err().field(), "simulation.name");
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let mut config = defaults();
        config.swarm_behavior.evasion_probability = 2.0;
        let before = config.clone();
        let _ = validate(&config);
        assert_eq!(config, before);
    }
}
