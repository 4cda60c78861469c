//! Built-in defaults.
//!
//! Every section's `Default` impl lives here so the full set of literal
//! values can be read in one place. `SimConfig::defaults()` builds a fresh,
//! independent instance on every call; nothing is cached process-wide.

use super::types::*;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_SIM_NAME: &str = "swarm-defense-sim";
pub const DEFAULT_DEFENDER_COUNT: i32 = 5;
pub const DEFAULT_THREAT_COUNT: i32 = 20;
pub const DEFAULT_ENGAGEMENT_MIX: f64 = 0.7;
pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_secs(45);

impl SimConfig {
    /// A fully populated config that passes validation as-is.
    pub fn defaults() -> Self {
        Self::default()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            performance: PerformanceConfig::default(),
            swarm_behavior: SwarmBehaviorConfig::default(),
            defense_behavior: DefenseBehaviorConfig::default(),
            logging: LoggingConfig::default(),
            numeric_defaults: NumericDefaults::default(),
            advanced: AdvancedConfig::default(),
            engagement: EngagementConfig::default(),
            target_priority: TargetPriorityConfig::default(),
            termination: TerminationConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SIM_NAME.to_string(),
            description: "Counter-swarm air defense simulation".to_string(),
            organization_id: "default".to_string(),
            update_interval: Duration::from_millis(100),
            max_duration: Duration::from_secs(600), // 10 minutes
            random_seed: 0,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_entities: 1000,
            worker_threads: 4,
            spatial_grid_cell: 250.0,
            tick_budget: Duration::from_millis(50),
        }
    }
}

impl Default for SwarmBehaviorConfig {
    fn default() -> Self {
        Self {
            formation: Formation::Distributed.as_str().to_string(),
            wave_count: 3,
            wave_delay: DEFAULT_WAVE_DELAY,
            autonomy: Autonomy::Mixed.as_str().to_string(),
            evasion_probability: 0.3,
            speed_range: Range::new(20.0, 60.0),
        }
    }
}

impl Default for DefenseBehaviorConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Ring.as_str().to_string(),
            engagement_rule: EngagementRule::Closest.as_str().to_string(),
            kinetic_ratio: 0.6,
            success_rate_modifier: 1.0,
            detection_radius: 5000.0,
            engagement_radius: 2000.0,
            kinetic_cooldown: Range::new(2.0, 5.0),
            electronic_cooldown: Range::new(1.0, 3.0),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: LogLevel::Info.as_str().to_string(),
            enable_aar: true,
            aar_output_path: "./reports".to_string(),
            aar_format: AarFormat::Json.as_str().to_string(),
            log_engagements: true,
        }
    }
}

impl Default for NumericDefaults {
    fn default() -> Self {
        Self {
            defender_count: DEFAULT_DEFENDER_COUNT,
            threat_count: DEFAULT_THREAT_COUNT,
            engagement_mix: DEFAULT_ENGAGEMENT_MIX,
            center: GeoPoint::default(),
        }
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self {
            latitude: 38.8977,
            longitude: -77.0365,
            altitude: 0.0,
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            deterministic: false,
            debug_overlay: false,
            profile_performance: false,
        }
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            kinetic_success_rate: Range::new(0.6, 0.9),
            electronic_success_rate: Range::new(0.4, 0.8),
            ammo_capacity: 20,
            jamming_threshold: 0.5,
        }
    }
}

impl Default for TargetPriorityConfig {
    fn default() -> Self {
        Self {
            distance_weight: 0.5,
            speed_weight: 0.3,
            role_weight: 0.2,
            role_multipliers: default_role_multipliers(),
        }
    }
}

fn default_role_multipliers() -> BTreeMap<String, f64> {
    [
        ("attacker", 1.5),
        ("decoy", 0.5),
        ("jammer", 1.2),
        ("scout", 0.8),
    ]
    .into_iter()
    .map(|(role, m)| (role.to_string(), m))
    .collect()
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            success: vec!["all_threats_neutralized".to_string()],
            failure: vec![
                "protected_asset_destroyed".to_string(),
                "defenders_depleted".to_string(),
            ],
            stalemate: vec!["max_duration_reached".to_string()],
        }
    }
}
