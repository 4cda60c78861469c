//! Layered configuration for simulation runs.
//!
//! Resolves one `SimConfig` from four sources, lowest priority first:
//! 1. **Defaults** - `SimConfig::defaults()`
//! 2. **File** - a YAML file, merged field-by-field (missing file = no-op)
//! 3. **Environment** - a fixed set of variables (see [`EnvVar`])
//! 4. **Overrides** - caller-supplied values (see [`OverrideKey`])
//!
//! The result is validated before it is returned.
//!
//! ## Environment Variables
//! - `ORGANIZATION_ID` - `simulation.organization_id`
//! - `DEFENDER_COUNT`, `THREAT_COUNT` - `numeric_defaults` counts
//! - `CENTER_LAT`, `CENTER_LON` - `numeric_defaults.center`
//! - `ENGAGEMENT_MIX` - `numeric_defaults.engagement_mix`
//! - `FORMATION_TYPE` - `swarm_behavior.formation`
//! - `PLACEMENT_PATTERN` - `defense_behavior.placement`
//! - `LOG_LEVEL`, `ENABLE_AAR`, `AAR_OUTPUT_PATH` - `logging`
//! - `VERBOSE_LOGGING` - `advanced.verbose_logging`
//! - `SWARM_SIM_CONFIG` - config file path when none is given explicitly

mod defaults;
pub mod duration;
pub mod env;
pub mod files;
mod loader;
mod merge;
pub mod overrides;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_DEFENDER_COUNT, DEFAULT_ENGAGEMENT_MIX, DEFAULT_SIM_NAME, DEFAULT_THREAT_COUNT,
    DEFAULT_WAVE_DELAY,
};
pub use env::{EnvReport, EnvSkip, EnvSource, EnvVar, ProcessEnv, apply_env};
pub use files::{ConfigPaths, load_file, merge_file};
pub use loader::{
    ConfigResolver, Resolved, Stage, load_defaults, load_from_path, load_with_overrides,
};
pub use merge::overlay_value;
pub use overrides::{Override, OverrideKey, OverrideMap, OverrideValue, Overrides, ValueKind};
pub use types::*;
pub use validation::{ValidationError, validate};
