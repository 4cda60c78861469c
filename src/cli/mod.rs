//! CLI command definitions for swarm-sim-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! Global flags double as caller overrides, the highest-priority
//! configuration source.

use crate::config::{OverrideMap, OverrideValue};
use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    OutputFormat::from_str(s)
        .ok_or_else(|| format!("unknown format '{}' (expected text, yaml, or json)", s))
}

/// Resolve and inspect swarm-defense simulation configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: $SWARM_SIM_CONFIG, ./swarm-sim.yaml, ~/.swarm-sim/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Enable verbose logging (sets advanced.verbose_logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of defenders
    #[arg(long, global = true)]
    pub defenders: Option<i32>,

    /// Number of threats
    #[arg(long, global = true)]
    pub threats: Option<i32>,

    /// Fraction of kinetic defenders, 0.0 to 1.0
    #[arg(long, global = true)]
    pub engagement_mix: Option<f64>,

    /// Swarm formation: distributed, concentrated, waves
    #[arg(long, global = true)]
    pub formation: Option<String>,

    /// Defender placement: ring, cluster, line
    #[arg(long, global = true)]
    pub placement: Option<String>,

    /// Number of attack waves
    #[arg(long, global = true)]
    pub waves: Option<i32>,

    /// Delay between waves, e.g. 45s or 1m30s
    #[arg(long, global = true)]
    pub wave_delay: Option<String>,

    /// Swarm autonomy: low, mixed, high
    #[arg(long, global = true)]
    pub autonomy: Option<String>,

    /// Threat evasion probability, 0.0 to 1.0
    #[arg(long, global = true)]
    pub evasion: Option<f64>,

    /// Defender success rate modifier
    #[arg(long, global = true)]
    pub difficulty: Option<f64>,

    /// Enable or disable after-action reports
    #[arg(long, global = true)]
    pub aar: Option<bool>,

    /// Console log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved configuration (default if no subcommand given)
    Show {
        /// Output format: text, yaml, or json
        #[arg(short, long, default_value = "text", value_parser = parse_output_format)]
        format: OutputFormat,

        /// Also list which file, variables, and overrides supplied values
        #[arg(long)]
        explain: bool,
    },

    /// Resolve and validate, printing only the outcome
    Validate,

    /// Print the built-in defaults as YAML
    Defaults,
}

impl Cli {
    /// Overrides supplied on the command line, keyed by override name.
    pub fn override_map(&self) -> OverrideMap {
        let mut map = OverrideMap::new();
        let mut put = |key: &str, value: Option<OverrideValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };
        put("defender_count", self.defenders.map(|v| i64::from(v).into()));
        put("threat_count", self.threats.map(|v| i64::from(v).into()));
        put("engagement_mix", self.engagement_mix.map(Into::into));
        put("formation", self.formation.clone().map(Into::into));
        put("placement", self.placement.clone().map(Into::into));
        put("wave_count", self.waves.map(|v| i64::from(v).into()));
        put("wave_delay", self.wave_delay.clone().map(Into::into));
        put("autonomy", self.autonomy.clone().map(Into::into));
        put("evasion_probability", self.evasion.map(Into::into));
        put("difficulty", self.difficulty.map(Into::into));
        put("enable_aar", self.aar.map(Into::into));
        put("log_level", self.log_level.clone().map(Into::into));
        if self.verbose {
            put("verbose", Some(true.into()));
        }
        map
    }
}
