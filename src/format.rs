//! Output formatting for resolved configurations.

use crate::config::SimConfig;
use crate::config::duration::format_duration;
use crate::config::{Range, Resolved};

/// Output format for rendering a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "summary" => Some(OutputFormat::Text),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Render `config` in the requested format.
pub fn render(config: &SimConfig, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_summary(config),
        OutputFormat::Yaml => to_yaml(config)?,
        OutputFormat::Json => to_json(config)?,
    })
}

/// Serialize to YAML in the same shape the file loader reads.
pub fn to_yaml(config: &SimConfig) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(config)
}

pub fn to_json(config: &SimConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(config)
}

fn range(r: &Range<f64>) -> String {
    format!("{} - {}", r.min, r.max)
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

/// Human-readable multi-line summary of a configuration.
pub fn render_summary(config: &SimConfig) -> String {
    let mut out = String::new();
    let sim = &config.simulation;
    let numeric = &config.numeric_defaults;
    let swarm = &config.swarm_behavior;
    let defense = &config.defense_behavior;
    let engagement = &config.engagement;
    let priority = &config.target_priority;

    out.push_str(&format!("## Simulation: {}\n", sim.name));
    if !sim.description.is_empty() {
        out.push_str(&format!("{}\n", sim.description));
    }
    out.push_str(&format!("- **organization**: {}\n", sim.organization_id));
    out.push_str(&format!(
        "- **tick**: {} (max run {})\n",
        format_duration(sim.update_interval),
        format_duration(sim.max_duration)
    ));
    if sim.random_seed != 0 {
        out.push_str(&format!("- **seed**: {}\n", sim.random_seed));
    }

    out.push_str("\n### Scenario\n");
    out.push_str(&format!("- **defenders**: {}\n", numeric.defender_count));
    out.push_str(&format!("- **threats**: {}\n", numeric.threat_count));
    out.push_str(&format!(
        "- **engagement mix**: {:.0}% kinetic\n",
        numeric.engagement_mix * 100.0
    ));
    out.push_str(&format!(
        "- **center**: {:.4}, {:.4} @ {}m\n",
        numeric.center.latitude, numeric.center.longitude, numeric.center.altitude
    ));

    out.push_str("\n### Swarm\n");
    out.push_str(&format!("- **formation**: {}\n", swarm.formation));
    if swarm.wave_count > 0 {
        out.push_str(&format!(
            "- **waves**: {} every {}\n",
            swarm.wave_count,
            format_duration(swarm.wave_delay)
        ));
    }
    out.push_str(&format!("- **autonomy**: {}\n", swarm.autonomy));
    out.push_str(&format!(
        "- **evasion probability**: {}\n",
        swarm.evasion_probability
    ));
    out.push_str(&format!("- **speed**: {} m/s\n", range(&swarm.speed_range)));

    out.push_str("\n### Defense\n");
    out.push_str(&format!("- **placement**: {}\n", defense.placement));
    out.push_str(&format!("- **engagement rule**: {}\n", defense.engagement_rule));
    out.push_str(&format!("- **kinetic ratio**: {}\n", defense.kinetic_ratio));
    out.push_str(&format!(
        "- **difficulty modifier**: {}\n",
        defense.success_rate_modifier
    ));
    out.push_str(&format!(
        "- **radii**: detect {}m / engage {}m\n",
        defense.detection_radius, defense.engagement_radius
    ));
    out.push_str(&format!(
        "- **cooldowns**: kinetic {}s, electronic {}s\n",
        range(&defense.kinetic_cooldown),
        range(&defense.electronic_cooldown)
    ));

    out.push_str("\n### Engagement\n");
    out.push_str(&format!(
        "- **success rates**: kinetic {}, electronic {}\n",
        range(&engagement.kinetic_success_rate),
        range(&engagement.electronic_success_rate)
    ));
    out.push_str(&format!("- **ammo**: {}\n", engagement.ammo_capacity));
    out.push_str(&format!(
        "- **jamming threshold**: {}\n",
        engagement.jamming_threshold
    ));
    out.push_str(&format!(
        "- **priority weights**: distance {}, speed {}, role {}\n",
        priority.distance_weight, priority.speed_weight, priority.role_weight
    ));
    if !priority.role_multipliers.is_empty() {
        let roles: Vec<String> = priority
            .role_multipliers
            .iter()
            .map(|(role, m)| format!("{}={}", role, m))
            .collect();
        out.push_str(&format!("- **role multipliers**: {}\n", roles.join(", ")));
    }

    out.push_str("\n### Termination\n");
    for (label, tags) in [
        ("success", &config.termination.success),
        ("failure", &config.termination.failure),
        ("stalemate", &config.termination.stalemate),
    ] {
        if !tags.is_empty() {
            out.push_str(&format!("- **{}**: {}\n", label, tags.join(", ")));
        }
    }

    out.push_str("\n### Logging\n");
    out.push_str(&format!("- **console level**: {}\n", config.logging.console_level));
    if config.logging.enable_aar {
        out.push_str(&format!(
            "- **after-action report**: {} ({})\n",
            config.logging.aar_output_path, config.logging.aar_format
        ));
    } else {
        out.push_str("- **after-action report**: disabled\n");
    }
    out.push_str(&format!(
        "- **verbose**: {}\n",
        yes_no(config.advanced.verbose_logging)
    ));

    out
}

/// Where the resolved values came from, for `--explain` style output.
pub fn render_provenance(resolved: &Resolved) -> String {
    let mut out = String::new();
    out.push_str("### Sources\n");
    match resolved.source() {
        Some(path) => {
            out.push_str(&format!("- **file**: {}\n", path.display()));
            for field in resolved.file_fields() {
                out.push_str(&format!("  - `{}`\n", field));
            }
        }
        None => out.push_str("- **file**: none (defaults)\n"),
    }

    let env = resolved.env_report();
    for var in &env.applied {
        out.push_str(&format!("- **env** `{}` -> `{}`\n", var, var.field()));
    }
    for skip in &env.skipped {
        out.push_str(&format!(
            "- **env ignored** `{}={}`: {}\n",
            skip.var, skip.value, skip.reason
        ));
    }
    for key in resolved.overrides_applied() {
        out.push_str(&format!("- **override** `{}`\n", key));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigResolver, Overrides};
    use std::collections::HashMap;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("YAML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_str("yml"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("summary"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("toml"), None);
    }

    #[test]
    fn test_summary_mentions_key_values() {
        let summary = render_summary(&SimConfig::defaults());
        assert!(summary.starts_with("## Simulation: swarm-defense-sim\n"));
        assert!(summary.contains("- **defenders**: 5\n"));
        assert!(summary.contains("- **threats**: 20\n"));
        assert!(summary.contains("- **engagement mix**: 70% kinetic\n"));
        assert!(summary.contains("- **formation**: distributed\n"));
        assert!(summary.contains("- **waves**: 3 every 45s\n"));
        assert!(summary.contains("- **after-action report**: ./reports (json)\n"));
    }

    #[test]
    fn test_summary_when_aar_disabled_and_no_waves() {
        let mut config = SimConfig::defaults();
        config.logging.enable_aar = false;
        config.swarm_behavior.wave_count = 0;
        let summary = render_summary(&config);
        assert!(summary.contains("- **after-action report**: disabled\n"));
        assert!(!summary.contains("**waves**"));
    }

    #[test]
    fn test_yaml_dump_reloads_identically() {
        let mut config = SimConfig::defaults();
        config.swarm_behavior.wave_delay = std::time::Duration::from_secs(150);
        config.simulation.update_interval = std::time::Duration::new(1, 500_000);
        let yaml = to_yaml(&config).unwrap();
        assert!(yaml.contains("wave_delay: 2m30s"));
        assert!(yaml.contains("update_interval: 1s500us"));
        let back: SimConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_dump_reloads_identically() {
        let mut config = SimConfig::defaults();
        config.performance.tick_budget = std::time::Duration::new(2, 7);
        let json = to_json(&config).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_provenance_lists_overrides_and_env() {
        let env: HashMap<String, String> = [("THREAT_COUNT".to_string(), "30".to_string())]
            .into_iter()
            .collect();
        let resolved = ConfigResolver::with_env(env)
            .resolve_with(None, &Overrides::new().defender_count(15).build())
            .unwrap();
        let text = render_provenance(&resolved);
        assert!(text.contains("- **file**: none (defaults)\n"));
        assert!(text.contains("`THREAT_COUNT` -> `numeric_defaults.threat_count`"));
        assert!(text.contains("- **override** `defender_count`\n"));
    }
}
