//! Configuration resolution pipeline.
//!
//! Sources are applied in a fixed order, each overriding the last:
//! defaults, config file, environment, caller overrides. The result is then
//! validated. A resolution yields one validated config or one error; a
//! partially built config is never handed out.

use super::env::{EnvReport, EnvSource, ProcessEnv, apply_env};
use super::files::merge_file;
use super::overrides::{self, Override, OverrideKey, OverrideMap};
use super::types::SimConfig;
use super::validation::validate;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolution stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Defaults = 0,
    File = 1,
    Environment = 2,
    Overrides = 3,
    Validate = 4,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Defaults => write!(f, "defaults"),
            Stage::File => write!(f, "file"),
            Stage::Environment => write!(f, "environment"),
            Stage::Overrides => write!(f, "overrides"),
            Stage::Validate => write!(f, "validate"),
        }
    }
}

/// A validated configuration plus a record of where its values came from.
#[derive(Debug, Clone)]
pub struct Resolved {
    config: SimConfig,
    /// Config file that was merged, if any.
    source: Option<PathBuf>,
    /// Dotted paths the file set.
    file_fields: Vec<String>,
    env: EnvReport,
    overrides_applied: Vec<OverrideKey>,
}

impl Resolved {
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Consume the resolution and return the configuration.
    pub fn into_config(self) -> SimConfig {
        self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn file_fields(&self) -> &[String] {
        &self.file_fields
    }

    pub fn env_report(&self) -> &EnvReport {
        &self.env
    }

    pub fn overrides_applied(&self) -> &[OverrideKey] {
        &self.overrides_applied
    }
}

/// Runs the resolution pipeline against an injected environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver<E = ProcessEnv> {
    env: E,
}

impl ConfigResolver<ProcessEnv> {
    /// Resolver reading the real process environment.
    pub fn new() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: EnvSource> ConfigResolver<E> {
    /// Resolver reading variables from `env` instead of the process.
    pub fn with_env(env: E) -> Self {
        Self { env }
    }

    /// Built-in defaults, validated. The environment is not consulted.
    pub fn resolve_defaults(&self) -> ConfigResult<Resolved> {
        debug!(stage = %Stage::Defaults, "Resolving configuration");
        let config = SimConfig::defaults();
        finish(Resolved {
            config,
            source: None,
            file_fields: Vec::new(),
            env: EnvReport::default(),
            overrides_applied: Vec::new(),
        })
    }

    /// Defaults, then `path` if it exists, then the environment.
    pub fn resolve_file(&self, path: &Path) -> ConfigResult<Resolved> {
        self.resolve_with(Some(path), &[])
    }

    /// Full pipeline with a dynamically typed override map.
    ///
    /// The map is coerced at the overrides stage, so a file error is
    /// reported ahead of a mistyped override. A recognised key with the
    /// wrong type fails with `InvalidOverrideType`.
    pub fn resolve(&self, path: Option<&Path>, overrides: &OverrideMap) -> ConfigResult<Resolved> {
        let layered = self.layer_sources(path)?;
        let overrides = overrides::parse_map(overrides)?;
        layered.finish_with(&overrides)
    }

    /// Full pipeline with typed overrides.
    pub fn resolve_with(
        &self,
        path: Option<&Path>,
        overrides: &[Override],
    ) -> ConfigResult<Resolved> {
        self.layer_sources(path)?.finish_with(overrides)
    }

    /// Defaults, then the file, then the environment.
    fn layer_sources(&self, path: Option<&Path>) -> ConfigResult<Layered> {
        debug!(stage = %Stage::Defaults, "Resolving configuration");
        let mut config = SimConfig::defaults();

        let mut source = None;
        let mut file_fields = Vec::new();
        if let Some(path) = path {
            debug!(stage = %Stage::File, path = %path.display(), "Resolving configuration");
            match merge_file(config.clone(), path) {
                Ok(merged) => {
                    info!("Loaded config from {}", path.display());
                    config = merged.config;
                    file_fields = merged.fields;
                    source = Some(path.to_path_buf());
                }
                Err(ConfigError::FileNotFound { .. }) => {
                    info!("Config file {} not found, using defaults", path.display());
                }
                Err(e) => return Err(e),
            }
        }

        debug!(stage = %Stage::Environment, "Resolving configuration");
        let env = apply_env(&mut config, &self.env);

        Ok(Layered {
            config,
            source,
            file_fields,
            env,
        })
    }
}

/// Config after the file and environment stages, before overrides.
struct Layered {
    config: SimConfig,
    source: Option<PathBuf>,
    file_fields: Vec<String>,
    env: EnvReport,
}

impl Layered {
    fn finish_with(mut self, overrides: &[Override]) -> ConfigResult<Resolved> {
        debug!(stage = %Stage::Overrides, count = overrides.len(), "Resolving configuration");
        overrides::apply(&mut self.config, overrides);

        finish(Resolved {
            config: self.config,
            source: self.source,
            file_fields: self.file_fields,
            env: self.env,
            overrides_applied: overrides.iter().map(Override::key).collect(),
        })
    }
}

fn finish(resolved: Resolved) -> ConfigResult<Resolved> {
    debug!(stage = %Stage::Validate, "Resolving configuration");
    validate(&resolved.config)?;
    Ok(resolved)
}

/// Validated built-in defaults.
pub fn load_defaults() -> ConfigResult<SimConfig> {
    ConfigResolver::new()
        .resolve_defaults()
        .map(Resolved::into_config)
}

/// Defaults, then the file at `path` if it exists, then the process environment.
pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<SimConfig> {
    ConfigResolver::new()
        .resolve_file(path.as_ref())
        .map(Resolved::into_config)
}

/// Full pipeline against the process environment.
pub fn load_with_overrides(
    path: Option<&Path>,
    overrides: &OverrideMap,
) -> ConfigResult<SimConfig> {
    ConfigResolver::new()
        .resolve(path, overrides)
        .map(Resolved::into_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::overrides::{OverrideValue, Overrides};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn resolver(pairs: &[(&str, &str)]) -> ConfigResolver<HashMap<String, String>> {
        ConfigResolver::with_env(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_resolve_defaults_ignores_environment() {
        let resolved = resolver(&[("DEFENDER_COUNT", "9")])
            .resolve_defaults()
            .unwrap();
        assert_eq!(resolved.config(), &SimConfig::defaults());
        assert!(resolved.source().is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let resolved = resolver(&[])
            .resolve_file(&temp.path().join("absent.yaml"))
            .unwrap();
        assert_eq!(resolved.config(), &SimConfig::defaults());
        assert!(resolved.source().is_none());
    }

    #[test]
    fn test_precedence_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.yaml");
        std::fs::write(
            &path,
            "numeric_defaults:\n  defender_count: 7\n  threat_count: 50\n  engagement_mix: 0.4\n",
        )
        .unwrap();

        let resolved = resolver(&[("THREAT_COUNT", "30"), ("ENGAGEMENT_MIX", "0.5")])
            .resolve_with(Some(&path), &Overrides::new().engagement_mix(0.9).build())
            .unwrap();
        let numeric = &resolved.config().numeric_defaults;
        assert_eq!(numeric.defender_count, 7); // file
        assert_eq!(numeric.threat_count, 30); // env over file
        assert!((numeric.engagement_mix - 0.9).abs() < f64::EPSILON); // override over env
        assert_eq!(resolved.source(), Some(path.as_path()));
        assert_eq!(resolved.overrides_applied(), &[OverrideKey::EngagementMix]);
    }

    #[test]
    fn test_malformed_file_aborts_before_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "simulation: {name: [\n").unwrap();

        let err = resolver(&[("THREAT_COUNT", "30")])
            .resolve_with(Some(&path), &Overrides::new().defender_count(3).build())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedFile { .. }));
    }

    #[test]
    fn test_invalid_override_type_is_fatal() {
        let mut map = OverrideMap::new();
        map.insert("verbose".to_string(), OverrideValue::Str("yes".into()));
        let err = resolver(&[]).resolve(None, &map).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverrideType { .. }));
    }

    #[test]
    fn test_malformed_file_reported_before_override_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "numeric_defaults: [5, 20\n").unwrap();

        let mut map = OverrideMap::new();
        map.insert("threat_count".to_string(), OverrideValue::Str("30".into()));
        let err = resolver(&[]).resolve(Some(&path), &map).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedFile { .. }), "got {err}");
    }

    #[test]
    fn test_load_defaults_matches_builtin() {
        assert_eq!(load_defaults().unwrap(), SimConfig::defaults());
    }

    #[test]
    fn test_load_from_path_rejects_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.yaml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::MalformedFile);
    }

    #[test]
    fn test_load_with_overrides_checks_types() {
        let mut map = OverrideMap::new();
        map.insert("difficulty".to_string(), OverrideValue::Bool(true));
        let err = load_with_overrides(None, &map).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidOverrideType);
    }

    #[test]
    fn test_validation_failure_returns_no_config() {
        let err = resolver(&[("DEFENDER_COUNT", "0")])
            .resolve(None, &OverrideMap::new())
            .unwrap_err();
        match err {
            ConfigError::Validation(e) => assert_eq!(e.field(), "numeric_defaults.defender_count"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_skips_reported() {
        let resolved = resolver(&[("VERBOSE_LOGGING", "sometimes")])
            .resolve(None, &OverrideMap::new())
            .unwrap();
        assert_eq!(resolved.env_report().skipped.len(), 1);
        assert!(!resolved.config().advanced.verbose_logging);
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Defaults < Stage::File);
        assert!(Stage::File < Stage::Environment);
        assert!(Stage::Environment < Stage::Overrides);
        assert!(Stage::Overrides < Stage::Validate);
        assert_eq!(Stage::Environment.to_string(), "environment");
    }
}
