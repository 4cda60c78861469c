//! Config file discovery, reading, and parsing.
//!
//! A missing file is reported as `ConfigError::FileNotFound` so callers can
//! fall back to defaults. Anything wrong with a file that does exist (bad
//! YAML, wrong types, unknown keys) is `ConfigError::MalformedFile` and is
//! never partially applied.

use super::merge::overlay_value;
use super::types::SimConfig;
use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SWARM_SIM_CONFIG";

/// Config file looked for in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "swarm-sim.yaml";

/// Candidate config file locations, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit path (CLI flag or `SWARM_SIM_CONFIG`).
    pub explicit: Option<PathBuf>,
    /// `./swarm-sim.yaml`
    pub project: Option<PathBuf>,
    /// `~/.swarm-sim/config.yaml`
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover candidate paths from an explicit path, the environment, and the home directory.
    pub fn discover(explicit: Option<PathBuf>, env: &impl super::env::EnvSource) -> Self {
        let explicit = explicit.or_else(|| env.get(CONFIG_PATH_ENV).map(PathBuf::from));
        Self {
            explicit,
            project: Some(PathBuf::from(PROJECT_CONFIG_FILE)),
            user: dirs::home_dir().map(|h| h.join(".swarm-sim").join("config.yaml")),
        }
    }

    /// The path to load.
    ///
    /// An explicit path is always returned, even if it does not exist, so the
    /// resolver can report the fallback. Otherwise the first existing
    /// discovered file wins.
    pub fn select(&self) -> Option<&Path> {
        if let Some(ref explicit) = self.explicit {
            return Some(explicit.as_path());
        }
        [&self.project, &self.user]
            .into_iter()
            .flatten()
            .find(|p| p.exists())
            .map(PathBuf::as_path)
    }
}

/// Read a config file into an untyped document.
///
/// An empty file is an empty document. A document whose top level is not a
/// mapping is malformed.
pub fn read_document(path: &Path) -> ConfigResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let doc: Value =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::malformed(path, e))?;
    match doc {
        Value::Null => Ok(Value::Object(Default::default())),
        Value::Object(_) => Ok(doc),
        other => Err(ConfigError::malformed(
            path,
            format!("expected a mapping at the top level, found {}", kind_name(&other)),
        )),
    }
}

/// Parse a config file on its own. Fields the file omits keep their defaults.
pub fn load_file(path: &Path) -> ConfigResult<SimConfig> {
    let doc = read_document(path)?;
    serde_json::from_value(doc).map_err(|e| ConfigError::malformed(path, e))
}

/// Result of merging a file onto an existing config.
#[derive(Debug, Clone)]
pub struct FileMerge {
    pub config: SimConfig,
    /// Dotted paths of every field the file set.
    pub fields: Vec<String>,
}

/// Merge the fields present in `path` onto `base`.
///
/// On error `base` is dropped with the rest of the attempt; nothing is
/// partially applied.
pub fn merge_file(base: SimConfig, path: &Path) -> ConfigResult<FileMerge> {
    let doc = read_document(path)?;
    let mut merged = serde_json::to_value(&base).map_err(|e| ConfigError::malformed(path, e))?;
    let fields = overlay_value(&mut merged, doc);
    let config = serde_json::from_value(merged).map_err(|e| ConfigError::malformed(path, e))?;
    debug!(path = %path.display(), fields = fields.len(), "Merged config file");
    Ok(FileMerge { config, fields })
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
