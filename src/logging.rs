//! Tracing setup driven by the resolved configuration.
//!
//! The console level comes from `logging.console_level`, raised to `debug`
//! when `advanced.verbose_logging` is set. `RUST_LOG` takes precedence over
//! both when present.

use crate::config::{LogLevel, SimConfig};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Append to a file.
    File(PathBuf),
}

impl LogTarget {
    /// Parse a `--log` argument: 0/off, 1/stdout, 2/stderr, or a filename.
    pub fn parse(s: &str) -> Self {
        match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

/// Effective console level for `config`.
///
/// An unrecognised `console_level` falls back to `info`; validation rejects
/// such configs before they reach here in normal use.
pub fn console_level(config: &SimConfig) -> LogLevel {
    if config.advanced.verbose_logging {
        return LogLevel::Debug.max_verbosity(config.logging.console_level().ok());
    }
    config.logging.console_level().unwrap_or(LogLevel::Info)
}

impl LogLevel {
    fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
            LogLevel::Trace => 4,
        }
    }

    /// The chattier of `self` and `other`.
    fn max_verbosity(self, other: Option<LogLevel>) -> LogLevel {
        match other {
            Some(o) if o.rank() > self.rank() => o,
            _ => self,
        }
    }
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber. Call once, after configuration resolves.
pub fn init(target: &LogTarget, level: LogLevel) -> anyhow::Result<()> {
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
