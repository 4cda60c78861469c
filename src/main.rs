//! swarm-sim-config binary
//!
//! Resolves the simulation configuration from defaults, file, environment,
//! and command-line overrides, then prints or validates it.

use anyhow::{Context, Result};
use clap::Parser;
use swarm_sim_config::cli::{Cli, Command};
use swarm_sim_config::config::{ConfigPaths, ConfigResolver, ProcessEnv, Resolved, SimConfig};
use swarm_sim_config::format::{self, OutputFormat};
use swarm_sim_config::logging::{self, LogTarget};
use tracing::{info, warn};

fn report_sources(resolved: &Resolved) {
    match resolved.source() {
        Some(path) => info!(
            path = %path.display(),
            fields = resolved.file_fields().len(),
            "Using config file"
        ),
        None => info!("No config file, using defaults"),
    }
    for skip in &resolved.env_report().skipped {
        warn!(
            var = %skip.var,
            value = %skip.value,
            "Ignoring environment variable: {}",
            skip.reason
        );
    }
}

/// Resolve against the process environment, tagging failures with their error code.
fn resolve(cli: &Cli) -> Result<Resolved> {
    let paths = ConfigPaths::discover(cli.config.clone(), &ProcessEnv);
    ConfigResolver::new()
        .resolve(paths.select(), &cli.override_map())
        .map_err(|e| {
            let code = e.code().as_str();
            anyhow::Error::new(e).context(format!("failed to resolve configuration [{code}]"))
        })
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Command::Show {
        format: OutputFormat::Text,
        explain: false,
    });

    if let Command::Defaults = command {
        let yaml =
            format::to_yaml(&SimConfig::defaults()).context("failed to serialize defaults")?;
        print!("{}", yaml);
        return Ok(());
    }

    let resolved = resolve(&cli)?;

    logging::init(
        &LogTarget::parse(&cli.log),
        logging::console_level(resolved.config()),
    )
    .with_context(|| format!("failed to initialize logging to '{}'", cli.log))?;
    report_sources(&resolved);

    match command {
        Command::Show {
            format: output,
            explain,
        } => {
            print!("{}", format::render(resolved.config(), output)?);
            if explain {
                println!();
                print!("{}", format::render_provenance(&resolved));
            }
        }
        Command::Validate => {
            let config = resolved.config();
            println!(
                "OK: {} ({} defenders, {} threats)",
                config.simulation.name,
                config.numeric_defaults.defender_count,
                config.numeric_defaults.threat_count
            );
        }
        Command::Defaults => {}
    }

    Ok(())
}
