//! Command-line interface components.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "qartod-qc")]
#[command(about = "Run QARTOD quality-control tests over sensor time series")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a test suite configuration for errors
    Validate {
        /// Path to the JSON suite configuration
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,
    },

    /// Run a test suite over a JSON series and print the flags
    Run {
        /// Path to the JSON suite configuration
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Path to the JSON series (`values`, optional `times`, `depths`, `lon`, `lat`)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write results here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Args {
    /// Tracing level implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Set up structured logging on stderr; `RUST_LOG` takes precedence
pub fn setup_logging(args: &Args) {
    use crate::constants::LOG_TARGET;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Command implementations
pub mod commands {
    use super::*;
    use crate::config::QcConfig;
    use crate::runner::{QcRunner, Series};
    use anyhow::{Context, Result};
    use colored::*;
    use tracing::info;

    pub fn run(args: &Args) -> Result<()> {
        match &args.command {
            Command::Validate { config } => validate(config),
            Command::Run {
                config,
                input,
                output,
            } => run_suite(config, input, output.as_deref()),
        }
    }

    fn load_config(path: &Path) -> Result<QcConfig> {
        QcConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))
    }

    fn validate(path: &Path) -> Result<()> {
        let config = load_config(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;

        println!("{} {}", "Valid configuration:".green().bold(), path.display());
        for name in config.enabled_tests() {
            println!("  {} {}", "✓".green(), name);
        }
        Ok(())
    }

    fn run_suite(config_path: &Path, input: &Path, output: Option<&Path>) -> Result<()> {
        let runner = QcRunner::new(load_config(config_path)?)
            .with_context(|| format!("Invalid config {}", config_path.display()))?;

        let contents = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read input {}", input.display()))?;
        let series = Series::from_json_str(&contents)
            .with_context(|| format!("Failed to parse series {}", input.display()))?;

        let results = runner.run(&series)?;
        let json = results.to_json_string()?;

        match output {
            Some(path) => {
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write results {}", path.display()))?;
                info!("Wrote results for {} values to {}", series.len(), path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
