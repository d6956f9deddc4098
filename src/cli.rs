use clap::{Parser, Subcommand};
use pingbox::config::{Config, ConfigError, HumanDuration};
use pingbox::reporter::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pingbox")]
#[command(about = "Website health checks on a fixed-size worker pool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe targets on an interval until interrupted (Ctrl+C / SIGTERM)
    Run(RunArgs),
    /// Probe every target once; exit status 1 if any probe failed
    Check(CheckArgs),
}

/// Options shared by every command
#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Configuration file (defaults to $PINGBOX_CONFIG or config/pingbox.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-probe timeout, e.g. "2s" or "500ms"
    #[arg(long)]
    pub timeout: Option<HumanDuration>,

    /// Result output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Targets to probe, replacing the configured list
    pub targets: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Pause between rounds, e.g. "5s"
    #[arg(long)]
    pub interval: Option<HumanDuration>,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommonArgs {
    /// Load configuration and apply command-line overrides on top
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load()?,
        };

        if let Some(workers) = self.workers {
            config.pool.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.pool.request_timeout = timeout;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if !self.targets.is_empty() {
            config.generator.targets = self.targets.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

impl RunArgs {
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = self.common.load_config()?;
        if let Some(interval) = self.interval {
            config.generator.interval = interval;
            config.validate()?;
        }
        Ok(config)
    }
}
