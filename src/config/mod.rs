//! Configuration management for pingbox
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use pingbox::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Running {} workers", config.pool.workers);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `PINGBOX__<section>__<key>`
//!
//! Examples:
//! - `PINGBOX__POOL__WORKERS=8`
//! - `PINGBOX__POOL__REQUEST_TIMEOUT=500ms`
//! - `PINGBOX__GENERATOR__TARGETS=https://a.example/,https://b.example/`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/pingbox.toml`.
//! This can be overridden using the `PINGBOX_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, GeneratorConfig, HttpConfig, OutputConfig, PoolConfig};
pub use validation::{ValidationError, validate_target};

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`PINGBOX__*`)
    /// 2. TOML file (default: `config/pingbox.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-check invariants, e.g. after applying command-line overrides
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
