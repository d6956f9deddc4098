use crate::humanize::HumanDuration;
use crate::probe::HttpProbeConfig;
use crate::reporter::OutputFormat;
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Worker pool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Upper bound for a single probe
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    /// Capacity of the result channel between workers and the reporter
    #[serde(default = "default_result_buffer")]
    pub result_buffer: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_timeout: default_request_timeout(),
            result_buffer: default_result_buffer(),
        }
    }
}

fn default_workers() -> usize {
    3
}

fn default_request_timeout() -> HumanDuration {
    HumanDuration::from_secs(2)
}

fn default_result_buffer() -> usize {
    16
}

/// Periodic job generation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Pause between two rounds of submissions
    #[serde(default = "default_interval")]
    pub interval: HumanDuration,
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            targets: default_targets(),
        }
    }
}

fn default_interval() -> HumanDuration {
    HumanDuration::from_secs(5)
}

fn default_targets() -> Vec<String> {
    [
        "https://www.rust-lang.org/",
        "https://crates.io/",
        "https://docs.rs/",
        "https://google.com/",
        "https://golang.org/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// HTTP probe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    /// Report 4xx/5xx responses as failures
    #[serde(default)]
    pub fail_on_error_status: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            fail_on_error_status: false,
        }
    }
}

impl HttpConfig {
    pub fn probe_config(&self) -> HttpProbeConfig {
        HttpProbeConfig {
            connect_timeout: self.connect_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
            fail_on_error_status: self.fail_on_error_status,
        }
    }
}

fn default_user_agent() -> String {
    concat!("pingbox/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(2)
}

/// Result output configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}
