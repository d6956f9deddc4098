//! HTTP health check probe

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use super::Probe;
use crate::job::{Job, ProbeResult};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {code}: {reason}")]
    ErrorStatus { code: u16, reason: String },
}

pub type Result<T> = std::result::Result<T, ProbeError>;

/// HTTP probe configuration
#[derive(Debug, Clone)]
pub struct HttpProbeConfig {
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Treat 4xx/5xx responses as failures instead of recording their status
    pub fail_on_error_status: bool,
}

impl Default for HttpProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            user_agent: concat!("pingbox/", env!("CARGO_PKG_VERSION")).to_string(),
            fail_on_error_status: false,
        }
    }
}

/// Probe that issues a `GET` and records status code and response time
pub struct HttpProbe {
    client: Client,
    config: HttpProbeConfig,
}

impl HttpProbe {
    /// Create a new HTTP probe
    pub fn new(config: HttpProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Issue one request; the whole exchange is bounded by `timeout`
    async fn check(&self, url: &str, timeout: Duration) -> Result<(StatusCode, Duration)> {
        let url = Url::parse(url).map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!(%url, "Starting probe");

        let started = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout(timeout)
                } else if e.is_connect() {
                    ProbeError::Connect(e.to_string())
                } else {
                    ProbeError::Request(e.to_string())
                }
            })?;
        let elapsed = started.elapsed();

        let status = response.status();
        if self.config.fail_on_error_status
            && (status.is_client_error() || status.is_server_error())
        {
            return Err(ProbeError::ErrorStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        debug!(%url, status = status.as_u16(), ?elapsed, "Probe completed");

        Ok((status, elapsed))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, job: &Job, timeout: Duration) -> ProbeResult {
        match self.check(&job.url, timeout).await {
            Ok((status, elapsed)) => ProbeResult::success(&job.url, status.as_u16(), elapsed),
            Err(e) => ProbeResult::failure(&job.url, e.to_string()),
        }
    }
}
