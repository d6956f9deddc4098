use super::models::Config;
use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("pool.workers must be positive")]
    NoWorkers,

    #[error("Duration must be positive: {field}")]
    ZeroDuration { field: &'static str },

    #[error("pool.result_buffer must be positive")]
    NoResultBuffer,

    #[error("No targets configured (generator.targets is empty)")]
    NoTargets,

    #[error("Invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_pool(config)?;
    validate_generator(config)?;
    validate_http(config)?;
    Ok(())
}

fn validate_pool(config: &Config) -> Result<(), ValidationError> {
    if config.pool.workers == 0 {
        return Err(ValidationError::NoWorkers);
    }

    if config.pool.request_timeout.is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "pool.request_timeout",
        });
    }

    if config.pool.result_buffer == 0 {
        return Err(ValidationError::NoResultBuffer);
    }

    Ok(())
}

/// Every target must be an absolute http(s) URL
fn validate_generator(config: &Config) -> Result<(), ValidationError> {
    if config.generator.interval.is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "generator.interval",
        });
    }

    if config.generator.targets.is_empty() {
        return Err(ValidationError::NoTargets);
    }

    for target in &config.generator.targets {
        validate_target(target)?;
    }

    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.connect_timeout.is_zero() {
        return Err(ValidationError::ZeroDuration {
            field: "http.connect_timeout",
        });
    }

    Ok(())
}

pub fn validate_target(target: &str) -> Result<(), ValidationError> {
    let url = Url::parse(target).map_err(|e| ValidationError::InvalidTarget {
        target: target.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ValidationError::InvalidTarget {
            target: target.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}
