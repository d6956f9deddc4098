//! Job and result types exchanged between producers, workers and sinks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// One unit of work: a target to probe.
///
/// Jobs carry no identity beyond their content; pushing the same URL twice
/// yields two independent jobs and two results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    pub url: String,
}

impl Job {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        status: u16,
        #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
        elapsed: Duration,
    },
    Failure {
        error: String,
    },
}

fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(value.as_millis() as u64)
}

/// Result of executing exactly one [`Job`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub url: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub checked_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ProbeResult {
    pub fn success(url: impl Into<String>, status: u16, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            checked_at: Utc::now(),
            outcome: Outcome::Success { status, elapsed },
        }
    }

    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            checked_at: Utc::now(),
            outcome: Outcome::Failure {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self.outcome {
            Outcome::Success { status, .. } => Some(status),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { error } => Some(error),
        }
    }

    /// Compare two results ignoring timing fields (elapsed, checked_at)
    pub fn same_outcome(&self, other: &ProbeResult) -> bool {
        if self.url != other.url {
            return false;
        }

        match (&self.outcome, &other.outcome) {
            (Outcome::Success { status: a, .. }, Outcome::Success { status: b, .. }) => a == b,
            (Outcome::Failure { error: a }, Outcome::Failure { error: b }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Success { status, elapsed } => write!(
                f,
                "[SUCCESS] - [{}] - Status: {}, Response Time: {:?}",
                self.url, status, elapsed
            ),
            Outcome::Failure { error } => write!(f, "[ERROR] - [{}] - {}", self.url, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_success() {
        let result = ProbeResult::success("https://example.com/", 200, Duration::from_millis(150));
        assert_eq!(
            result.to_string(),
            "[SUCCESS] - [https://example.com/] - Status: 200, Response Time: 150ms"
        );
    }

    #[test]
    fn test_display_failure() {
        let result = ProbeResult::failure("https://example.com/", "Connection timeout");
        assert_eq!(
            result.to_string(),
            "[ERROR] - [https://example.com/] - Connection timeout"
        );
    }

    #[test]
    fn test_same_outcome_ignores_timing() {
        let a = ProbeResult::success("https://a/", 204, Duration::from_millis(10));
        let b = ProbeResult::success("https://a/", 204, Duration::from_millis(900));
        let c = ProbeResult::success("https://a/", 500, Duration::from_millis(10));
        let d = ProbeResult::failure("https://a/", "boom");

        assert!(a.same_outcome(&b));
        assert!(!a.same_outcome(&c));
        assert!(!a.same_outcome(&d));
    }

    #[test]
    fn test_serialize_json() {
        let result = ProbeResult::success("https://example.com/", 200, Duration::from_millis(42));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["url"], "https://example.com/");
        assert_eq!(value["outcome"], "success");
        assert_eq!(value["status"], 200);
        assert_eq!(value["elapsed_ms"], 42);
        assert!(value["checked_at"].is_i64());

        let failed = serde_json::to_value(ProbeResult::failure("https://x/", "refused")).unwrap();
        assert_eq!(failed["outcome"], "failure");
        assert_eq!(failed["error"], "refused");
    }
}
