//! Pool metrics and tracing setup

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber (`RUST_LOG` overrides the default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout stays clean for the result stream
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Metrics handle for recording pool counters
#[derive(Debug, Default)]
pub struct Metrics {
    jobs_accepted: AtomicU64,
    jobs_dropped: AtomicU64,
    probes_succeeded: AtomicU64,
    probes_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_accepted(&self) {
        self.jobs_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "jobs_accepted", "Metric incremented");
    }

    pub fn job_dropped(&self) {
        self.jobs_dropped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_dropped", "Metric incremented");
    }

    pub fn probe_succeeded(&self) {
        self.probes_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "probes_succeeded", "Metric incremented");
    }

    pub fn probe_failed(&self) {
        self.probes_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "probes_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_accepted: self.jobs_accepted.load(Ordering::Relaxed),
            jobs_dropped: self.jobs_dropped.load(Ordering::Relaxed),
            probes_succeeded: self.probes_succeeded.load(Ordering::Relaxed),
            probes_failed: self.probes_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub jobs_accepted: u64,
    pub jobs_dropped: u64,
    pub probes_succeeded: u64,
    pub probes_failed: u64,
}

impl MetricsSnapshot {
    /// Probes that have produced a result, successful or not
    pub fn probes_completed(&self) -> u64 {
        self.probes_succeeded + self.probes_failed
    }
}
