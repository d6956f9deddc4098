//! Worker loop: receive a job, probe it, publish the result

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, warn};

use super::tracker::InflightTracker;
use crate::job::{Job, ProbeResult};
use crate::observability::Metrics;
use crate::probe::Probe;

/// A queued job plus the producer waiting for a worker to take it
pub(crate) struct Handoff {
    pub job: Job,
    pub taken: oneshot::Sender<()>,
}

/// Receiving half of the task queue, shared by every worker
pub(crate) type JobReceiver = Arc<Mutex<mpsc::Receiver<Handoff>>>;

/// Handles a worker needs; cloned once per spawned worker
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub jobs: JobReceiver,
    pub results: mpsc::Sender<ProbeResult>,
    pub probe: Arc<dyn Probe>,
    pub tracker: Arc<InflightTracker>,
    pub metrics: Arc<Metrics>,
    pub timeout: Duration,
}

/// Run until the task queue is closed and empty
pub(crate) async fn run(id: usize, ctx: WorkerContext) {
    debug!(worker_id = id, "Worker started");

    loop {
        // Lock only for the receive so other workers can pick up jobs while we probe
        let handoff = ctx.jobs.lock().await.recv().await;
        let Some(Handoff { job, taken }) = handoff else {
            break;
        };

        // Releases the producer; it may have been cancelled already
        let _ = taken.send(());

        let result = execute(id, &ctx, job).await;

        if result.is_success() {
            ctx.metrics.probe_succeeded();
        } else {
            ctx.metrics.probe_failed();
        }

        if ctx.results.send(result).await.is_err() {
            warn!(worker_id = id, "Result receiver dropped, discarding result");
        }

        ctx.tracker.done();
    }

    debug!(worker_id = id, "Worker finished processing");
}

/// Probe in a separate task so a panicking probe becomes a failure result
async fn execute(id: usize, ctx: &WorkerContext, job: Job) -> ProbeResult {
    let url = job.url.clone();
    let probe = ctx.probe.clone();
    let timeout = ctx.timeout;

    match tokio::spawn(async move { probe.probe(&job, timeout).await }).await {
        Ok(result) => result,
        Err(e) => {
            error!(worker_id = id, url = %url, error = %e, "Probe task aborted");
            ProbeResult::failure(url, format!("probe panicked: {}", e))
        }
    }
}
