//! Fixed-size probe worker pool
//!
//! Architecture:
//! 1. Producers call [`Pool::push`] (or [`Pool::try_push`])
//! 2. Jobs are handed off to a worker: a push returns only once a worker has
//!    taken the job, so producers stall while every worker is busy
//! 3. `workers` identical tokio tasks share the receiving half and probe jobs
//!    in first-ready order
//! 4. Each job yields exactly one [`ProbeResult`] on the caller's result channel
//! 5. [`Pool::stop`] closes intake and returns once every accepted job has
//!    published its result
//!
//! The queue is a one-slot mpsc channel. Each job travels with a oneshot
//! sender that the receiving worker fires, and the producer waits on it, so
//! the slot never holds a job whose producer has moved on.
//!
//! The intake sender sits behind a single `RwLock`. A push checks for a closed
//! pool and enqueues while holding the read guard; stop takes the write guard
//! to close it and flips the state while holding it. A job is therefore either
//! accepted and drained, or rejected, never accepted and then lost.

pub mod tracker;
mod worker;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::job::{Job, ProbeResult};
use crate::observability::{Metrics, MetricsSnapshot};
use crate::probe::Probe;
use tracker::InflightTracker;
use worker::{Handoff, JobReceiver, WorkerContext};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("Worker count must be positive")]
    InvalidWorkerCount,

    #[error("Per-job timeout must be positive")]
    InvalidTimeout,

    #[error("Pool already started")]
    AlreadyStarted,

    #[error("Pool was never started")]
    NotStarted,

    #[error("Pool is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, PoolError>;

/// Lifecycle of a [`Pool`]: created, running, then stopped for good
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Created,
    Running,
    Stopped,
}

impl PoolState {
    const fn as_u8(self) -> u8 {
        match self {
            PoolState::Created => 0,
            PoolState::Running => 1,
            PoolState::Stopped => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => PoolState::Created,
            1 => PoolState::Running,
            _ => PoolState::Stopped,
        }
    }
}

pub struct Pool {
    workers: usize,
    timeout: Duration,
    state: AtomicU8,
    /// `None` once the pool is stopped
    intake: RwLock<Option<mpsc::Sender<Handoff>>>,
    jobs: JobReceiver,
    /// Handed to the workers on init
    results: Mutex<Option<mpsc::Sender<ProbeResult>>>,
    probe: Arc<dyn Probe>,
    tracker: Arc<InflightTracker>,
    metrics: Arc<Metrics>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Pool {
    /// Create a pool; no workers run until [`Pool::init`]
    ///
    /// The result channel is owned by the caller. Once the pool has stopped
    /// and the caller has dropped its own senders, the receiving end closes.
    pub fn new(
        workers: usize,
        timeout: Duration,
        results: mpsc::Sender<ProbeResult>,
        probe: Arc<dyn Probe>,
    ) -> Result<Self> {
        if workers == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }
        if timeout.is_zero() {
            return Err(PoolError::InvalidTimeout);
        }

        let (tx, rx) = mpsc::channel(1);

        Ok(Self {
            workers,
            timeout,
            state: AtomicU8::new(PoolState::Created.as_u8()),
            intake: RwLock::new(Some(tx)),
            jobs: Arc::new(tokio::sync::Mutex::new(rx)),
            results: Mutex::new(Some(results)),
            probe,
            tracker: Arc::new(InflightTracker::new()),
            metrics: Arc::new(Metrics::new()),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the workers and return immediately
    ///
    /// Must be called from within a Tokio runtime. Fails with
    /// [`PoolError::AlreadyStarted`] on a second call.
    pub fn init(&self) -> Result<()> {
        if let Err(current) = self.transition(PoolState::Created, PoolState::Running) {
            return Err(match current {
                PoolState::Running => PoolError::AlreadyStarted,
                _ => PoolError::Closed,
            });
        }

        let results = self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(PoolError::AlreadyStarted)?;

        let ctx = WorkerContext {
            jobs: self.jobs.clone(),
            results,
            probe: self.probe.clone(),
            tracker: self.tracker.clone(),
            metrics: self.metrics.clone(),
            timeout: self.timeout,
        };

        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        for id in 0..self.workers {
            handles.push(tokio::spawn(worker::run(id, ctx.clone())));
        }

        info!(workers = self.workers, timeout = ?self.timeout, "Worker pool started");
        Ok(())
    }

    /// Enqueue a job, silently dropping it if the pool is stopped
    ///
    /// Suspends until a worker takes the job. Pushing before [`Pool::init`]
    /// suspends until the workers start.
    pub async fn push(&self, job: Job) {
        if let Err(e) = self.try_push(job).await {
            debug!(error = %e, "Job dropped");
        }
    }

    /// Enqueue a job, reporting [`PoolError::Closed`] if the pool is stopped
    pub async fn try_push(&self, job: Job) -> Result<()> {
        let intake = self.intake.read().await;

        let Some(sender) = intake.as_ref() else {
            self.metrics.job_dropped();
            return Err(PoolError::Closed);
        };

        // Reserve first: if this future is cancelled while waiting for the
        // slot, nothing has been counted yet
        let permit = match sender.reserve().await {
            Ok(permit) => permit,
            Err(_) => {
                self.metrics.job_dropped();
                return Err(PoolError::Closed);
            }
        };

        let (taken, handed_off) = oneshot::channel();
        self.tracker.add();
        permit.send(Handoff { job, taken });
        self.metrics.job_accepted();
        drop(intake);

        // The job is queued and counted, so cancelling from here on still
        // gets it probed. An error means the queue was torn down with it.
        let _ = handed_off.await;

        Ok(())
    }

    /// Close intake and wait until every accepted job has published its result
    ///
    /// Repeated calls are no-ops that also wait for the drain. Stopping a pool
    /// that was never started returns [`PoolError::NotStarted`].
    pub async fn stop(&self) -> Result<()> {
        // Pushes parked before init hold the read guard until workers exist
        if self.state() == PoolState::Created {
            return Err(PoolError::NotStarted);
        }

        // Waits for pushes already holding the read guard; later pushes see `None`
        let mut intake = self.intake.write().await;
        match self.transition(PoolState::Running, PoolState::Stopped) {
            Ok(()) => {}
            Err(PoolState::Created) => return Err(PoolError::NotStarted),
            Err(_) => {
                drop(intake);
                self.tracker.wait_idle().await;
                return Ok(());
            }
        }

        info!(pending = self.tracker.pending(), "Stopping worker pool");
        drop(intake.take());
        drop(intake);

        self.tracker.wait_idle().await;

        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task failed");
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            jobs_accepted = snapshot.jobs_accepted,
            jobs_dropped = snapshot.jobs_dropped,
            probes_succeeded = snapshot.probes_succeeded,
            probes_failed = snapshot.probes_failed,
            "Worker pool stopped"
        );

        Ok(())
    }

    pub fn state(&self) -> PoolState {
        PoolState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == PoolState::Stopped
    }

    /// Jobs accepted but not yet resulted
    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn transition(&self, from: PoolState, to: PoolState) -> std::result::Result<(), PoolState> {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(PoolState::from_u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoProbe;

    #[async_trait]
    impl Probe for EchoProbe {
        async fn probe(&self, job: &Job, _timeout: Duration) -> ProbeResult {
            ProbeResult::success(&job.url, 200, Duration::from_millis(1))
        }
    }

    fn pool(workers: usize) -> (Pool, mpsc::Receiver<ProbeResult>) {
        let (tx, rx) = mpsc::channel(64);
        let pool = Pool::new(workers, Duration::from_secs(1), tx, Arc::new(EchoProbe)).unwrap();
        (pool, rx)
    }

    #[test]
    fn test_new_rejects_zero_workers() {
        let (tx, _rx) = mpsc::channel(1);
        let result = Pool::new(0, Duration::from_secs(1), tx, Arc::new(EchoProbe));
        assert_eq!(result.err(), Some(PoolError::InvalidWorkerCount));
    }

    #[test]
    fn test_new_rejects_zero_timeout() {
        let (tx, _rx) = mpsc::channel(1);
        let result = Pool::new(2, Duration::ZERO, tx, Arc::new(EchoProbe));
        assert_eq!(result.err(), Some(PoolError::InvalidTimeout));
    }

    #[tokio::test]
    async fn test_lifecycle_states() {
        let (pool, _rx) = pool(2);
        assert_eq!(pool.state(), PoolState::Created);

        pool.init().unwrap();
        assert_eq!(pool.state(), PoolState::Running);
        assert_eq!(pool.init(), Err(PoolError::AlreadyStarted));

        pool.stop().await.unwrap();
        assert!(pool.is_stopped());
        assert_eq!(pool.init(), Err(PoolError::Closed));
    }

    #[tokio::test]
    async fn test_stop_before_init_is_rejected() {
        let (pool, _rx) = pool(1);
        assert_eq!(pool.stop().await, Err(PoolError::NotStarted));
        assert_eq!(pool.state(), PoolState::Created);
    }

    #[tokio::test]
    async fn test_second_stop_is_noop() {
        let (pool, _rx) = pool(1);
        pool.init().unwrap();
        pool.stop().await.unwrap();
        pool.stop().await.unwrap();
        assert!(pool.is_stopped());
    }

    #[tokio::test]
    async fn test_try_push_after_stop_reports_closed() {
        let (pool, mut rx) = pool(1);
        pool.init().unwrap();
        pool.stop().await.unwrap();

        assert_eq!(pool.try_push(Job::new("https://late/")).await, Err(PoolError::Closed));
        pool.push(Job::new("https://late/")).await;

        // Workers are gone and the pool released its sender, so the stream ends
        assert!(rx.recv().await.is_none());
        assert_eq!(pool.metrics().jobs_dropped, 2);
    }

    #[tokio::test]
    async fn test_push_before_init_waits_for_workers() {
        let (pool, mut rx) = pool(1);
        let pool = Arc::new(pool);

        let pusher = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.push(Job::new("https://early/")).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pusher.is_finished(), "push returned with no worker running");
        assert_eq!(pool.stop().await, Err(PoolError::NotStarted));

        pool.init().unwrap();
        pusher.await.unwrap();
        pool.stop().await.unwrap();

        let result = rx.recv().await.unwrap();
        assert_eq!(result.url, "https://early/");
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test]
    async fn test_stopped_pool_rejects_push_once_flag_is_visible() {
        let (pool, _rx) = pool(2);
        let pool = Arc::new(pool);
        pool.init().unwrap();

        let stopper = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.stop().await })
        };

        // Spin until the flag flips, then every push must be rejected
        while !pool.is_stopped() {
            tokio::task::yield_now().await;
        }
        assert_eq!(pool.try_push(Job::new("https://late/")).await, Err(PoolError::Closed));

        stopper.await.unwrap().unwrap();
        assert_eq!(pool.metrics().jobs_accepted, 0);
    }
}
