//! Periodic job generation
//!
//! The generator re-submits a fixed set of targets on an interval. It only
//! knows the [`Dispatch`] trait, not the pool itself.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::job::Job;
use crate::pool::{Pool, PoolError};

/// Anything that accepts jobs for execution
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Submit one job; `PoolError::Closed` means no further jobs will be taken
    async fn dispatch(&self, job: Job) -> Result<(), PoolError>;
}

#[async_trait]
impl Dispatch for Pool {
    async fn dispatch(&self, job: Job) -> Result<(), PoolError> {
        self.try_push(job).await
    }
}

/// Why a generator loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorExit {
    /// The shutdown signal fired
    Shutdown,
    /// The dispatcher stopped accepting jobs
    Closed,
}

pub struct Generator {
    targets: Vec<String>,
    interval: Duration,
}

impl Generator {
    pub fn new(targets: Vec<String>, interval: Duration) -> Self {
        Self { targets, interval }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Submit every target exactly once
    pub async fn run_once<D: Dispatch + ?Sized>(&self, dispatcher: &D) -> Result<usize, PoolError> {
        for url in &self.targets {
            dispatcher.dispatch(Job::new(url.as_str())).await?;
        }
        Ok(self.targets.len())
    }

    /// Submit all targets, sleep `interval`, repeat until shutdown or close
    ///
    /// `shutdown` fires when its value becomes `true` or its sender is dropped.
    pub async fn run<D: Dispatch + ?Sized>(
        &self,
        dispatcher: &D,
        mut shutdown: watch::Receiver<bool>,
    ) -> GeneratorExit {
        let mut rounds: u64 = 0;

        loop {
            if *shutdown.borrow() {
                return GeneratorExit::Shutdown;
            }

            tokio::select! {
                submitted = self.run_once(dispatcher) => {
                    if submitted.is_err() {
                        info!(rounds, "Dispatcher closed, stopping job generator");
                        return GeneratorExit::Closed;
                    }
                }
                _ = shutdown.wait_for(|stop| *stop) => {
                    info!(rounds, "Shutdown requested, stopping job generator");
                    return GeneratorExit::Shutdown;
                }
            }

            rounds += 1;
            debug!(rounds, targets = self.targets.len(), "Submitted round of jobs");

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.wait_for(|stop| *stop) => {
                    info!(rounds, "Shutdown requested, stopping job generator");
                    return GeneratorExit::Shutdown;
                }
            }
        }
    }
}
