//! In-flight job accounting used to drain the pool on stop

use tokio::sync::watch;
use tracing::error;

/// Counts jobs accepted by the pool that have not produced a result yet.
///
/// `add` must happen before the job becomes visible to a worker, so the
/// count never dips below the number of jobs still in the pipeline.
#[derive(Debug)]
pub struct InflightTracker {
    count: watch::Sender<usize>,
}

impl InflightTracker {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }

    pub fn add(&self) {
        self.count.send_modify(|n| *n += 1);
    }

    pub fn done(&self) {
        self.count.send_modify(|n| {
            if *n == 0 {
                error!("InflightTracker::done called with no outstanding jobs");
            } else {
                *n -= 1;
            }
        });
    }

    pub fn pending(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until every added job has been marked done
    pub async fn wait_idle(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for InflightTracker {
    fn default() -> Self {
        Self::new()
    }
}
