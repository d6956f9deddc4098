//! Probe executors
//!
//! A [`Probe`] turns one [`Job`] into exactly one [`ProbeResult`]. The pool
//! owns no probing logic of its own; it calls whatever probe it was built with.
//!
//! Implementations must bound their own execution by the timeout they are
//! given and report every failure as [`ProbeResult::failure`] instead of
//! returning early or panicking.

pub mod http;

use async_trait::async_trait;
use std::time::Duration;

use crate::job::{Job, ProbeResult};

pub use http::{HttpProbe, HttpProbeConfig, ProbeError};

#[async_trait]
pub trait Probe: Send + Sync {
    /// Execute the job, finishing within roughly `timeout`
    async fn probe(&self, job: &Job, timeout: Duration) -> ProbeResult;
}
