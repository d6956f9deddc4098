pub mod app;
pub mod config;
pub mod generator;
pub mod humanize;
pub mod job;
pub mod observability;
pub mod pool;
pub mod probe;
pub mod reporter;

pub use job::{Job, Outcome, ProbeResult};
pub use pool::{Pool, PoolError, PoolState};
pub use probe::Probe;
