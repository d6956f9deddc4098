//! Wires pool, probe, generator and reporter into a running service

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::Config;
use crate::generator::Generator;
use crate::pool::Pool;
use crate::probe::{HttpProbe, Probe};
use crate::reporter::{ReportSummary, Reporter};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub struct App {
    config: Config,
    probe: Option<Arc<dyn Probe>>,
    output: Option<Box<dyn Write + Send>>,
}

/// Running pool plus the reporter task draining its results
struct Running {
    pool: Arc<Pool>,
    reporter: JoinHandle<ReportSummary>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            probe: None,
            output: None,
        }
    }

    /// Use a custom probe instead of the HTTP probe built from `[http]`
    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Write results somewhere other than stdout
    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    /// Probe every target once, drain the pool and return the tally
    pub async fn check(self) -> Result<ReportSummary, AnyError> {
        let (running, generator) = self.start()?;

        let submitted = generator.run_once(running.pool.as_ref()).await?;
        info!(submitted, "All targets submitted, draining pool");

        running.finish().await
    }

    /// Probe targets on the configured interval until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<ReportSummary, AnyError>
    where
        F: Future<Output = ()>,
    {
        let interval = self.config.generator.interval;
        let (running, generator) = self.start()?;
        let (stop_tx, stop_rx) = watch::channel(false);

        let generator_task = {
            let pool = running.pool.clone();
            tokio::spawn(async move { generator.run(pool.as_ref(), stop_rx).await })
        };

        info!(%interval, "Job generator started");

        shutdown.await;
        info!("Shutdown signal received");

        let _ = stop_tx.send(true);
        match generator_task.await {
            Ok(exit) => info!(?exit, "Job generator stopped"),
            Err(e) => error!(error = %e, "Job generator task failed"),
        }

        running.finish().await
    }

    fn start(self) -> Result<(Running, Generator), AnyError> {
        let config = self.config;

        let probe: Arc<dyn Probe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(
                HttpProbe::new(config.http.probe_config())
                    .map_err(|e| format!("Failed to build HTTP probe: {}", e))?,
            ),
        };

        let (results_tx, results_rx) = mpsc::channel(config.pool.result_buffer);
        let pool = Arc::new(Pool::new(
            config.pool.workers,
            config.pool.request_timeout.as_duration(),
            results_tx,
            probe,
        )?);

        let reporter = match self.output {
            Some(out) => Reporter::new(config.output.format, out),
            None => Reporter::stdout(config.output.format),
        };
        let reporter = tokio::spawn(reporter.run(results_rx));

        pool.init()?;

        let generator = Generator::new(
            config.generator.targets,
            config.generator.interval.as_duration(),
        );

        Ok((Running { pool, reporter }, generator))
    }
}

impl Running {
    /// Stop the pool, then wait for the reporter to see the end of the stream
    async fn finish(self) -> Result<ReportSummary, AnyError> {
        self.pool.stop().await?;
        // Workers have exited, so the last result sender is gone
        let summary = self.reporter.await?;
        Ok(summary)
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
