//! Result sink: prints the result stream and tallies outcomes

use serde::{Deserialize, Serialize};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::job::ProbeResult;

/// How each result line is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[SUCCESS] - [url] - Status: 200, Response Time: 120ms`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Outcome counts over a whole result stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub succeeded: u64,
    pub failed: u64,
}

impl ReportSummary {
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

pub struct Reporter {
    format: OutputFormat,
    out: Box<dyn Write + Send>,
}

impl Reporter {
    /// Reporter writing to stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, Box::new(std::io::stdout()))
    }

    pub fn new(format: OutputFormat, out: Box<dyn Write + Send>) -> Self {
        Self { format, out }
    }

    /// Consume results until every sender is gone
    pub async fn run(mut self, mut results: mpsc::Receiver<ProbeResult>) -> ReportSummary {
        let mut summary = ReportSummary::default();

        while let Some(result) = results.recv().await {
            if result.is_success() {
                summary.succeeded += 1;
                info!(url = %result.url, status = result.status(), "Probe succeeded");
            } else {
                summary.failed += 1;
                warn!(url = %result.url, error = result.error(), "Probe failed");
            }

            if let Err(e) = self.write(&result) {
                warn!(error = %e, "Failed to write result");
            }
        }

        if let Err(e) = self.out.flush() {
            warn!(error = %e, "Failed to flush results");
        }
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Result stream closed"
        );

        summary
    }

    fn write(&mut self, result: &ProbeResult) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", result),
            OutputFormat::Json => {
                let line = serde_json::to_string(result)?;
                writeln!(self.out, "{}", line)
            }
        }
    }
}
