mod common;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use common::SharedBuf;

use pingbox::app::App;
use pingbox::config::{Config, HumanDuration};
use pingbox::reporter::OutputFormat;
use pingbox::{Job, Probe, ProbeResult};

/// Succeeds for every URL except those containing "down"
struct StaticProbe;

#[async_trait]
impl Probe for StaticProbe {
    async fn probe(&self, job: &Job, _timeout: Duration) -> ProbeResult {
        tokio::time::sleep(Duration::from_millis(5)).await;
        if job.url.contains("down") {
            ProbeResult::failure(&job.url, "Connection failed: refused")
        } else {
            ProbeResult::success(&job.url, 200, Duration::from_millis(5))
        }
    }
}

fn test_config(targets: &[&str]) -> Config {
    let mut config = Config::default();
    config.pool.workers = 2;
    config.generator.targets = targets.iter().map(|t| t.to_string()).collect();
    config.generator.interval = HumanDuration::from_millis(50);
    config.validate().unwrap();
    config
}

#[tokio::test]
async fn test_check_probes_each_target_once() {
    let buf = SharedBuf::default();
    let config = test_config(&["https://a.test/", "https://down.test/", "https://b.test/"]);

    let summary = App::new(config)
        .with_probe(Arc::new(StaticProbe))
        .with_output(Box::new(buf.clone()))
        .check()
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.all_succeeded());

    let lines = buf.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines.contains(&"[ERROR] - [https://down.test/] - Connection failed: refused".to_string()));
}

#[tokio::test]
async fn test_check_json_output() {
    let buf = SharedBuf::default();
    let mut config = test_config(&["https://a.test/"]);
    config.output.format = OutputFormat::Json;

    let summary = App::new(config)
        .with_probe(Arc::new(StaticProbe))
        .with_output(Box::new(buf.clone()))
        .check()
        .await
        .unwrap();

    assert!(summary.all_succeeded());
    let value: serde_json::Value = serde_json::from_str(&buf.lines()[0]).unwrap();
    assert_eq!(value["url"], "https://a.test/");
    assert_eq!(value["outcome"], "success");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_until_repeats_rounds_and_drains_on_shutdown() {
    let buf = SharedBuf::default();
    let config = test_config(&["https://a.test/", "https://b.test/"]);

    let summary = App::new(config)
        .with_probe(Arc::new(StaticProbe))
        .with_output(Box::new(buf.clone()))
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await
        .unwrap();

    // Several rounds of two targets each, every accepted job reported
    assert!(summary.total() >= 4, "only {} results", summary.total());
    assert_eq!(summary.failed, 0);
    assert_eq!(buf.lines().len() as u64, summary.total());
}
