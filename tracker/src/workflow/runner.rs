use crate::backends::{load_shared_config, S3Store, SnsNotifier};
use crate::workflow::config::TrackerConfig;
use log::{info, warn};
use quakecore::ingest::{IngestSummary, Orchestrator, SweepStatus};
use quakecore::notify::{LogNotifier, Notifier};
use quakecore::storage::{DirectoryStore, ObjectStore};
use quakecore::telemetry::MetricsSnapshot;
use std::path::Path;
use std::sync::Arc;

pub struct WorkflowResult {
    pub summary: IngestSummary,
    pub metrics: MetricsSnapshot,
    pub detection_count: usize,
    pub direct_count: usize,
}

impl WorkflowResult {
    /// One-line summary used for console output and the offline report.
    pub fn report_line(&self) -> String {
        format!(
            "detections={} direct={} detections_sweep={} direct_sweep={} skipped={} alerts_sent={} alerts_failed={}",
            self.detection_count,
            self.direct_count,
            status_label(self.summary.detections.as_ref()),
            status_label(self.summary.direct.as_ref()),
            self.metrics.keys_skipped,
            self.metrics.notifications_sent,
            self.metrics.notifications_failed
        )
    }
}

fn status_label(status: Option<&SweepStatus>) -> &'static str {
    match status {
        Some(SweepStatus::Completed(report)) if report.skipped.is_empty() => "ok",
        Some(SweepStatus::Completed(_)) => "partial",
        Some(SweepStatus::ListingFailed { .. }) => "listing_failed",
        None => "pending",
    }
}

#[derive(Clone)]
pub struct Runner {
    orchestrator: Arc<Orchestrator>,
}

impl Runner {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Builds the storage and notification clients once and wires them in.
    ///
    /// A `store_dir` swaps S3 for a local directory and SMS for the log.
    pub async fn connect(config: &TrackerConfig, store_dir: Option<&Path>) -> Self {
        let settings = config.to_ingest_settings();
        let store: Arc<dyn ObjectStore>;
        let notifier: Arc<dyn Notifier>;
        match store_dir {
            Some(dir) => {
                info!("serving bucket {} from {}", settings.bucket, dir.display());
                store = Arc::new(DirectoryStore::new(dir));
                notifier = Arc::new(LogNotifier);
            }
            None => {
                let shared = load_shared_config(config).await;
                store = Arc::new(S3Store::new(&shared, config));
                notifier = if settings.recipient.is_empty() {
                    warn!("no alert recipient configured, alerts go to the log only");
                    Arc::new(LogNotifier)
                } else {
                    Arc::new(SnsNotifier::new(&shared))
                };
            }
        }
        Self::new(Arc::new(Orchestrator::new(settings, store, notifier)))
    }

    pub fn orchestrator(&self) -> Arc<Orchestrator> {
        self.orchestrator.clone()
    }

    pub async fn execute(&self) -> WorkflowResult {
        let summary = self.orchestrator.run_all().await;
        WorkflowResult {
            summary,
            metrics: self.orchestrator.metrics().snapshot(),
            detection_count: self.orchestrator.detections().len(),
            direct_count: self.orchestrator.direct().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sample::{write_sample_bucket, SampleConfig};
    use tempfile::TempDir;

    #[tokio::test]
    async fn runner_sweeps_a_seeded_directory() {
        let dir = TempDir::new().unwrap();
        let config = SampleConfig {
            count: 3,
            seed: 7,
        };
        let written = write_sample_bucket(dir.path(), &config).unwrap();
        assert!(written.detection_records >= 3);

        let runner = Runner::connect(&TrackerConfig::default(), Some(dir.path())).await;
        let result = runner.execute().await;

        assert_eq!(result.detection_count, written.detection_records);
        assert_eq!(
            result.direct_count,
            written.detection_records + written.direct_records
        );
        assert_eq!(result.metrics.notifications_sent, 1);
        assert!(result.report_line().contains("detections_sweep=ok"));
    }

    #[tokio::test]
    async fn missing_directory_reports_listing_failure() {
        let dir = TempDir::new().unwrap();
        let runner =
            Runner::connect(&TrackerConfig::default(), Some(&dir.path().join("absent"))).await;
        let result = runner.execute().await;

        assert_eq!(result.detection_count, 0);
        assert_eq!(result.metrics.listing_failures, 2);
        assert!(result.report_line().contains("direct_sweep=listing_failed"));
    }
}
