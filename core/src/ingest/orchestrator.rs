use super::collection::RecordCollection;
use super::sweep::{Sweep, SweepReport};
use crate::notify::{fire_and_forget, Notifier};
use crate::prelude::{IngestSettings, StorageError, SweepFilter};
use crate::records::{DetectionRecord, DirectDetectionRecord};
use crate::storage::ObjectStore;
use crate::telemetry::IngestMetrics;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Result of the most recent attempt at one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SweepStatus {
    Completed(SweepReport),
    ListingFailed { error: String },
}

/// Latest status of both sweeps, `None` until a sweep has finished once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub detections: Option<SweepStatus>,
    pub direct: Option<SweepStatus>,
}

/// Owns both record collections and drives the sweeps that fill them.
pub struct Orchestrator {
    settings: IngestSettings,
    sweep: Sweep,
    notifier: Arc<dyn Notifier>,
    detections: RecordCollection<DetectionRecord>,
    direct: RecordCollection<DirectDetectionRecord>,
    metrics: IngestMetrics,
    summary: Mutex<IngestSummary>,
}

impl Orchestrator {
    pub fn new(
        settings: IngestSettings,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let sweep = Sweep::new(store, settings.fetch_concurrency, settings.fetch_timeout);
        Self {
            settings,
            sweep,
            notifier,
            detections: RecordCollection::new(),
            direct: RecordCollection::new(),
            metrics: IngestMetrics::new(),
            summary: Mutex::new(IngestSummary::default()),
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    pub fn detections(&self) -> &RecordCollection<DetectionRecord> {
        &self.detections
    }

    pub fn direct(&self) -> &RecordCollection<DirectDetectionRecord> {
        &self.direct
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    pub fn summary(&self) -> IngestSummary {
        self.summary
            .lock()
            .map(|summary| summary.clone())
            .unwrap_or_default()
    }

    /// Runs both sweeps concurrently; neither waits on the other.
    pub async fn run_all(&self) -> IngestSummary {
        let (detections, direct) = tokio::join!(self.run_detections_sweep(), self.run_direct_sweep());
        IngestSummary {
            detections: Some(status_of(&detections)),
            direct: Some(status_of(&direct)),
        }
    }

    /// Prefixed sweep over the detections folder; alerts once when it yields records.
    pub async fn run_detections_sweep(&self) -> Result<SweepReport, StorageError> {
        let filter = self.settings.detections_filter();
        let result = self
            .sweep
            .run::<DetectionRecord>(&self.settings.bucket, &filter)
            .await;

        let report = match result {
            Ok(outcome) => {
                let non_empty = !outcome.records.is_empty();
                self.detections.replace(outcome.records);
                let mut report = outcome.report;
                if non_empty {
                    let delivered = fire_and_forget(
                        self.notifier.as_ref(),
                        &self.settings.alert_message,
                        &self.settings.recipient,
                        self.settings.fetch_timeout,
                    )
                    .await;
                    self.metrics.record_notification(delivered);
                    report.notified = true;
                }
                self.finish(&report);
                Ok(report)
            }
            Err(err) => Err(self.fail(&filter, err)),
        };
        self.store_status(|summary, status| summary.detections = Some(status), &report);
        report
    }

    /// Unfiltered sweep over every JSON key in the bucket.
    pub async fn run_direct_sweep(&self) -> Result<SweepReport, StorageError> {
        let filter = self.settings.direct_filter();
        let result = self
            .sweep
            .run::<DirectDetectionRecord>(&self.settings.bucket, &filter)
            .await;

        let report = match result {
            Ok(outcome) => {
                self.direct.replace(outcome.records);
                self.finish(&outcome.report);
                Ok(outcome.report)
            }
            Err(err) => Err(self.fail(&filter, err)),
        };
        self.store_status(|summary, status| summary.direct = Some(status), &report);
        report
    }

    fn finish(&self, report: &SweepReport) {
        self.metrics.record_sweep(report.records, report.skipped.len());
        info!(
            "sweep {:?} on {}: {} keys, {} records, {} skipped",
            report.filter,
            self.settings.bucket,
            report.keys_listed,
            report.records,
            report.skipped.len()
        );
    }

    fn fail(&self, filter: &SweepFilter, err: StorageError) -> StorageError {
        self.metrics.record_listing_failure();
        error!(
            "sweep {:?} on {} failed, keeping previous records: {}",
            filter, self.settings.bucket, err
        );
        err
    }

    fn store_status(
        &self,
        apply: impl FnOnce(&mut IngestSummary, SweepStatus),
        result: &Result<SweepReport, StorageError>,
    ) {
        if let Ok(mut summary) = self.summary.lock() {
            apply(&mut summary, status_of(result));
        }
    }
}

fn status_of(result: &Result<SweepReport, StorageError>) -> SweepStatus {
    match result {
        Ok(report) => SweepStatus::Completed(report.clone()),
        Err(err) => SweepStatus::ListingFailed {
            error: err.to_string(),
        },
    }
}
