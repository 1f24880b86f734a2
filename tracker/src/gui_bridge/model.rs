use quakecore::ingest::{IngestSummary, Orchestrator};
use quakecore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusModel {
    pub bucket: String,
    pub detection_count: usize,
    pub direct_count: usize,
    pub metrics: MetricsSnapshot,
    pub last_sweeps: IngestSummary,
}

impl StatusModel {
    pub fn from_orchestrator(orchestrator: &Orchestrator) -> Self {
        Self {
            bucket: orchestrator.settings().bucket.clone(),
            detection_count: orchestrator.detections().len(),
            direct_count: orchestrator.direct().len(),
            metrics: orchestrator.metrics().snapshot(),
            last_sweeps: orchestrator.summary(),
        }
    }
}
