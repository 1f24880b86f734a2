use super::projection::{project, DashboardView};
use crate::ingest::Orchestrator;
use crate::records::{DetectionRecord, DirectDetectionRecord};
use std::sync::Arc;
use tokio::sync::watch;

/// Subscriber that re-projects the dashboard whenever either collection changes.
pub struct RenderSurface {
    detections: watch::Receiver<Arc<Vec<DetectionRecord>>>,
    direct: watch::Receiver<Arc<Vec<DirectDetectionRecord>>>,
}

impl RenderSurface {
    pub fn attach(orchestrator: &Orchestrator) -> Self {
        Self {
            detections: orchestrator.detections().subscribe(),
            direct: orchestrator.direct().subscribe(),
        }
    }

    pub fn current(&self) -> DashboardView {
        let detections = self.detections.borrow().clone();
        let direct = self.direct.borrow().clone();
        project(&detections, &direct)
    }

    /// Waits for the next collection update. `None` once the orchestrator is gone.
    pub async fn next_view(&mut self) -> Option<DashboardView> {
        tokio::select! {
            changed = self.detections.changed() => changed.ok()?,
            changed = self.direct.changed() => changed.ok()?,
        }
        Some(self.current())
    }
}
