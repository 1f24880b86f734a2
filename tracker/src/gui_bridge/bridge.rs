use crate::gui_bridge::model::StatusModel;
use anyhow::Context;
use log::info;
use quakecore::ingest::Orchestrator;
use quakecore::render::{DashboardView, RenderSurface};
use std::{
    future::Future,
    net::SocketAddr,
    sync::{Arc, RwLock},
};
use warp::Filter;

fn snapshot_of(state: &RwLock<DashboardView>) -> DashboardView {
    state.read().map(|view| view.clone()).unwrap_or_default()
}

/// Bridge that hosts the dashboard HTTP endpoint for the visualizer.
///
/// The served view is kept current by a task subscribed to the orchestrator's
/// collections, so requests never wait on a sweep.
pub struct GuiBridge {
    state: Arc<RwLock<DashboardView>>,
    orchestrator: Arc<Orchestrator>,
}

impl GuiBridge {
    /// Must be called from within a tokio runtime.
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let mut surface = RenderSurface::attach(&orchestrator);
        let state = Arc::new(RwLock::new(surface.current()));
        let state_for_task = state.clone();

        tokio::spawn(async move {
            while let Some(view) = surface.next_view().await {
                if let Ok(mut guard) = state_for_task.write() {
                    *guard = view;
                }
            }
        });

        Self {
            state,
            orchestrator,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let orchestrator = self.orchestrator.clone();
        let orchestrator_filter = warp::any().map(move || orchestrator.clone());

        let dashboard_route = warp::path("dashboard")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<DashboardView>>| warp::reply::json(&snapshot_of(&state)));

        let status_route = warp::path("status")
            .and(warp::path::end())
            .and(warp::get())
            .and(orchestrator_filter.clone())
            .map(|orchestrator: Arc<Orchestrator>| {
                warp::reply::json(&StatusModel::from_orchestrator(&orchestrator))
            });

        let refresh_route = warp::path("refresh")
            .and(warp::path::end())
            .and(warp::post())
            .and(orchestrator_filter)
            .and_then(|orchestrator: Arc<Orchestrator>| async move {
                info!("[GUI] refresh requested");
                let summary = orchestrator.run_all().await;
                Ok::<_, warp::Rejection>(warp::reply::json(&summary))
            });

        dashboard_route.or(status_route).or(refresh_route)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve(
        &self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding dashboard bridge on {}", addr))?;
        info!("[GUI] dashboard bridge listening on {}", bound);
        server.await;
        Ok(())
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> DashboardView {
        snapshot_of(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakecore::ingest::IngestSummary;
    use quakecore::notify::RecordingNotifier;
    use quakecore::prelude::IngestSettings;
    use quakecore::storage::MemoryStore;
    use std::time::Duration;

    fn bridge_over(store: Arc<MemoryStore>) -> (GuiBridge, Arc<Orchestrator>) {
        let orchestrator = Arc::new(Orchestrator::new(
            IngestSettings::new("bucket", "+15550100"),
            store,
            Arc::new(RecordingNotifier::new()),
        ));
        (GuiBridge::new(orchestrator.clone()), orchestrator)
    }

    async fn wait_for_alerts(bridge: &GuiBridge, expected: usize) -> DashboardView {
        for _ in 0..50 {
            let view = bridge.snapshot();
            if view.alerts.len() == expected {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        bridge.snapshot()
    }

    #[tokio::test]
    async fn gui_bridge_tracks_collection_updates() {
        let store = Arc::new(MemoryStore::new("bucket"));
        store.put(
            "detections/1.json",
            r#"[{"location":"Tokyo","latitude":35.6,"longitude":139.7,"hazardType":"quake"}]"#,
        );
        let (bridge, orchestrator) = bridge_over(store);
        assert!(bridge.snapshot().alerts.is_empty());

        orchestrator.run_all().await;
        let view = wait_for_alerts(&bridge, 1).await;
        assert_eq!(view.alerts[0].location, "Tokyo");
        assert_eq!(view.map.markers.len(), 1);
    }

    #[tokio::test]
    async fn dashboard_route_serves_the_current_view() {
        let store = Arc::new(MemoryStore::new("bucket"));
        store.put("other.json", r#"{"af":1,"iif":2,"data_from":"esp32-7"}"#);
        let (bridge, orchestrator) = bridge_over(store);
        orchestrator.run_direct_sweep().await.unwrap();
        for _ in 0..50 {
            if bridge.snapshot().show_direct {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let response = warp::test::request()
            .method("GET")
            .path("/dashboard")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), 200);
        let view: DashboardView = serde_json::from_slice(response.body()).unwrap();
        assert!(view.show_direct);
        assert_eq!(view.direct[0].data_from, "esp32-7");
    }

    #[tokio::test]
    async fn refresh_route_reruns_both_sweeps() {
        let store = Arc::new(MemoryStore::new("bucket"));
        store.put("detections/1.json", r#"[{"location":"Lima"}]"#);
        let (bridge, orchestrator) = bridge_over(store);

        let response = warp::test::request()
            .method("POST")
            .path("/refresh")
            .reply(&bridge.routes())
            .await;
        assert_eq!(response.status(), 200);
        let summary: IngestSummary = serde_json::from_slice(response.body()).unwrap();
        assert!(summary.detections.is_some());
        assert!(summary.direct.is_some());
        assert_eq!(orchestrator.detections().len(), 1);

        let status = warp::test::request()
            .method("GET")
            .path("/status")
            .reply(&bridge.routes())
            .await;
        let model: StatusModel = serde_json::from_slice(status.body()).unwrap();
        assert_eq!(model.detection_count, 1);
        assert_eq!(model.metrics.notifications_sent, 1);
    }
}
