//! Ingestion and presentation core for the earthquake tracker.
//!
//! Two sweeps pull JSON detection documents out of an object-storage bucket,
//! flatten them into record collections, and raise an SMS alert when the
//! detections folder yields anything. The render module turns the collections
//! into the map markers and cards the dashboard shows.

pub mod ingest;
pub mod notify;
pub mod prelude;
pub mod records;
pub mod render;
pub mod storage;
pub mod telemetry;

pub use ingest::Orchestrator;
pub use prelude::{IngestError, IngestSettings, NotifyError, StorageError, SweepFilter};
