pub mod collection;
pub mod orchestrator;
pub mod sweep;

pub use collection::RecordCollection;
pub use orchestrator::{IngestSummary, Orchestrator, SweepStatus};
pub use sweep::{SkippedKey, Sweep, SweepOutcome, SweepReport};
