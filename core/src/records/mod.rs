pub mod detection;
pub mod direct;
pub mod document;

pub use detection::{DetectionRecord, Prediction};
pub use direct::DirectDetectionRecord;
pub use document::{flatten_document, FromDocument};
