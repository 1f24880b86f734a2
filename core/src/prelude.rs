use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on concurrent object fetches within one sweep.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 16;
/// Default per-fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared configuration for the ingestion sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    pub bucket: String,
    pub detections_prefix: String,
    pub json_suffix: String,
    pub recipient: String,
    pub alert_message: String,
    pub fetch_concurrency: usize,
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,
}

impl IngestSettings {
    pub fn new(bucket: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            detections_prefix: "detections/".into(),
            json_suffix: ".json".into(),
            recipient: recipient.into(),
            alert_message: crate::notify::ALERT_MESSAGE.into(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn detections_filter(&self) -> SweepFilter {
        SweepFilter::Prefix(self.detections_prefix.clone())
    }

    pub fn direct_filter(&self) -> SweepFilter {
        SweepFilter::Suffix(self.json_suffix.clone())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Key selection applied by a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepFilter {
    /// Passed to the backend listing as a key prefix.
    Prefix(String),
    /// Full-bucket listing, keys kept only when they end with the suffix.
    Suffix(String),
}

impl SweepFilter {
    pub fn list_prefix(&self) -> Option<&str> {
        match self {
            SweepFilter::Prefix(prefix) => Some(prefix.as_str()),
            SweepFilter::Suffix(_) => None,
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        match self {
            SweepFilter::Prefix(prefix) => key.starts_with(prefix.as_str()),
            SweepFilter::Suffix(suffix) => key.ends_with(suffix.as_str()),
        }
    }
}

/// Failures reported by an object-storage backend.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("object not found: {0}")]
    ObjectNotFound(String),
    #[error("object {key} is not valid utf-8: {source}")]
    Decode {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Per-key ingestion failure. Only `Storage(Unavailable)` during listing ends a sweep.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("object {key} is not valid json: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("fetching {key} timed out after {elapsed:?}")]
    Timeout { key: String, elapsed: Duration },
}

/// Failures reported by a notification channel.
#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("notification rejected: {0}")]
    Rejected(String),
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_filter_lists_with_prefix() {
        let filter = SweepFilter::Prefix("detections/".into());
        assert_eq!(filter.list_prefix(), Some("detections/"));
        assert!(filter.accepts("detections/1.json"));
        assert!(!filter.accepts("other.json"));
    }

    #[test]
    fn suffix_filter_lists_whole_bucket() {
        let filter = SweepFilter::Suffix(".json".into());
        assert_eq!(filter.list_prefix(), None);
        assert!(filter.accepts("detections/1.json"));
        assert!(!filter.accepts("notes.txt"));
    }

    #[test]
    fn settings_default_to_the_detections_folder() {
        let settings = IngestSettings::new("earthquake-sensor", "+10000000000");
        assert_eq!(
            settings.detections_filter(),
            SweepFilter::Prefix("detections/".into())
        );
        assert_eq!(settings.fetch_concurrency, DEFAULT_FETCH_CONCURRENCY);
    }
}
