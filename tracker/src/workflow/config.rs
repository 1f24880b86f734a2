use anyhow::Context;
use quakecore::notify::ALERT_MESSAGE;
use quakecore::prelude::{IngestSettings, DEFAULT_FETCH_CONCURRENCY, DEFAULT_FETCH_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides the SMS recipient.
pub const RECIPIENT_ENV: &str = "TRACKER_RECIPIENT";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub bucket: String,
    pub detections_prefix: String,
    pub json_suffix: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub recipient: String,
    pub alert_message: String,
    pub fetch_concurrency: usize,
    pub fetch_timeout_secs: u64,
    pub bind: SocketAddr,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            bucket: "earthquake-sensor".into(),
            detections_prefix: "detections/".into(),
            json_suffix: ".json".into(),
            region: "ap-south-1".into(),
            endpoint_url: None,
            force_path_style: false,
            recipient: String::new(),
            alert_message: ALERT_MESSAGE.into(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

impl TrackerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading tracker config {}", path_ref.display()))?;
        let config: TrackerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing tracker config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(bucket: Option<String>, region: Option<String>) -> Self {
        Self::default().with_overrides(bucket, region)
    }

    /// Command-line values win over whatever the file said.
    pub fn with_overrides(mut self, bucket: Option<String>, region: Option<String>) -> Self {
        if let Some(bucket) = bucket {
            self.bucket = bucket;
        }
        if let Some(region) = region {
            self.region = region;
        }
        self
    }

    pub fn with_recipient_override(mut self, recipient: Option<String>) -> Self {
        if let Some(recipient) = recipient.filter(|r| !r.trim().is_empty()) {
            self.recipient = recipient;
        }
        self
    }

    pub fn to_ingest_settings(&self) -> IngestSettings {
        IngestSettings {
            bucket: self.bucket.clone(),
            detections_prefix: self.detections_prefix.clone(),
            json_suffix: self.json_suffix.clone(),
            recipient: self.recipient.clone(),
            alert_message: self.alert_message.clone(),
            fetch_concurrency: self.fetch_concurrency.max(1),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_overrides_defaults() {
        let cfg = TrackerConfig::from_args(Some("quake-lab".into()), None);
        assert_eq!(cfg.bucket, "quake-lab");
        assert_eq!(cfg.region, "ap-south-1");
        assert_eq!(cfg.to_ingest_settings().detections_prefix, "detections/");
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"bucket: quake-lab\nregion: eu-west-1\nrecipient: \"+15550100\"\nfetch_concurrency: 4\nfetch_timeout_secs: 3\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = TrackerConfig::load(&path).unwrap();
        assert_eq!(cfg.bucket, "quake-lab");
        assert_eq!(cfg.json_suffix, ".json");

        let settings = cfg.to_ingest_settings();
        assert_eq!(settings.fetch_concurrency, 4);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(3));
        assert_eq!(settings.recipient, "+15550100");
    }

    #[test]
    fn blank_recipient_override_is_ignored() {
        let cfg = TrackerConfig {
            recipient: "+15550100".into(),
            ..Default::default()
        }
        .with_recipient_override(Some("  ".into()));
        assert_eq!(cfg.recipient, "+15550100");
    }
}
