use crate::prelude::{IngestError, IngestResult, StorageResult, SweepFilter};
use crate::records::{flatten_document, FromDocument};
use crate::storage::{ObjectFetcher, ObjectLister, ObjectStore};
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A key dropped from a sweep, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedKey {
    pub key: String,
    pub reason: String,
}

/// What one completed sweep did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub filter: SweepFilter,
    pub keys_listed: usize,
    pub records: usize,
    pub skipped: Vec<SkippedKey>,
    pub notified: bool,
}

/// Records gathered by a sweep plus its report.
#[derive(Debug)]
pub struct SweepOutcome<R> {
    pub records: Vec<R>,
    pub report: SweepReport,
}

/// List-then-fetch pass over one bucket.
///
/// Fetches run with bounded concurrency and a per-fetch timeout. Records are
/// concatenated in listing order. A key that fails to fetch or parse is
/// skipped; only a listing failure fails the sweep.
#[derive(Clone)]
pub struct Sweep {
    lister: ObjectLister,
    fetcher: ObjectFetcher,
    concurrency: usize,
    timeout: Duration,
}

impl Sweep {
    pub fn new(store: Arc<dyn ObjectStore>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            lister: ObjectLister::new(store.clone()),
            fetcher: ObjectFetcher::new(store),
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub async fn run<R: FromDocument + Send>(
        &self,
        bucket: &str,
        filter: &SweepFilter,
    ) -> StorageResult<SweepOutcome<R>> {
        let keys = self
            .lister
            .list(bucket, filter.list_prefix())
            .await?
            .into_iter()
            .filter(|key| filter.accepts(key))
            .collect::<Vec<_>>();
        debug!("{:?} listed {} keys in {}", filter, keys.len(), bucket);

        let results = stream::iter((0..keys.len()).map(|idx| self.load::<R>(bucket, &keys[idx])))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for (key, result) in keys.iter().zip(results) {
            match result {
                Ok(mut loaded) => records.append(&mut loaded),
                Err(err) => {
                    warn!("skipping {}: {}", key, err);
                    skipped.push(SkippedKey {
                        key: key.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let report = SweepReport {
            filter: filter.clone(),
            keys_listed: keys.len(),
            records: records.len(),
            skipped,
            notified: false,
        };
        Ok(SweepOutcome { records, report })
    }

    async fn load<R: FromDocument>(&self, bucket: &str, key: &str) -> IngestResult<Vec<R>> {
        let text = tokio::time::timeout(self.timeout, self.fetcher.fetch(bucket, key))
            .await
            .map_err(|_| IngestError::Timeout {
                key: key.to_string(),
                elapsed: self.timeout,
            })??;
        let document: Value = serde_json::from_str(&text).map_err(|source| IngestError::Parse {
            key: key.to_string(),
            source,
        })?;
        Ok(flatten_document(&document))
    }
}
