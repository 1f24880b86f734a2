use super::ObjectStore;
use crate::prelude::{StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-process bucket with failure injection, used by tests and demos.
pub struct MemoryStore {
    bucket: String,
    inner: Mutex<MemoryState>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<String, Vec<u8>>,
    unreachable: bool,
    failing_keys: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            inner: Mutex::new(MemoryState::default()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn put(&self, key: &str, body: &str) {
        self.put_bytes(key, body.as_bytes().to_vec());
    }

    pub fn put_bytes(&self, key: &str, body: Vec<u8>) {
        if let Ok(mut state) = self.inner.lock() {
            state.objects.insert(key.to_string(), body);
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut state) = self.inner.lock() {
            state.objects.remove(key);
        }
    }

    /// Makes every call fail with `StorageError::Unavailable`.
    pub fn set_unreachable(&self, unreachable: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.unreachable = unreachable;
        }
    }

    /// Makes fetches of `key` fail with a transport error.
    pub fn fail_key(&self, key: &str) {
        if let Ok(mut state) = self.inner.lock() {
            state.failing_keys.insert(key.to_string());
        }
    }

    /// Stalls fetches of `key` before answering.
    pub fn delay_key(&self, key: &str, delay: Duration) {
        if let Ok(mut state) = self.inner.lock() {
            state.delays.insert(key.to_string(), delay);
        }
    }

    /// Highest number of fetches observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn state(&self) -> StorageResult<std::sync::MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))
    }

    fn check_bucket(&self, bucket: &str, state: &MemoryState) -> StorageResult<()> {
        if state.unreachable {
            return Err(StorageError::Unavailable("memory store unreachable".into()));
        }
        if bucket != self.bucket {
            return Err(StorageError::Unavailable(format!(
                "access denied to bucket {}",
                bucket
            )));
        }
        Ok(())
    }

    async fn lookup(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let delay = {
            let state = self.state()?;
            self.check_bucket(bucket, &state)?;
            state.delays.get(key).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state()?;
        if state.failing_keys.contains(key) {
            return Err(StorageError::Unavailable(format!("connection reset reading {}", key)));
        }
        state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        let state = self.state()?;
        self.check_bucket(bucket, &state)?;
        let prefix = prefix.unwrap_or("");
        Ok(state
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let result = self.lookup(bucket, key).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_is_lexicographic_and_prefix_filtered() {
        let store = MemoryStore::new("bucket");
        store.put("detections/b.json", "{}");
        store.put("other.json", "{}");
        store.put("detections/a.json", "{}");

        let all = store.list_objects("bucket", None).await.unwrap();
        assert_eq!(all, vec!["detections/a.json", "detections/b.json", "other.json"]);

        let prefixed = store.list_objects("bucket", Some("detections/")).await.unwrap();
        assert_eq!(prefixed.len(), 2);
    }

    #[tokio::test]
    async fn wrong_bucket_is_denied() {
        let store = MemoryStore::new("bucket");
        let err = store.list_objects("elsewhere", None).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
