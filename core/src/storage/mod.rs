//! Object-storage port consumed by the ingestion sweeps.
//!
//! Backends implement [`ObjectStore`]; the sweeps only ever talk to the
//! [`ObjectLister`] and [`ObjectFetcher`] wrappers around it.

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use crate::prelude::{StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Bucket listing and object retrieval.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every key in `bucket` starting with `prefix`, in backend order.
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> StorageResult<Vec<String>>;

    /// Raw body of one object.
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;
}

/// Lists object keys, hiding folder placeholder objects.
#[derive(Clone)]
pub struct ObjectLister {
    store: Arc<dyn ObjectStore>,
}

impl ObjectLister {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, bucket: &str, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        let keys = self.store.list_objects(bucket, prefix).await?;
        Ok(keys.into_iter().filter(|key| !key.ends_with('/')).collect())
    }
}

/// Fetches object bodies as text.
#[derive(Clone)]
pub struct ObjectFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ObjectFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn fetch(&self, bucket: &str, key: &str) -> StorageResult<String> {
        let bytes = self.store.get_object(bucket, key).await?;
        String::from_utf8(bytes).map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lister_skips_folder_placeholders() {
        let store = MemoryStore::new("bucket");
        store.put("detections/", "");
        store.put("detections/1.json", "[]");
        let lister = ObjectLister::new(Arc::new(store));

        let keys = lister.list("bucket", Some("detections/")).await.unwrap();
        assert_eq!(keys, vec!["detections/1.json".to_string()]);
    }

    #[tokio::test]
    async fn fetcher_reports_invalid_utf8_as_decode_error() {
        let store = MemoryStore::new("bucket");
        store.put_bytes("bad.json", vec![0xff, 0xfe, 0x00]);
        let fetcher = ObjectFetcher::new(Arc::new(store));

        let err = fetcher.fetch("bucket", "bad.json").await.unwrap_err();
        assert!(matches!(err, StorageError::Decode { ref key, .. } if key == "bad.json"));
    }

    #[tokio::test]
    async fn fetcher_passes_missing_keys_through() {
        let fetcher = ObjectFetcher::new(Arc::new(MemoryStore::new("bucket")));
        let err = fetcher.fetch("bucket", "gone.json").await.unwrap_err();
        assert!(matches!(err, StorageError::ObjectNotFound(_)));
    }
}
