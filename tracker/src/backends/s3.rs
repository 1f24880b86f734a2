use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use log::debug;
use quakecore::prelude::{StorageError, StorageResult};
use quakecore::storage::ObjectStore;

use crate::workflow::config::TrackerConfig;

/// Bucket access through `aws-sdk-s3`.
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    pub fn new(shared: &aws_config::SdkConfig, config: &TrackerConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(shared);
        if let Some(url) = config.endpoint_url.as_deref() {
            builder = builder.endpoint_url(url);
        }
        if config.force_path_style || config.endpoint_url.is_some() {
            builder = builder.force_path_style(true);
        }
        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut req = self.client.list_objects_v2().bucket(bucket);
            if let Some(prefix) = prefix {
                req = req.prefix(prefix);
            }
            if let Some(token) = token.as_deref() {
                req = req.continuation_token(token);
            }
            let resp = req.send().await.map_err(|err| {
                StorageError::Unavailable(format!(
                    "list_objects_v2 on {} failed: {}",
                    bucket,
                    DisplayErrorContext(&err)
                ))
            })?;
            pages += 1;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match resp.next_continuation_token() {
                Some(next) if resp.is_truncated().unwrap_or(false) => token = Some(next.to_string()),
                _ => break,
            }
        }

        debug!("listed {} keys from {} in {} pages", keys.len(), bucket, pages);
        Ok(keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    StorageError::ObjectNotFound(key.to_string())
                } else {
                    StorageError::Unavailable(format!(
                        "get_object {} failed: {}",
                        key,
                        DisplayErrorContext(&service)
                    ))
                }
            })?;

        let body = resp.body.collect().await.map_err(|err| {
            StorageError::Unavailable(format!("reading body of {} failed: {}", key, err))
        })?;
        Ok(body.into_bytes().to_vec())
    }
}
