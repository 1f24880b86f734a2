//! AWS-backed implementations of the storage and notification ports.

pub mod s3;
pub mod sns;

pub use s3::S3Store;
pub use sns::SnsNotifier;

use crate::workflow::config::TrackerConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;

/// Loads credentials from the standard provider chain, region from config.
pub async fn load_shared_config(config: &TrackerConfig) -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await
}
