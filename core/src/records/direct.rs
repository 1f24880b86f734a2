use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::FromDocument;

/// Record pushed straight into the bucket by an ESP32 sensor node.
///
/// Fields are display-only and kept untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectDetectionRecord {
    pub af: Option<Value>,
    pub iif: Option<Value>,
    pub data_from: Option<Value>,
}

impl FromDocument for DirectDetectionRecord {
    fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).filter(|v| !v.is_null()).cloned();
        Self {
            af: field("af"),
            iif: field("iif"),
            data_from: field("data_from"),
        }
    }
}
