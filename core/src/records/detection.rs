use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::FromDocument;

/// One model prediction attached to a detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub confidence: Option<f64>,
}

/// Normalized detection record read from the detections folder.
///
/// Every field is optional; consumers render placeholders for absent values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<String>,
    pub hazard_type: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub predictions: Vec<Prediction>,
}

impl DetectionRecord {
    /// Both coordinates, when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Confidence of the first prediction, if it carries one.
    pub fn primary_confidence(&self) -> Option<f64> {
        self.predictions.first().and_then(|p| p.confidence)
    }
}

impl FromDocument for DetectionRecord {
    fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let predictions = object
            .get("predictions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| Prediction {
                        confidence: item.get("confidence").and_then(Value::as_f64),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            latitude: object.get("latitude").and_then(Value::as_f64),
            longitude: object.get("longitude").and_then(Value::as_f64),
            location: object.get("location").and_then(display_text),
            hazard_type: object.get("hazardType").and_then(display_text),
            timestamp: object.get("timestamp").and_then(parse_timestamp),
            predictions,
        }
    }
}

/// Renders scalar JSON values as display text. Null, blank strings, arrays and
/// objects are absent.
pub(crate) fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numbers are epoch milliseconds; strings accept RFC 3339 and a few naive UTC layouts.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64)),
        Value::String(text) => parse_timestamp_text(text.trim()),
        _ => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_record_normalizes_every_field() {
        let record = DetectionRecord::from_value(&json!({
            "location": "Tokyo",
            "latitude": 35.6,
            "longitude": 139.7,
            "hazardType": "quake",
            "timestamp": 1_700_000_000_000_i64,
            "predictions": [{"confidence": 0.912}, {"confidence": 0.1}]
        }));

        assert_eq!(record.position(), Some((35.6, 139.7)));
        assert_eq!(record.location.as_deref(), Some("Tokyo"));
        assert_eq!(record.hazard_type.as_deref(), Some("quake"));
        assert_eq!(record.primary_confidence(), Some(0.912));
        assert_eq!(
            record.timestamp.map(|ts| ts.timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn non_numeric_coordinates_are_absent() {
        let record = DetectionRecord::from_value(&json!({
            "latitude": "35.6",
            "longitude": 139.7
        }));
        assert_eq!(record.latitude, None);
        assert_eq!(record.position(), None);
    }

    #[test]
    fn non_object_elements_become_empty_records() {
        assert_eq!(DetectionRecord::from_value(&json!(42)), DetectionRecord::default());
        assert_eq!(
            DetectionRecord::from_value(&Value::Null),
            DetectionRecord::default()
        );
    }

    #[test]
    fn string_timestamps_accept_common_layouts() {
        let rfc = parse_timestamp(&json!("2024-01-02T03:04:05+09:00")).unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-01-01T18:04:05+00:00");

        let naive = parse_timestamp(&json!("2024-01-02 03:04:05")).unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-01-02T03:04:05+00:00");

        let date = parse_timestamp(&json!("2024-01-02")).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        assert_eq!(parse_timestamp(&json!("yesterday")), None);
    }

    #[test]
    fn scalar_labels_are_displayed_as_text() {
        let record = DetectionRecord::from_value(&json!({"location": 7, "hazardType": null}));
        assert_eq!(record.location.as_deref(), Some("7"));
        assert_eq!(record.hazard_type, None);
    }

    #[test]
    fn blank_labels_are_absent() {
        let record = DetectionRecord::from_value(&json!({"location": "", "hazardType": "  "}));
        assert_eq!(record.location, None);
        assert_eq!(record.hazard_type, None);
    }
}
