use chrono::{DateTime, Utc};
use serde_json::Value;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

pub fn text_or(value: Option<&str>, placeholder: &str) -> String {
    value.unwrap_or(placeholder).to_string()
}

pub fn confidence(value: Option<f64>) -> String {
    value
        .map(|c| format!("{:.2}", c))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Strings print bare, other JSON values print as JSON text.
pub fn raw_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn confidence_uses_two_decimals() {
        assert_eq!(confidence(Some(0.91234)), "0.91");
        assert_eq!(confidence(Some(0.0)), "0.00");
        assert_eq!(confidence(None), "N/A");
    }

    #[test]
    fn timestamps_render_in_utc() {
        let ts = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
        assert_eq!(timestamp(Some(&ts)), "2023-11-14 22:13:20 UTC");
        assert_eq!(timestamp(None), "N/A");
    }

    #[test]
    fn raw_values_print_without_quotes() {
        assert_eq!(raw_value(Some(&json!("esp32-7"))), "esp32-7");
        assert_eq!(raw_value(Some(&json!(1.5))), "1.5");
        assert_eq!(raw_value(None), "N/A");
    }
}
