use serde_json::Value;

/// Record types that can be normalized from an arbitrary JSON value.
pub trait FromDocument: Sized {
    fn from_value(value: &Value) -> Self;
}

/// Flattens one stored document into records.
///
/// An array yields one record per element; any other value yields exactly one.
pub fn flatten_document<R: FromDocument>(document: &Value) -> Vec<R> {
    match document {
        Value::Array(items) => items.iter().map(R::from_value).collect(),
        other => vec![R::from_value(other)],
    }
}
