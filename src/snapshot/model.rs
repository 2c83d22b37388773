use serde_json::{Map, Value};

use crate::error::FormStateError;

/// Persisted state of one form: FieldKey -> JSON value, in insertion order.
pub type Snapshot = Map<String, Value>;

/// Parses a stored snapshot. Anything that is not a JSON object is corrupt
/// and yields `None`.
pub fn parse_snapshot(raw: &str) -> Option<Snapshot> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

pub fn serialize_snapshot(snapshot: &Snapshot) -> Result<String, FormStateError> {
    serde_json::to_string(snapshot).map_err(|e| FormStateError::JsonSerialize {
        context: "snapshot".into(),
        source: e,
    })
}
