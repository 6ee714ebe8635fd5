use serde::Serialize;

use crate::error::LosslessJsonError;
use crate::node::ValueNode;
use crate::value::JsonValue;

/// Builds a fresh CST value from anything serde can serialize, by way of
/// `serde_json::Value`.
pub fn node_from_serialize<T: Serialize>(value: &T) -> Result<ValueNode, LosslessJsonError> {
    let plain = serde_json::to_value(value)
        .map_err(|err| LosslessJsonError::simple(format!("Serialization failed: {}", err)))?;
    Ok(ValueNode::from_value(json_value_from_serde(&plain)))
}

/// Converts a `serde_json::Value` into this crate's plain value tree.
pub fn json_value_from_serde(value: &serde_json::Value) -> JsonValue {
    convert_from_serde(value, 256).unwrap_or(JsonValue::Null)
}

fn convert_from_serde(
    value: &serde_json::Value,
    recursion_limit: usize,
) -> Result<JsonValue, LosslessJsonError> {
    if recursion_limit == 0 {
        return Err(LosslessJsonError::simple(
            "Depth limit exceeded - possible circular reference",
        ));
    }
    Ok(match value {
        serde_json::Value::Null => JsonValue::Null,
        serde_json::Value::Bool(b) => JsonValue::Bool(*b),
        serde_json::Value::Number(n) => JsonValue::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => JsonValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(convert_from_serde(item, recursion_limit - 1)?);
            }
            JsonValue::Array(out)
        }
        serde_json::Value::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (key, item) in map.iter() {
                out.push((key.clone(), convert_from_serde(item, recursion_limit - 1)?));
            }
            JsonValue::Object(out)
        }
    })
}

/// Converts this crate's plain value tree into a `serde_json::Value`.
///
/// `NaN` and the infinities have no strict-JSON representation and map to
/// null, matching what `serde_json` itself does for non-finite floats.
pub fn json_value_to_serde(value: &JsonValue) -> serde_json::Value {
    match value {
        JsonValue::Null => serde_json::Value::Null,
        JsonValue::Bool(b) => serde_json::Value::Bool(*b),
        JsonValue::Number(n) => match serde_json::Number::from_f64(*n) {
            Some(num) => serde_json::Value::Number(num),
            None => serde_json::Value::Null,
        },
        JsonValue::String(s) => serde_json::Value::String(s.clone()),
        JsonValue::Array(items) => {
            serde_json::Value::Array(items.iter().map(json_value_to_serde).collect())
        }
        JsonValue::Object(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (key, item) in entries {
                map.insert(key.clone(), json_value_to_serde(item));
            }
            serde_json::Value::Object(map)
        }
    }
}
