//! Field-by-field merging of configuration tiers.
//!
//! Tiers are converted to `serde_json::Value` and folded together. Maps merge
//! recursively, everything else (lists included) is replaced by the higher tier.

use serde_json::Value;

/// Merge `overlay` onto `base`, with `overlay` winning on conflicts.
///
/// A `null` in the overlay means "not specified" and keeps the base value.
///
/// # Example
/// ```
/// use serde_json::json;
/// use project_dashboard::config::deep_merge;
///
/// let base = json!({"data": {"encoding": "ISO-8859-1", "missing_values": ["n.a"]}});
/// let overlay = json!({"data": {"missing_values": ["-", "NA"]}});
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["data"]["encoding"], "ISO-8859-1");
/// assert_eq!(merged["data"]["missing_values"], json!(["-", "NA"]));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold a sequence of tiers, lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
