//! JSON encoding of stored values.

use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Encode `value` for the `value` column.
///
/// The encoded text is parsed back and compared with the input; values
/// that would come back different (float precision) are refused.
pub fn encode(id: &str, value: &Value) -> StoreResult<String> {
    let text = serde_json::to_string(value)?;
    let decoded: Value = serde_json::from_str(&text)?;
    if &decoded != value {
        return Err(StoreError::LossyValue { id: id.to_string() });
    }
    Ok(text)
}

/// Decode the text found in the `value` column of `id`.
pub fn decode(id: &str, text: &str) -> StoreResult<Value> {
    serde_json::from_str(text).map_err(|source| StoreError::Corrupt {
        id: id.to_string(),
        source,
    })
}
