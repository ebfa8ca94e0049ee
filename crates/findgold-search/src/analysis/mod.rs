//! Photo and terrain analyses delegated to the model.
//!
//! Each service builds a French prompt, sends it through the backend and
//! reshapes the answer. Some swallow failures into fixed, still useful
//! answers (free image analysis, rock analysis); the others propagate.

mod gold_line;
mod image;
mod river;
mod rocks;

use serde_json::Value;

use crate::normalize::extract_json;

pub use gold_line::{analyze_gold_line, GoldLineAnalysis};
pub use image::{analyze_image, encode_image_bytes, format_image, PROSPECTING_GUIDE};
pub use river::{analyze_geological_data, analyze_river_for_gold, combine_analysis, RiverAnalysis};
pub use rocks::{analyze_rocks, RockAnalysis, RockType};

/// Returns the structured part of a model message.
///
/// Vision answers arrive as a chat message whose `content` is either a JSON
/// document (when the model followed the requested format, possibly inside a
/// ```` ```json ```` fence) or prose. JSON content is returned as-is, prose
/// becomes `{ "description": prose }`, and a message without string content
/// is returned unchanged.
pub(crate) fn message_payload(message: Value) -> Value {
    let Some(content) = message.get("content").and_then(Value::as_str) else {
        return message;
    };

    match extract_json(content) {
        Some(doc @ Value::Object(_)) => doc,
        _ => serde_json::json!({ "description": content }),
    }
}

/// Deserializes `payload[key]`, falling back to `T::default()` when the
/// field is absent or has the wrong shape.
pub(crate) fn field_or_default<T>(payload: &Value, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    payload
        .get(key)
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}
