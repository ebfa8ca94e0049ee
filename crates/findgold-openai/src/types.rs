//! Wire types for `POST /chat/completions`.
//!
//! Messages are kept as raw JSON: the proxy forwards whatever the browser
//! sent and hands back the first choice's message untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Value],
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Value,
}

/// Builds the single user message used for image analysis: the prompt as
/// text followed by the image reference.
#[must_use]
pub fn image_message(image: &str, prompt: &str) -> Value {
    serde_json::json!({
        "role": "user",
        "content": [
            { "type": "text", "text": prompt },
            { "type": "image_url", "image_url": { "url": image } }
        ]
    })
}
