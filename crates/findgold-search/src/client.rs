//! HTTP client for the FindGold backend proxy (`/api/chat`,
//! `/api/analyze-image`).

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::SearchError;

pub const DEFAULT_BACKEND_URL: &str = "https://findgold-api.onrender.com/api";

/// Client for the backend proxy.
///
/// Both endpoints answer with the model's message object (`role`,
/// `content`, ...), returned here as raw JSON for the services to pick apart.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    messages: &'a [Value],
}

#[derive(Serialize)]
struct AnalyzeImageBody<'a> {
    image: &'a str,
    prompt: &'a str,
}

impl BackendClient {
    /// Creates a client for the hosted backend.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new() -> Result<Self, SearchError> {
        Self::with_base_url(DEFAULT_BACKEND_URL)
    }

    /// Creates a client for a backend at `base_url` (the `/api` prefix included).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SearchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(base_url: &str) -> Result<Self, SearchError> {
        let client = Client::builder().user_agent("findgold/0.1").build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// `POST /chat` with `{ "messages": [...] }`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::UnexpectedStatus`] on a non-2xx response.
    /// - [`SearchError::Deserialize`] if the body is not JSON.
    pub async fn chat(&self, messages: &[Value]) -> Result<Value, SearchError> {
        self.post_json("chat", &ChatBody { messages }).await
    }

    /// `POST /analyze-image` with `{ "image", "prompt" }`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::chat`].
    pub async fn analyze_image(&self, image: &str, prompt: &str) -> Result<Value, SearchError> {
        self.post_json("analyze-image", &AnalyzeImageBody { image, prompt })
            .await
    }

    fn endpoint(&self, name: &str) -> Url {
        self.base_url
            .join(name)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn post_json<B: Serialize>(&self, name: &str, body: &B) -> Result<Value, SearchError> {
        let url = self.endpoint(name);
        let response = self.client.post(url.clone()).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SearchError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

/// Reads a non-empty string field from a model message.
pub(crate) fn text_field<'a>(message: &'a Value, key: &str) -> Option<&'a str> {
    message
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// The single user message the services send through `/chat`.
pub(crate) fn user_message(content: &str) -> Value {
    serde_json::json!({ "role": "user", "content": content })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_appended_to_api_prefix() {
        let client = BackendClient::with_base_url("https://findgold.example/api").expect("client");
        assert_eq!(
            client.endpoint("chat").as_str(),
            "https://findgold.example/api/chat"
        );
        assert_eq!(
            client.endpoint("analyze-image").as_str(),
            "https://findgold.example/api/analyze-image"
        );
    }

    #[test]
    fn text_field_ignores_blank_and_non_string() {
        let message = serde_json::json!({ "content": "  ", "description": 3, "name": "ok" });
        assert_eq!(text_field(&message, "content"), None);
        assert_eq!(text_field(&message, "description"), None);
        assert_eq!(text_field(&message, "missing"), None);
        assert_eq!(text_field(&message, "name"), Some("ok"));
    }

    #[test]
    fn user_message_shape() {
        let message = user_message("Bonjour");
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"], "Bonjour");
    }
}
