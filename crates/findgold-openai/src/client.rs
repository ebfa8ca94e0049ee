//! HTTP client for an OpenAI-compatible chat-completions endpoint.
//!
//! Wraps `reqwest` with bearer auth, request shaping and typed errors. No
//! retry or timeout policy is layered on top of the `reqwest` defaults: a
//! failed call surfaces once and the caller decides what to render.

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::OpenAiError;
use crate::types::{image_message, ChatCompletionRequest, ChatCompletionResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Client for the completions API.
///
/// Use [`CompletionsClient::new`] for the hosted API or
/// [`CompletionsClient::with_base_url`] to point at a compatible gateway or a
/// mock server in tests.
#[derive(Debug, Clone)]
pub struct CompletionsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    model: String,
    max_tokens: u32,
}

impl CompletionsClient {
    /// Creates a client pointed at the hosted API.
    ///
    /// # Errors
    ///
    /// Returns [`OpenAiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, max_tokens: u32) -> Result<Self, OpenAiError> {
        Self::with_base_url(api_key, model, max_tokens, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`OpenAiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`OpenAiError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        max_tokens: u32,
        base_url: &str,
    ) -> Result<Self, OpenAiError> {
        let client = Client::builder()
            .user_agent("findgold/0.1 (proxy)")
            .build()?;

        // Exactly one trailing slash, so `join` appends instead of replacing
        // the last path segment (`/v1` would otherwise be dropped).
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| OpenAiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            model: model.to_owned(),
            max_tokens,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `messages` as-is and returns the first choice's message.
    ///
    /// # Errors
    ///
    /// - [`OpenAiError::Http`] on network failure.
    /// - [`OpenAiError::Api`] on a non-2xx response.
    /// - [`OpenAiError::Deserialize`] if the body is not a completion.
    /// - [`OpenAiError::EmptyChoices`] if the completion has no choices.
    pub async fn chat(&self, messages: &[Value]) -> Result<Value, OpenAiError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };
        let response = self.complete(&request).await?;
        first_message(response)
    }

    /// Asks the model about an image: one user message carrying `prompt` as
    /// text and `image` (URL or data URI) as an image part.
    ///
    /// # Errors
    ///
    /// Same as [`CompletionsClient::chat`].
    pub async fn analyze_image(&self, image: &str, prompt: &str) -> Result<Value, OpenAiError> {
        self.chat(&[image_message(image, prompt)]).await
    }

    fn completions_url(&self) -> Url {
        // The base always ends in '/', and the relative path is a constant.
        self.base_url
            .join("chat/completions")
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn complete(
        &self,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let url = self.completions_url();
        tracing::debug!(model = %self.model, messages = request.messages.len(), "requesting completion");

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| OpenAiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

fn first_message(response: ChatCompletionResponse) -> Result<Value, OpenAiError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(OpenAiError::EmptyChoices)
}

/// Pulls `error.message` out of an API error body, falling back to the raw
/// body text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
