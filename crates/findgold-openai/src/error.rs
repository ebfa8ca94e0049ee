use thiserror::Error;

/// Errors returned by the completions client.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("completions API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The completion carried no choices to return.
    #[error("completion response contained no choices")]
    EmptyChoices,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
