//! Client for the chat-completions API that does the actual reasoning
//! behind FindGold's searches and image analyses.

pub mod client;
pub mod error;
pub mod types;

pub use client::CompletionsClient;
pub use error::OpenAiError;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, Choice};
