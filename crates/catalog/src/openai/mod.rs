//! Chat-completion backends for the AI translator.
//!
//! The translator talks to a [`CompletionService`]; [`OpenAIClient`] is the
//! production implementation. Tests swap in a scripted service.

mod client;

pub use client::{OPENAI_CHAT_COMPLETIONS_URL, OpenAIClient};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when calling the completion API.
#[derive(Debug, Error)]
pub enum TranslationServiceError {
    /// HTTP request failed (connection, DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The API key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The response did not contain a completion.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

/// One system + user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Instructions for the model.
    pub system: String,
    /// Content to work on.
    pub user: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A chat-completion backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return the generated text (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns `TranslationServiceError` if the call fails.
    async fn complete(&self, request: &CompletionRequest)
    -> Result<String, TranslationServiceError>;

    /// Model identifier; part of the translation cache key.
    fn model(&self) -> &str;
}
