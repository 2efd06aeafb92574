//! `OpenAI` chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{CompletionRequest, CompletionService, TranslationServiceError};
use crate::config::OpenAIConfig;

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the `OpenAI` chat-completions API.
#[derive(Clone)]
pub struct OpenAIClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Create a client for the model in `config`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the API key cannot be sent as a header, or
    /// `Http` if the HTTP client cannot be built.
    pub fn new(config: &OpenAIConfig) -> Result<Self, TranslationServiceError> {
        Self::with_url(config, OPENAI_CHAT_COMPLETIONS_URL)
    }

    /// Create a client that posts to `url` (used against local test servers).
    ///
    /// # Errors
    ///
    /// See [`OpenAIClient::new`].
    pub fn with_url(
        config: &OpenAIConfig,
        url: impl Into<String>,
    ) -> Result<Self, TranslationServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
                .map_err(|_| {
                    TranslationServiceError::Unauthorized(
                        "API key contains invalid header characters".to_string(),
                    )
                })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            model: config.model.clone(),
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: &request.system,
            },
            ChatMessage {
                role: "user",
                content: &request.user,
            },
        ];

        // gpt-5 models only accept the default temperature and the newer
        // token limit parameter.
        if self.model.to_ascii_lowercase().contains("gpt-5") {
            ChatRequest {
                model: &self.model,
                messages,
                temperature: 1.0,
                max_tokens: None,
                max_completion_tokens: Some(request.max_tokens),
            }
        } else {
            ChatRequest {
                model: &self.model,
                messages,
                temperature: 0.0,
                max_tokens: Some(request.max_tokens),
                max_completion_tokens: None,
            }
        }
    }
}

#[async_trait]
impl CompletionService for OpenAIClient {
    #[instrument(skip(self, request), fields(model = %self.model, prompt_len = request.user.len()))]
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, TranslationServiceError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.body(request))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(60);
            return Err(TranslationServiceError::RateLimited(retry_after));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TranslationServiceError::Unauthorized(
                "OpenAI rejected the API key".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(TranslationServiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: ChatResponse = response.json().await?;
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            TranslationServiceError::InvalidResponse("No choices in response".to_string())
        })?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for chat completions.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat-completions API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client(model: &str) -> OpenAIClient {
        OpenAIClient::new(&OpenAIConfig {
            api_key: SecretString::from("sk-test-4c1d"),
            model: model.to_string(),
        })
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "Translate.".to_string(),
            user: "مرحبا".to_string(),
            max_tokens: 400,
        }
    }

    #[test]
    fn test_default_models_use_max_tokens_and_zero_temperature() {
        let client = client("gpt-4o-mini");
        let req = request();
        let body = serde_json::to_value(client.body(&req)).unwrap();
        assert_eq!(body["max_tokens"], 400);
        assert_eq!(body["temperature"], 0.0);
        assert!(body.get("max_completion_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "مرحبا");
    }

    #[test]
    fn test_gpt5_models_use_completion_token_limit() {
        let client = client("gpt-5-mini");
        let req = request();
        let body = serde_json::to_value(client.body(&req)).unwrap();
        assert_eq!(body["max_completion_tokens"], 400);
        assert_eq!(body["temperature"], 1.0);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_debug_omits_key() {
        let debug = format!("{:?}", client("gpt-4o-mini"));
        assert!(!debug.contains("sk-test-4c1d"));
    }
}
