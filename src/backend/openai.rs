//! OpenAI-compatible chat-completions client.
//!
//! Speaks `POST {base_url}/chat/completions` with a bearer credential. The
//! key is handed to [`OpenAiClient::new`] once and kept inside the client;
//! nothing here reads the environment.

use super::{ChatBackend, ChatMessage, ChatRequest};
use crate::error::LlmRequestError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for an OpenAI-compatible chat-completion API.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout_secs: Option<u64>,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: usize,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Build a client.
    ///
    /// With `timeout_secs = None` no request timeout is set and a hung
    /// backend blocks the caller until the connection drops.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, LlmRequestError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| LlmRequestError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmRequestError> {
        let start = Instant::now();
        let body = CompletionBody {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!("Chat completion failed: HTTP {}", status.as_u16());
            return Err(status_error(status.as_u16(), &payload));
        }

        let content = parse_completion(&payload)?;
        debug!(
            "Chat completion: model={} {} chars in {:?}",
            request.model,
            content.len(),
            start.elapsed()
        );
        Ok(content)
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmRequestError {
        if e.is_timeout() {
            LlmRequestError::Timeout {
                secs: self.timeout_secs.unwrap_or_default(),
            }
        } else {
            LlmRequestError::Transport(e.to_string())
        }
    }
}

impl ChatBackend for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, LlmRequestError>> {
        Box::pin(self.send(request))
    }
}

/// Map a non-2xx response to the matching error variant.
fn status_error(status: u16, payload: &str) -> LlmRequestError {
    let detail = error_detail(payload);
    match status {
        401 | 403 => LlmRequestError::Auth { status, detail },
        429 => LlmRequestError::RateLimited { detail },
        _ => LlmRequestError::Api { status, detail },
    }
}

/// Prefer the API's `error.message`; fall back to the raw body.
fn error_detail(payload: &str) -> String {
    serde_json::from_str::<serde_json::Value>(payload)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| payload.trim().to_string())
}

/// Extract the first choice's message content.
fn parse_completion(payload: &str) -> Result<String, LlmRequestError> {
    let parsed: CompletionResponse = serde_json::from_str(payload)
        .map_err(|e| LlmRequestError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmRequestError::MalformedResponse("response has no choices".into()))
}
