//! Chat-completion backends.
//!
//! Every LLM call in the crate goes through the object-safe [`ChatBackend`]
//! trait. A backend is built once, with its credential injected at
//! construction, and then shared as `Arc<dyn ChatBackend>` for the whole
//! session. Tests swap in scripted implementations through
//! [`crate::config::SessionConfigBuilder::backend`].
//!
//! Two implementations ship with the crate:
//!
//! * [`OpenAiClient`] — any OpenAI-compatible `/chat/completions` endpoint,
//!   driven directly over `reqwest`.
//! * [`ProviderBackend`] — an `edgequake-llm` provider (Anthropic, Gemini,
//!   Ollama, …) for everything else.

pub mod openai;
pub mod provider;

pub use openai::{OpenAiClient, DEFAULT_BASE_URL};
pub use provider::ProviderBackend;

use crate::config::SessionConfig;
use crate::error::LlmRequestError;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Role tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A fully-built chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: usize,
    pub temperature: f32,
}

/// A chat-completion endpoint.
///
/// `complete` issues exactly one request and returns the content of the first
/// choice, untrimmed. Implementations must not retry.
pub trait ChatBackend: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, LlmRequestError>>;
}

/// Resolve the chat backend, from most-specific to least-specific.
///
/// 1. **Pre-built backend** (`config.backend`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) — `"openai"` builds an
///    [`OpenAiClient`] from `config.api_key`; any other name goes through
///    `edgequake_llm::ProviderFactory` with `config.model`.
/// 3. **Explicit API key** (`config.api_key`) — an [`OpenAiClient`] against
///    `config.base_url`.
/// 4. **Auto-detection** — `ProviderFactory::from_env()` scans the known
///    provider key variables. This is the only step that reads the
///    environment without being asked to, and the detected provider keeps
///    its own default model: `config.model` is ignored here.
pub fn resolve_backend(config: &SessionConfig) -> Result<Arc<dyn ChatBackend>, LlmRequestError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if let Some(ref name) = config.provider_name {
        if name.eq_ignore_ascii_case("openai") {
            return openai_from_config(config).map(|c| Arc::new(c) as Arc<dyn ChatBackend>);
        }
        debug!("Using edgequake-llm provider '{}' with model {}", name, config.model);
        let backend = ProviderBackend::create(name, &config.model)?;
        return Ok(Arc::new(backend));
    }

    if config.api_key.is_some() {
        return openai_from_config(config).map(|c| Arc::new(c) as Arc<dyn ChatBackend>);
    }

    let backend = ProviderBackend::from_env()?;
    if config.model != crate::config::DEFAULT_MODEL {
        warn!(
            "Auto-detected provider ignores model '{}'; pass a provider name to choose the model",
            config.model
        );
    }
    Ok(Arc::new(backend))
}

fn openai_from_config(config: &SessionConfig) -> Result<OpenAiClient, LlmRequestError> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| LlmRequestError::ProviderNotConfigured {
            provider: "openai".to_string(),
            hint: "Set OPENAI_API_KEY or pass --api-key.".to_string(),
        })?;
    OpenAiClient::new(api_key, &config.base_url, config.request_timeout_secs)
}
