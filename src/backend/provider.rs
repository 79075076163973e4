//! `edgequake-llm` provider adapter.
//!
//! Lets the session talk to any provider the `edgequake-llm` factory knows
//! (Anthropic, Gemini, Mistral, Ollama, LM Studio, Azure, …). The model is
//! fixed when the provider is created, so [`ChatRequest::model`] is only
//! used for logging here.

use super::{ChatBackend, ChatRequest, Role};
use crate::error::LlmRequestError;
use edgequake_llm::{CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    label: String,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
        }
    }

    /// Instantiate a named provider with the given model.
    ///
    /// The factory reads the provider's own API key variable.
    pub fn create(provider_name: &str, model: &str) -> Result<Self, LlmRequestError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            LlmRequestError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider, provider_name))
    }

    /// Pick the first provider whose API key is present in the environment.
    pub fn from_env() -> Result<Self, LlmRequestError> {
        let (provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| LlmRequestError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                    Error: {e}"
                ),
            })?;
        Ok(Self::new(provider, "auto"))
    }
}

impl ChatBackend for ProviderBackend {
    fn name(&self) -> &str {
        &self.label
    }

    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, LlmRequestError>> {
        Box::pin(async move {
            let messages: Vec<edgequake_llm::ChatMessage> = request
                .messages
                .iter()
                .map(|m| match m.role {
                    Role::System => edgequake_llm::ChatMessage::system(m.content.as_str()),
                    Role::User => edgequake_llm::ChatMessage::user(m.content.as_str()),
                })
                .collect();

            let options = CompletionOptions {
                temperature: Some(request.temperature),
                max_tokens: Some(request.max_tokens),
                ..Default::default()
            };

            let response = self
                .provider
                .chat(&messages, Some(&options))
                .await
                .map_err(|e| LlmRequestError::Provider {
                    provider: self.label.clone(),
                    detail: e.to_string(),
                })?;

            debug!(
                "{} ({}): {} input tokens, {} output tokens",
                self.label, request.model, response.prompt_tokens, response.completion_tokens
            );
            Ok(response.content)
        })
    }
}
