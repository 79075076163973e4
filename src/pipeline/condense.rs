//! Condensation: ask the LLM for a concise summary of an over-long document.
//!
//! Deciding *whether* to condense belongs to [`crate::session`]; this stage
//! always sends its request when called. There is no local fallback (such as
//! truncation) when the backend fails.

use crate::backend::{ChatBackend, ChatMessage, ChatRequest};
use crate::config::CompletionSettings;
use crate::error::LlmRequestError;
use crate::prompts::condense_prompt;
use tracing::info;

/// Summarise `text` with one chat-completion request and return the trimmed
/// summary.
pub async fn condense(
    backend: &dyn ChatBackend,
    text: &str,
    settings: &CompletionSettings,
) -> Result<String, LlmRequestError> {
    info!(
        "Condensing {} chars with {} ({})",
        text.chars().count(),
        settings.model,
        backend.name()
    );
    let request = condense_request(text, settings);
    let summary = backend.complete(&request).await?;
    Ok(summary.trim().to_string())
}

/// Build the single-message summary request.
pub fn condense_request(text: &str, settings: &CompletionSettings) -> ChatRequest {
    ChatRequest {
        model: settings.model.clone(),
        messages: vec![ChatMessage::user(condense_prompt(text))],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}
