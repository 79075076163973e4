//! Answering: one question against the working text.
//!
//! Each call is an independent request. Earlier questions and answers are
//! never sent along, and identical questions are not memoised.

use crate::backend::{ChatBackend, ChatMessage, ChatRequest};
use crate::config::CompletionSettings;
use crate::error::LlmRequestError;
use crate::prompts::{answer_prompt, DEFAULT_SYSTEM_PROMPT};
use tracing::debug;

/// Answer `question` from `context` and return the trimmed answer.
///
/// `system_prompt` of `None` uses [`DEFAULT_SYSTEM_PROMPT`]; an empty string
/// sends no system message at all.
pub async fn answer(
    backend: &dyn ChatBackend,
    context: &str,
    question: &str,
    system_prompt: Option<&str>,
    settings: &CompletionSettings,
) -> Result<String, LlmRequestError> {
    let request = answer_request(context, question, system_prompt, settings);
    debug!(
        "Answering with {} ({}), prompt {} chars",
        settings.model,
        backend.name(),
        request.messages.iter().map(|m| m.content.len()).sum::<usize>()
    );
    let response = backend.complete(&request).await?;
    Ok(response.trim().to_string())
}

/// Build the answer request: optional system message, then the single user
/// message carrying the document and the question.
pub fn answer_request(
    context: &str,
    question: &str,
    system_prompt: Option<&str>,
    settings: &CompletionSettings,
) -> ChatRequest {
    let system_prompt = system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage::system(system_prompt));
    }
    messages.push(ChatMessage::user(answer_prompt(context, question)));

    ChatRequest {
        model: settings.model.clone(),
        messages,
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}
