//! Prompt templates for condensation and answering.
//!
//! Both user-message shapes are fixed strings: tests compare them byte for
//! byte, so any wording change here is a visible behaviour change.

/// System message placed before every question.
///
/// Used when `SessionConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Build the single user message asking for a concise summary of `text`.
pub fn condense_prompt(text: &str) -> String {
    format!("Summarize the following text concisely:\n\n{}", text)
}

/// Build the user message embedding the document and the question verbatim.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on this document: {}\nAnswer this question: {}",
        context, question
    )
}
