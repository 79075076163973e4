//! Convenience entry points over [`Session`].
//!
//! Use these when the PDF lives on disk and only a handful of questions are
//! asked. Interactive callers that keep a document loaded should hold a
//! [`Session`] directly.

use crate::config::SessionConfig;
use crate::error::PdfQaError;
use crate::output::{Answer, ExtractedDocument};
use crate::pipeline::extract::extract_text;
use crate::pipeline::input;
use crate::session::Session;
use std::path::Path;
use tracing::info;

/// Read a PDF from disk and open a session on it.
///
/// # Errors
/// - File not found / permission denied / not a PDF
/// - Corrupt or encrypted PDF
/// - No LLM backend could be resolved
/// - Condensation failed (documents over the threshold only)
pub async fn open_session(
    path: impl AsRef<Path>,
    config: SessionConfig,
) -> Result<Session, PdfQaError> {
    let path = path.as_ref();
    info!("Opening session on {}", path.display());
    let bytes = input::read_pdf_file(path).await?;
    Session::open(bytes, config).await
}

/// Answer a single question about a PDF on disk.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfqa::{ask, SessionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SessionConfig::builder()
///     .api_key(std::env::var("OPENAI_API_KEY")?)
///     .build()?;
/// let answer = ask("report.pdf", "What is the main conclusion?", config).await?;
/// println!("{}", answer.text);
/// # Ok(())
/// # }
/// ```
pub async fn ask(
    path: impl AsRef<Path>,
    question: &str,
    config: SessionConfig,
) -> Result<Answer, PdfQaError> {
    let session = open_session(path, config).await?;
    session.ask(question).await
}

/// Synchronous wrapper around [`ask`].
///
/// Creates a temporary tokio runtime internally.
pub fn ask_sync(
    path: impl AsRef<Path>,
    question: &str,
    config: SessionConfig,
) -> Result<Answer, PdfQaError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfQaError::Unexpected(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(ask(path, question, config))
}

/// Extract a PDF's text without touching any LLM.
///
/// Does not require an API key.
pub async fn extract(
    path: impl AsRef<Path>,
    config: &SessionConfig,
) -> Result<ExtractedDocument, PdfQaError> {
    let bytes = input::read_pdf_file(path).await?;
    extract_text(bytes, config.into()).await
}
