//! The interaction session: one loaded document and the question loop on top.
//!
//! ```text
//! open(bytes) ──▶ extract ──▶ chars > threshold? ──yes──▶ condense (once)
//!                                    │no                      │
//!                                    ▼                        ▼
//!                              working text ◀─────────────────┘
//!                                    │
//!                   ask(q) ──▶ respond(working text, q)   (repeatable)
//! ```
//!
//! A [`Session`] owns everything that must survive between user actions:
//! the raw extracted text (for display), the working text handed to the
//! responder, and whether condensation happened. Condensation is one-shot
//! per loaded document; asking questions never condenses again.

use crate::backend::{resolve_backend, ChatBackend};
use crate::config::SessionConfig;
use crate::error::PdfQaError;
use crate::output::{Answer, ExtractedDocument};
use crate::pipeline::{condense, extract, respond};
use crate::progress::{ProgressCallback, Stage};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct Session {
    backend: Arc<dyn ChatBackend>,
    config: SessionConfig,
    document: ExtractedDocument,
    working_text: String,
    condensed: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend.name())
            .field("page_count", &self.document.page_count)
            .field("extracted_chars", &self.document.char_count())
            .field("working_chars", &self.working_text.chars().count())
            .field("condensed", &self.condensed)
            .finish()
    }
}

impl Session {
    /// Load a document, resolving the backend from `config`.
    pub async fn open(bytes: Vec<u8>, config: SessionConfig) -> Result<Self, PdfQaError> {
        let backend = resolve_backend(&config)?;
        Self::open_with_backend(bytes, backend, config).await
    }

    /// Load a document with an explicit backend.
    pub async fn open_with_backend(
        bytes: Vec<u8>,
        backend: Arc<dyn ChatBackend>,
        config: SessionConfig,
    ) -> Result<Self, PdfQaError> {
        let (document, working_text, condensed) =
            prepare(backend.as_ref(), &config, bytes).await?;
        Ok(Self {
            backend,
            config,
            document,
            working_text,
            condensed,
        })
    }

    /// Start a session on text that was already extracted.
    ///
    /// Condensation still applies when the text is over the threshold.
    pub async fn from_document(
        document: ExtractedDocument,
        backend: Arc<dyn ChatBackend>,
        config: SessionConfig,
    ) -> Result<Self, PdfQaError> {
        let (working_text, condensed) =
            working_text_for(backend.as_ref(), &config, &document).await?;
        Ok(Self {
            backend,
            config,
            document,
            working_text,
            condensed,
        })
    }

    /// Replace the loaded document (re-upload).
    ///
    /// On failure the previous document stays loaded.
    pub async fn reload(&mut self, bytes: Vec<u8>) -> Result<(), PdfQaError> {
        let (document, working_text, condensed) =
            prepare(self.backend.as_ref(), &self.config, bytes).await?;
        self.document = document;
        self.working_text = working_text;
        self.condensed = condensed;
        Ok(())
    }

    /// Answer one question against the working text.
    pub async fn ask(&self, question: &str) -> Result<Answer, PdfQaError> {
        let start = Instant::now();
        let settings = self.config.completion_settings();
        let text = run_stage(self.config.progress.as_ref(), Stage::Answer, async {
            respond::answer(
                self.backend.as_ref(),
                &self.working_text,
                question,
                self.config.system_prompt.as_deref(),
                &settings,
            )
            .await
            .map_err(PdfQaError::from)
        })
        .await?;

        Ok(Answer {
            question: question.to_string(),
            text,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// The text exactly as extracted, before any condensation.
    pub fn extracted_text(&self) -> &str {
        &self.document.text
    }

    /// The text questions are answered from.
    pub fn working_text(&self) -> &str {
        &self.working_text
    }

    pub fn is_condensed(&self) -> bool {
        self.condensed
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count
    }

    pub fn document(&self) -> &ExtractedDocument {
        &self.document
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Whether text of this length must be condensed.
pub fn needs_condensing(char_count: usize, threshold: usize) -> bool {
    char_count > threshold
}

/// Extract, then condense once if over the threshold.
async fn prepare(
    backend: &dyn ChatBackend,
    config: &SessionConfig,
    bytes: Vec<u8>,
) -> Result<(ExtractedDocument, String, bool), PdfQaError> {
    let document = run_stage(
        config.progress.as_ref(),
        Stage::Extract,
        extract::extract_text(bytes, config.into()),
    )
    .await?;
    let (working, condensed) = working_text_for(backend, config, &document).await?;
    Ok((document, working, condensed))
}

async fn working_text_for(
    backend: &dyn ChatBackend,
    config: &SessionConfig,
    document: &ExtractedDocument,
) -> Result<(String, bool), PdfQaError> {
    let chars = document.char_count();
    if !needs_condensing(chars, config.condense_threshold) {
        debug!(
            "{} chars ≤ threshold {}; using extracted text as-is",
            chars, config.condense_threshold
        );
        return Ok((document.text.clone(), false));
    }

    let settings = config.completion_settings();
    let summary = run_stage(config.progress.as_ref(), Stage::Condense, async {
        condense::condense(backend, &document.text, &settings)
            .await
            .map_err(PdfQaError::from)
    })
    .await?;
    info!(
        "Text was too long ({} chars) and has been summarized to {} chars",
        chars,
        summary.chars().count()
    );
    Ok((summary, true))
}

/// Run one stage, reporting start/complete/error to the progress callback.
async fn run_stage<T, E, F>(
    progress: Option<&ProgressCallback>,
    stage: Stage,
    fut: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = Instant::now();
    if let Some(cb) = progress {
        cb.on_stage_start(stage);
    }
    let result = fut.await;
    if let Some(cb) = progress {
        match &result {
            Ok(_) => cb.on_stage_complete(stage, start.elapsed().as_millis() as u64),
            Err(e) => cb.on_stage_error(stage, e.to_string()),
        }
    }
    result
}
