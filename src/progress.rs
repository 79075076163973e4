//! Progress-callback trait for session stage events.
//!
//! Inject an [`Arc<dyn SessionProgress>`] via
//! [`crate::config::SessionConfigBuilder::progress`] to be told when each
//! blocking stage (extraction, condensation, answering) starts and ends. The
//! `pdfqa` binary uses it to drive its spinners.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfqa::{SessionConfig, SessionProgress, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingProgress {
//!     finished: AtomicUsize,
//! }
//!
//! impl SessionProgress for CountingProgress {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         self.finished.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} took {}ms", stage.label(), elapsed_ms);
//!     }
//! }
//!
//! let config = SessionConfig::builder()
//!     .progress(Arc::new(CountingProgress { finished: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// A blocking step of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Reading page text out of the PDF.
    Extract,
    /// Summarising an over-long document.
    Condense,
    /// Answering one question.
    Answer,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extract => "Extracting text from PDF",
            Stage::Condense => "Summarizing extracted text",
            Stage::Answer => "Generating response",
        }
    }
}

/// Called by the session around each stage.
///
/// All methods default to no-ops so implementors only override what they
/// care about. Stages never overlap.
pub trait SessionProgress: Send + Sync {
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// `error` is the human-readable error description.
    fn on_stage_error(&self, stage: Stage, error: String) {
        let _ = (stage, error);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgress;

impl SessionProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::SessionConfig`].
pub type ProgressCallback = Arc<dyn SessionProgress>;
