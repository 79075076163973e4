//! # edgequake-pdfqa
//!
//! Ask questions about a PDF document using a large language model.
//!
//! The library extracts the text of every page with pdfium, condenses it
//! once through the LLM when it is longer than a threshold (10 000
//! characters by default), and answers free-form questions from that working
//! text. Every stage is one awaited call; nothing is retried, cached or
//! persisted.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Extract   concatenate page texts in order (pdfium, spawn_blocking)
//!  ├─ 2. Condense  only if chars > threshold; one summary request, once
//!  └─ 3. Respond   one chat request per question, no conversation memory
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{open_session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build()?;
//!     let session = open_session("document.pdf", config).await?;
//!     let answer = session.ask("What is this document about?").await?;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Backends
//!
//! The API key is injected into the client when it is built. Any
//! OpenAI-compatible endpoint works through [`backend::OpenAiClient`] (set
//! `api_key` and `base_url`), and other providers go through `edgequake-llm`
//! with `provider_name`, which reads that provider's key variable.
//!
//! With no backend, provider or key configured, [`backend::resolve_backend`]
//! falls back to `edgequake-llm` auto-detection from the environment. That
//! provider runs its own default model and ignores `SessionConfig::model`.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod ask;
pub mod backend;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use ask::{ask, ask_sync, extract, open_session};
pub use backend::{ChatBackend, ChatMessage, ChatRequest, OpenAiClient, ProviderBackend, Role};
pub use config::{CompletionSettings, SessionConfig, SessionConfigBuilder};
pub use error::{DocumentParseError, ErrorKind, LlmRequestError, PdfQaError};
pub use output::{Answer, ExtractedDocument};
pub use progress::{NoopProgress, ProgressCallback, SessionProgress, Stage};
pub use session::Session;
