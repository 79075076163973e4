//! Configuration types for a PDF question-answering session.
//!
//! Every knob lives in [`SessionConfig`], built via its
//! [`SessionConfigBuilder`]. The credential and the optional pre-built
//! backend travel inside the config, so nothing is read from process-wide
//! state once the session exists.

use crate::backend::{ChatBackend, DEFAULT_BASE_URL};
use crate::error::PdfQaError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Documents longer than this many characters are condensed after extraction.
pub const DEFAULT_CONDENSE_THRESHOLD: usize = 10_000;

/// Configuration for a question-answering session.
///
/// # Example
/// ```rust
/// use edgequake_pdfqa::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .model("gpt-4o-mini")
///     .temperature(0.2)
///     .condense_threshold(20_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 500);
/// ```
#[derive(Clone)]
pub struct SessionConfig {
    /// Chat model identifier. Default: `gpt-3.5-turbo`.
    pub model: String,

    /// Maximum tokens generated per completion (summary or answer). Default: 500.
    pub max_tokens: usize,

    /// Sampling temperature; lower is more deterministic. Range 0.0–2.0. Default: 0.5.
    pub temperature: f32,

    /// Extracted text longer than this (in characters) is condensed once. Default: 10 000.
    pub condense_threshold: usize,

    /// System message sent ahead of every question. If None, uses
    /// [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Bearer credential for the OpenAI-compatible endpoint.
    pub api_key: Option<String>,

    /// Root URL of the OpenAI-compatible endpoint. Default: `https://api.openai.com/v1`.
    pub base_url: String,

    /// `edgequake-llm` provider name (e.g. "anthropic", "ollama").
    /// `"openai"` selects the built-in client.
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over everything else.
    pub backend: Option<Arc<dyn ChatBackend>>,

    /// Per-request timeout in seconds. None leaves the HTTP client default
    /// (no timeout).
    pub request_timeout_secs: Option<u64>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// pdfium shared library, or the directory holding it. If None, tries
    /// `./` and then the system library.
    pub pdfium_library: Option<PathBuf>,

    /// Stage progress events.
    pub progress: Option<ProgressCallback>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.5,
            condense_threshold: DEFAULT_CONDENSE_THRESHOLD,
            system_prompt: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            provider_name: None,
            backend: None,
            request_timeout_secs: None,
            password: None,
            pdfium_library: None,
            progress: None,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("condense_threshold", &self.condense_threshold)
            .field("system_prompt", &self.system_prompt)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library", &self.pdfium_library)
            .finish()
    }
}

impl SessionConfig {
    /// Create a new builder for `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The sampling settings shared by the condenser and the responder.
    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Per-request sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        SessionConfig::default().completion_settings()
    }
}

/// Builder for [`SessionConfig`].
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl fmt::Debug for SessionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SessionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn condense_threshold(mut self, chars: usize) -> Self {
        self.config.condense_threshold = chars;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress(mut self, cb: ProgressCallback) -> Self {
        self.config.progress = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SessionConfig, PdfQaError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig("Model must not be empty".into()));
        }
        if c.max_tokens == 0 {
            return Err(PdfQaError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(PdfQaError::InvalidConfig(format!(
                "base_url must be an HTTP/HTTPS URL, got '{}'",
                c.base_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(PdfQaError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
