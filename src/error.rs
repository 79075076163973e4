//! Error types for the edgequake-pdfqa library.
//!
//! Failures fall into two families that callers handle differently:
//!
//! * [`DocumentParseError`] — the PDF could not be turned into text. Nothing
//!   from the document reaches the LLM stages when this happens.
//!
//! * [`LlmRequestError`] — the chat-completion backend failed (auth, network,
//!   rate limit, malformed response). Never retried.
//!
//! Both are wrapped by [`PdfQaError`], which every public entry point returns.
//! A missing pdfium library is an environment fault, not a document fault,
//! and is reported as [`PdfQaError::PdfiumUnavailable`].
//! [`PdfQaError::kind`] gives the presentation layer a flat tag to branch on
//! without matching every variant.

use std::path::PathBuf;
use thiserror::Error;

/// The PDF could not be read or parsed into text.
#[derive(Debug, Error)]
pub enum DocumentParseError {
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes do not start with the `%PDF` magic.
    #[error("Input is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    Corrupt { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// The text layer of a page could not be read.
    #[error("Failed to read text of page {page}: {detail}")]
    PageText { page: usize, detail: String },

}

/// The LLM backend failed to produce a completion.
#[derive(Debug, Error)]
pub enum LlmRequestError {
    /// No backend could be built (missing API key, unknown provider, …).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// HTTP 401/403 — the credential was rejected.
    #[error("Authentication error (HTTP {status}): {detail}")]
    Auth { status: u16, detail: String },

    /// HTTP 429.
    #[error("Rate limit exceeded (HTTP 429): {detail}")]
    RateLimited { detail: String },

    /// Any other non-success HTTP status.
    #[error("LLM API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection, TLS or I/O failure before a response arrived.
    #[error("Failed to reach the LLM backend: {0}")]
    Transport(String),

    /// The backend answered 2xx but the body was not a usable completion.
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    /// Error reported by an `edgequake-llm` provider.
    #[error("LLM provider '{provider}' failed: {detail}")]
    Provider { provider: String, detail: String },
}

/// All errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    #[error(transparent)]
    Document(#[from] DocumentParseError),

    #[error(transparent)]
    Llm(#[from] LlmRequestError),

    /// No pdfium library could be bound. The document itself may be fine.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or its directory), place the library\n\
next to the binary, or install it system-wide.\n"
    )]
    PdfiumUnavailable(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Anything not anticipated above (task panics, runtime creation, …).
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Flat classification of a [`PdfQaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DocumentParse,
    LlmRequest,
    Unexpected,
}

impl PdfQaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PdfQaError::Document(_) => ErrorKind::DocumentParse,
            PdfQaError::Llm(_) => ErrorKind::LlmRequest,
            PdfQaError::PdfiumUnavailable(_)
            | PdfQaError::InvalidConfig(_)
            | PdfQaError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// One-line banner text for the interaction boundary.
    ///
    /// Always contains the underlying error detail.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::DocumentParse => format!("Could not read the PDF: {self}"),
            ErrorKind::LlmRequest => format!("An error occurred: {self}"),
            ErrorKind::Unexpected => format!("An unexpected error occurred: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classifies_wrapped_errors() {
        let doc: PdfQaError = DocumentParseError::PasswordRequired.into();
        assert_eq!(doc.kind(), ErrorKind::DocumentParse);

        let llm: PdfQaError = LlmRequestError::Timeout { secs: 30 }.into();
        assert_eq!(llm.kind(), ErrorKind::LlmRequest);

        let other = PdfQaError::Unexpected("task panicked".into());
        assert_eq!(other.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn auth_error_display_keeps_detail() {
        let e: PdfQaError = LlmRequestError::Auth {
            status: 401,
            detail: "Incorrect API key provided".into(),
        }
        .into();
        let msg = e.user_message();
        assert!(msg.contains("401"), "got: {msg}");
        assert!(msg.contains("Incorrect API key provided"), "got: {msg}");
    }

    #[test]
    fn not_a_pdf_display() {
        let e = DocumentParseError::NotAPdf {
            magic: b"GIF8".to_vec(),
        };
        assert!(e.to_string().contains("not a valid PDF"));
    }

    #[test]
    fn page_text_display() {
        let e = DocumentParseError::PageText {
            page: 3,
            detail: "no text layer".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn missing_pdfium_does_not_blame_the_document() {
        let e = PdfQaError::PdfiumUnavailable("libpdfium.so: cannot open shared object".into());
        assert_eq!(e.kind(), ErrorKind::Unexpected);
        let msg = e.user_message();
        assert!(!msg.contains("Could not read the PDF"), "got: {msg}");
        assert!(msg.contains("PDFIUM_LIB_PATH"), "got: {msg}");
    }

    #[test]
    fn unexpected_banner() {
        let e = PdfQaError::Unexpected("boom".into());
        assert!(e.user_message().starts_with("An unexpected error occurred"));
    }
}
