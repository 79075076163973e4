//! Text extraction: PDF bytes → page texts concatenated in page order.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks. The whole bind → load → read sequence runs on a
//! blocking-pool thread; the document and the library handle are dropped
//! there before the text is handed back.
//!
//! Page texts are joined with no separator. Whatever whitespace pdfium emits
//! at page ends is kept as-is.

use crate::config::SessionConfig;
use crate::error::{DocumentParseError, PdfQaError};
use crate::output::ExtractedDocument;
use crate::pipeline::input::check_magic;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Settings the extractor needs from the session config.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub password: Option<String>,
    pub pdfium_library: Option<PathBuf>,
}

impl From<&SessionConfig> for ExtractOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            password: config.password.clone(),
            pdfium_library: config.pdfium_library.clone(),
        }
    }
}

/// Extract the text of every page of `bytes`.
///
/// Fails with [`DocumentParseError`] on anything that is not a readable PDF;
/// no partial text is returned in that case. A missing pdfium library is
/// [`PdfQaError::PdfiumUnavailable`].
pub async fn extract_text(
    bytes: Vec<u8>,
    options: ExtractOptions,
) -> Result<ExtractedDocument, PdfQaError> {
    let document = tokio::task::spawn_blocking(move || {
        extract_text_blocking(
            &bytes,
            options.password.as_deref(),
            options.pdfium_library.as_deref(),
        )
    })
    .await
    .map_err(|e| PdfQaError::Unexpected(format!("Extraction task panicked: {}", e)))??;

    info!(
        "Extracted {} chars from {} pages",
        document.char_count(),
        document.page_count
    );
    Ok(document)
}

/// Blocking implementation of [`extract_text`].
pub fn extract_text_blocking(
    bytes: &[u8],
    password: Option<&str>,
    pdfium_library: Option<&Path>,
) -> Result<ExtractedDocument, PdfQaError> {
    check_magic(bytes)?;

    let pdfium = bind_pdfium(pdfium_library)?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| load_error(format!("{:?}", e), password.is_some()))?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    debug!("PDF loaded: {} pages", page_count);

    let mut page_texts = Vec::with_capacity(page_count);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| DocumentParseError::PageText {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {}: {} chars", idx + 1, text.len());
        page_texts.push(text);
    }

    Ok(ExtractedDocument {
        text: concat_pages(&page_texts),
        page_count,
    })
}

/// Join page texts in order with nothing in between.
pub fn concat_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages.iter().map(AsRef::as_ref).collect()
}

/// Bind to pdfium.
///
/// `library` may name the shared library itself or the directory holding
/// it. Without it, `./` is tried first, then the system library path.
pub fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, PdfQaError> {
    let bindings = match library {
        Some(path) => Pdfium::bind_to_library(library_file(path)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PdfQaError::PdfiumUnavailable(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn library_file(path: &Path) -> PathBuf {
    let dir = path.to_string_lossy().into_owned();
    if path.is_dir() {
        PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(&dir))
    } else {
        PathBuf::from(dir)
    }
}

/// Classify a pdfium load failure from its debug rendering.
fn load_error(detail: String, had_password: bool) -> DocumentParseError {
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            DocumentParseError::WrongPassword
        } else {
            DocumentParseError::PasswordRequired
        }
    } else {
        DocumentParseError::Corrupt { detail }
    }
}
