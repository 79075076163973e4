//! Input handling: load the user's PDF into memory and sanity-check it.
//!
//! pdfium happily reads from a byte slice, so the whole file is read up
//! front. The `%PDF` magic is checked here so callers get a meaningful
//! error instead of a pdfium failure code, and so the check works even when
//! no pdfium library is installed.

use crate::error::DocumentParseError;
use std::path::Path;
use tracing::debug;

/// PDF header marker.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Readers accept the header anywhere in the first kilobyte.
const MAGIC_SEARCH_WINDOW: usize = 1024;

/// Check that `bytes` carry a PDF header.
pub fn check_magic(bytes: &[u8]) -> Result<(), DocumentParseError> {
    let window = &bytes[..bytes.len().min(MAGIC_SEARCH_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        Ok(())
    } else {
        Err(DocumentParseError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

/// Read a local PDF file into memory, validating existence, permissions and
/// the PDF magic bytes.
pub async fn read_pdf_file(path: impl AsRef<Path>) -> Result<Vec<u8>, DocumentParseError> {
    let path = path.as_ref();

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DocumentParseError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DocumentParseError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    check_magic(&bytes)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}
