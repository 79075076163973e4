//! Extraction against the real pdfium library.
//!
//! These tests build small PDFs in memory with pdfium itself, so no fixture
//! files are needed. They need a libpdfium on the machine and are ignored by
//! default; a run that asks for them fails loudly when the library is
//! missing.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test pdfium_e2e -- --ignored --nocapture

use edgequake_pdfqa::pipeline::extract::{bind_pdfium, extract_text, ExtractOptions};
use edgequake_pdfqa::{
    extract, ChatBackend, ChatRequest, DocumentParseError, ErrorKind, LlmRequestError, PdfQaError,
    Session, SessionConfig,
};
use futures::future::BoxFuture;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// pdfium's library init/teardown is process-global; one test at a time.
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    PDFIUM_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

fn library() -> Option<PathBuf> {
    std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from)
}

fn pdfium() -> Pdfium {
    match bind_pdfium(library().as_deref()) {
        Ok(p) => p,
        Err(e) => panic!("pdfium not available: {e}\nSet PDFIUM_LIB_PATH to run these tests"),
    }
}

/// One page per entry of `texts`, each holding a single text object.
fn build_pdf(pdfium: &Pdfium, texts: &[&str]) -> Vec<u8> {
    let mut document = pdfium.create_new_pdf().unwrap();
    let font = document.fonts_mut().helvetica();
    for text in texts {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .unwrap();
        page.objects_mut()
            .create_text_object(
                PdfPoints::new(72.0),
                PdfPoints::new(720.0),
                *text,
                font,
                PdfPoints::new(14.0),
            )
            .unwrap();
    }
    document.save_to_bytes().unwrap()
}

/// Each page's text as pdfium reports it, read back from `bytes`.
fn page_texts(pdfium: &Pdfium, bytes: &[u8]) -> Vec<String> {
    let document = pdfium.load_pdf_from_byte_slice(bytes, None).unwrap();
    document
        .pages()
        .iter()
        .map(|page| page.text().unwrap().all())
        .collect()
}

fn options() -> ExtractOptions {
    ExtractOptions {
        password: None,
        pdfium_library: library(),
    }
}

/// Records user prompts and answers "ok".
#[derive(Default)]
struct Recording(Mutex<Vec<String>>);

impl ChatBackend for Recording {
    fn name(&self) -> &str {
        "recording"
    }

    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, LlmRequestError>> {
        if let Some(last) = request.messages.last() {
            self.0.lock().unwrap().push(last.content.clone());
        }
        Box::pin(async { Ok("ok".to_string()) })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore = "needs libpdfium; set PDFIUM_LIB_PATH and pass --ignored"]
async fn three_pages_concatenate_in_order() {
    let _guard = serial();
    let (bytes, pages) = {
        let pdfium = pdfium();
        let bytes = build_pdf(&pdfium, &["Page1", "Page2", "Page3"]);
        let pages = page_texts(&pdfium, &bytes);
        (bytes, pages)
    };

    let doc = extract_text(bytes, options()).await.unwrap();

    assert_eq!(doc.page_count, 3);
    assert_eq!(pages.len(), 3);
    for (i, text) in pages.iter().enumerate() {
        assert_eq!(text.trim(), format!("Page{}", i + 1));
    }
    // Exactly the page texts back to back, nothing inserted between them.
    assert_eq!(doc.text, pages.concat());
}

#[tokio::test]
#[ignore = "needs libpdfium; set PDFIUM_LIB_PATH and pass --ignored"]
async fn session_answers_from_extracted_pages() {
    let _guard = serial();
    let (bytes, pages) = {
        let pdfium = pdfium();
        let bytes = build_pdf(&pdfium, &["Page1", "Page2", "Page3"]);
        let pages = page_texts(&pdfium, &bytes);
        (bytes, pages)
    };
    let backend = Arc::new(Recording::default());
    let mut config = SessionConfig::default();
    config.pdfium_library = library();

    let session = Session::open_with_backend(bytes, backend.clone(), config)
        .await
        .unwrap();
    session.ask("What is on the pages?").await.unwrap();

    assert!(!session.is_condensed());
    assert_eq!(
        *backend.0.lock().unwrap(),
        vec![format!(
            "Based on this document: {}\nAnswer this question: What is on the pages?",
            pages.concat()
        )]
    );
}

#[tokio::test]
#[ignore = "needs libpdfium; set PDFIUM_LIB_PATH and pass --ignored"]
async fn page_without_text_contributes_nothing() {
    let _guard = serial();
    let bytes = {
        let pdfium = pdfium();
        let mut document = pdfium.create_new_pdf().unwrap();
        document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .unwrap();
        document.save_to_bytes().unwrap()
    };

    let doc = extract_text(bytes, options()).await.unwrap();
    assert_eq!(doc.page_count, 1);
    assert!(doc.text.trim().is_empty());
}

#[tokio::test]
#[ignore = "needs libpdfium; set PDFIUM_LIB_PATH and pass --ignored"]
async fn truncated_pdf_is_a_document_error() {
    let _guard = serial();
    let bytes = {
        let pdfium = pdfium();
        build_pdf(&pdfium, &["Page1", "Page2"])
    };
    // Header only: pdfium's xref repair cannot recover a document from it.
    let truncated = bytes[..32].to_vec();

    let err = extract_text(truncated, options()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentParse);
    assert!(matches!(
        err,
        PdfQaError::Document(DocumentParseError::Corrupt { .. })
    ));
}

#[tokio::test]
#[ignore = "needs libpdfium; set PDFIUM_LIB_PATH and pass --ignored"]
async fn extract_reads_from_disk() {
    let _guard = serial();
    let bytes = {
        let pdfium = pdfium();
        build_pdf(&pdfium, &["Hello from disk"])
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.pdf");
    std::fs::write(&path, &bytes).unwrap();

    let mut config = SessionConfig::default();
    config.pdfium_library = library();
    let doc = extract(&path, &config).await.unwrap();
    assert!(doc.text.contains("Hello from disk"));
}
