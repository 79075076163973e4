//! Session orchestration tests against a scripted chat backend.
//!
//! No PDF engine and no network: documents are built from already-extracted
//! text with `Session::from_document`, and every LLM request is recorded.

use edgequake_pdfqa::{
    ChatBackend, ChatRequest, DocumentParseError, ErrorKind, ExtractedDocument, LlmRequestError,
    PdfQaError, Role, Session, SessionConfig, SessionProgress, Stage,
};
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replies from a queue; once the queue is empty every call returns
/// `fallback`.
struct Scripted {
    replies: Mutex<VecDeque<Result<String, LlmRequestError>>>,
    fallback: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl Scripted {
    fn new(fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn then(self: &Arc<Self>, reply: Result<&str, LlmRequestError>) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string));
        Arc::clone(self)
    }

    fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn user_prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                r.messages
                    .iter()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl ChatBackend for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, LlmRequestError>> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()));
        Box::pin(async move { reply })
    }
}

/// Route library logs to the test harness; `RUST_LOG=debug` to see them.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn doc(text: impl Into<String>) -> ExtractedDocument {
    ExtractedDocument {
        text: text.into(),
        page_count: 1,
    }
}

fn config() -> SessionConfig {
    init_logging();
    SessionConfig::default()
}

// ── Condensation threshold ───────────────────────────────────────────────────

#[tokio::test]
async fn text_at_threshold_is_not_condensed() {
    let backend = Scripted::new("unused");
    let text = "x".repeat(10_000);

    let session = Session::from_document(doc(text.clone()), backend.clone(), config())
        .await
        .unwrap();

    assert!(!session.is_condensed());
    assert_eq!(session.working_text(), text);
    assert!(backend.requests().is_empty(), "no LLM call expected");
}

#[tokio::test]
async fn text_over_threshold_is_condensed_once() {
    let backend = Scripted::new("answer").then(Ok("  SUMMARY  "));
    let text = "x".repeat(10_001);

    let session = Session::from_document(doc(text.clone()), backend.clone(), config())
        .await
        .unwrap();

    assert!(session.is_condensed());
    assert_eq!(session.working_text(), "SUMMARY");
    assert_eq!(session.extracted_text(), text, "raw text kept for display");

    let prompts = backend.user_prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0],
        format!("Summarize the following text concisely:\n\n{text}")
    );

    // Questions use the summary and never condense again.
    session.ask("q1").await.unwrap();
    session.ask("q2").await.unwrap();
    let prompts = backend.user_prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(
        prompts[2],
        "Based on this document: SUMMARY\nAnswer this question: q2"
    );
}

#[tokio::test]
async fn threshold_counts_characters_not_bytes() {
    let backend = Scripted::new("unused");
    // 10 000 chars, 20 000 bytes.
    let text = "é".repeat(10_000);

    let session = Session::from_document(doc(text), backend.clone(), config())
        .await
        .unwrap();

    assert!(!session.is_condensed());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn custom_threshold_is_honoured() {
    let backend = Scripted::new("short");
    let cfg = SessionConfig::builder()
        .condense_threshold(5)
        .build()
        .unwrap();

    let session = Session::from_document(doc("abcdef"), backend.clone(), cfg)
        .await
        .unwrap();

    assert!(session.is_condensed());
    assert_eq!(session.working_text(), "short");
}

#[tokio::test]
async fn condensation_failure_is_llm_error() {
    let backend = Scripted::new("unused").then(Err(LlmRequestError::RateLimited {
        detail: "slow down".into(),
    }));

    let err = Session::from_document(doc("x".repeat(10_001)), backend, config())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LlmRequest);
    assert!(err.to_string().contains("slow down"));
}

// ── Answering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn answer_prompt_uses_page_texts_in_order() {
    let backend = Scripted::new("  Three pages.\n");
    let document = ExtractedDocument {
        text: "Page1Page2Page3".into(),
        page_count: 3,
    };

    let session = Session::from_document(document, backend.clone(), config())
        .await
        .unwrap();
    let answer = session.ask("How many pages?").await.unwrap();

    assert_eq!(answer.text, "Three pages.");
    assert_eq!(answer.question, "How many pages?");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.model, "gpt-3.5-turbo");
    assert_eq!(req.max_tokens, 500);
    assert!((req.temperature - 0.5).abs() < f32::EPSILON);
    assert_eq!(req.messages[0].role, Role::System);
    assert_eq!(req.messages[0].content, "You are a helpful assistant.");
    assert_eq!(
        req.messages[1].content,
        "Based on this document: Page1Page2Page3\nAnswer this question: How many pages?"
    );
}

#[tokio::test]
async fn repeated_questions_each_issue_a_request() {
    let backend = Scripted::new("same");
    let session = Session::from_document(doc("text"), backend.clone(), config())
        .await
        .unwrap();

    let a = session.ask("again?").await.unwrap();
    let b = session.ask("again?").await.unwrap();

    assert_eq!(a.text, b.text);
    assert_eq!(backend.requests().len(), 2, "answers are not cached");
}

#[tokio::test]
async fn empty_document_still_answers() {
    let backend = Scripted::new("Nothing to go on.");
    let session = Session::from_document(
        ExtractedDocument {
            text: String::new(),
            page_count: 0,
        },
        backend.clone(),
        config(),
    )
    .await
    .unwrap();

    session.ask("anything?").await.unwrap();
    assert_eq!(
        backend.user_prompts()[0],
        "Based on this document: \nAnswer this question: anything?"
    );
}

#[tokio::test]
async fn auth_failure_surfaces_and_session_survives() {
    let backend = Scripted::new("recovered").then(Err(LlmRequestError::Auth {
        status: 401,
        detail: "Incorrect API key provided".into(),
    }));
    let session = Session::from_document(doc("text"), backend.clone(), config())
        .await
        .unwrap();

    let err = session.ask("first?").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LlmRequest);
    assert!(matches!(
        err,
        PdfQaError::Llm(LlmRequestError::Auth { status: 401, .. })
    ));
    assert!(err
        .user_message()
        .starts_with("An error occurred: "));
    assert!(err.user_message().contains("Incorrect API key provided"));

    let ok = session.ask("second?").await.unwrap();
    assert_eq!(ok.text, "recovered");
}

// ── Unreadable documents ─────────────────────────────────────────────────────

#[tokio::test]
async fn non_pdf_bytes_never_reach_the_llm() {
    let backend = Scripted::new("unused");

    let err = Session::open_with_backend(b"PK\x03\x04zip".to_vec(), backend.clone(), config())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DocumentParse);
    assert!(err.user_message().starts_with("Could not read the PDF: "));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn truncated_pdf_never_reaches_the_llm() {
    let backend = Scripted::new("unused");

    let err = Session::open_with_backend(
        b"%PDF-1.4 truncated".to_vec(),
        backend.clone(),
        config(),
    )
    .await
    .unwrap_err();

    // Without libpdfium the bind fails first; either way nothing is sent.
    assert!(
        matches!(
            err,
            PdfQaError::Document(DocumentParseError::Corrupt { .. })
                | PdfQaError::PdfiumUnavailable(_)
        ),
        "got: {err:?}"
    );
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn failed_reload_keeps_previous_document() {
    let backend = Scripted::new("unused");
    let mut session = Session::from_document(
        ExtractedDocument {
            text: "Page1Page2".into(),
            page_count: 2,
        },
        backend.clone(),
        config(),
    )
    .await
    .unwrap();

    let err = session.reload(b"GIF89a".to_vec()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DocumentParse);
    assert_eq!(session.working_text(), "Page1Page2");
    assert_eq!(session.extracted_text(), "Page1Page2");
    assert_eq!(session.page_count(), 2);
    assert!(!session.is_condensed());
    assert!(backend.requests().is_empty());
}

// ── Progress ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl SessionProgress for Recorder {
    fn on_stage_start(&self, stage: Stage) {
        self.0.lock().unwrap().push(format!("start:{stage:?}"));
    }
    fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
        self.0.lock().unwrap().push(format!("done:{stage:?}"));
    }
    fn on_stage_error(&self, stage: Stage, _error: String) {
        self.0.lock().unwrap().push(format!("error:{stage:?}"));
    }
}

#[tokio::test]
async fn progress_reports_condense_and_answer_stages() {
    let recorder = Arc::new(Recorder::default());
    let cfg = SessionConfig::builder()
        .condense_threshold(3)
        .progress(recorder.clone())
        .build()
        .unwrap();
    let backend = Scripted::new("ok").then(Ok("sum")).then(Err(
        LlmRequestError::Transport("connection reset".into()),
    ));

    let session = Session::from_document(doc("long text"), backend, cfg)
        .await
        .unwrap();
    let _ = session.ask("q").await;

    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec!["start:Condense", "done:Condense", "start:Answer", "error:Answer"]
    );
}
