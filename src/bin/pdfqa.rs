//! CLI binary for edgequake-pdfqa.
//!
//! Loads one PDF, then answers questions about it: either the `-q` questions
//! given on the command line, or interactively from stdin. Errors during an
//! interaction are printed and the session keeps going.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdfqa::backend::{resolve_backend, DEFAULT_BASE_URL};
use edgequake_pdfqa::config::{DEFAULT_CONDENSE_THRESHOLD, DEFAULT_MODEL};
use edgequake_pdfqa::pipeline::input::read_pdf_file;
use edgequake_pdfqa::{
    ChatBackend, PdfQaError, ProgressCallback, Session, SessionConfig, SessionProgress, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One spinner per blocking stage, cleared when the stage ends.
struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
        })
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl SessionProgress for CliProgress {
    fn on_stage_start(&self, stage: Stage) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_message(format!("{}…", stage.label()));
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        if let Some(bar) = self.take_spinner() {
            bar.finish_and_clear();
        }
        let msg = match stage {
            Stage::Extract => "PDF loaded and text extracted successfully!",
            Stage::Condense => "Text was too long and has been summarized.",
            Stage::Answer => return,
        };
        eprintln!(
            "{} {}  {}",
            green("✓"),
            msg,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0))
        );
    }

    fn on_stage_error(&self, _stage: Stage, _error: String) {
        // The interaction boundary prints the banner.
        if let Some(bar) = self.take_spinner() {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive session
  pdfqa report.pdf

  # One-shot questions
  pdfqa report.pdf -q "What is the main conclusion?" -q "Who are the authors?"

  # Show the extracted text first, answer as JSON lines
  pdfqa --show-text --json -q "Summarise section 2" report.pdf

  # Another model, stricter sampling, bigger condensation threshold
  pdfqa --model gpt-4o-mini --temperature 0.1 --condense-threshold 50000 book.pdf

  # Any OpenAI-compatible server
  pdfqa --base-url http://localhost:11434/v1 --api-key ollama --model llama3.1 doc.pdf

  # A non-OpenAI provider through edgequake-llm
  pdfqa --provider anthropic --model claude-3-5-haiku-latest doc.pdf

INTERACTIVE COMMANDS:
  <question>     Ask a question about the loaded document
  :text          Toggle display of the raw extracted text
  :load <path>   Load another PDF (replaces the current one)
  :help          Show this list
  :quit          Exit (also Ctrl-D)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          API key for the OpenAI-compatible endpoint
  OPENAI_BASE_URL         Endpoint root (default https://api.openai.com/v1)
  EDGEQUAKE_PROVIDER      edgequake-llm provider (anthropic, gemini, ollama, …)
  ANTHROPIC_API_KEY, GEMINI_API_KEY, …  read by edgequake-llm providers
  PDFIUM_LIB_PATH         libpdfium file or directory
"#;

/// Ask questions about a PDF document using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about a PDF document using an LLM",
    long_about = "Extract the text of a PDF, condense it with an LLM when it is very long, \
and answer free-form questions about it. Works with OpenAI, any OpenAI-compatible endpoint, \
and the providers supported by edgequake-llm (Anthropic, Gemini, Ollama, …).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Question to answer; repeat for several. Without any, starts an interactive session.
    #[arg(short = 'q', long = "question")]
    questions: Vec<String>,

    /// Chat model ID.
    #[arg(long, env = "PDFQA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, …
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// API key for the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Root URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Max output tokens per LLM call.
    #[arg(long, env = "PDFQA_MAX_TOKENS", default_value_t = 500)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0); lower is more deterministic.
    #[arg(long, env = "PDFQA_TEMPERATURE", default_value_t = 0.5)]
    temperature: f32,

    /// Condense documents longer than this many characters.
    #[arg(long, env = "PDFQA_CONDENSE_THRESHOLD", default_value_t = DEFAULT_CONDENSE_THRESHOLD)]
    condense_threshold: usize,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDFQA_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Per-request LLM timeout in seconds (default: none).
    #[arg(long, env = "PDFQA_TIMEOUT")]
    timeout: Option<u64>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFQA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// libpdfium file or the directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the raw extracted text after loading.
    #[arg(long)]
    show_text: bool,

    /// Print answers as JSON lines.
    #[arg(long, env = "PDFQA_JSON")]
    json: bool,

    /// Disable spinners.
    #[arg(long, env = "PDFQA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Empty,
    Quit,
    Help,
    ToggleText,
    Load(PathBuf),
    Ask(String),
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Ask(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" => Command::Help,
        "text" => Command::ToggleText,
        "load" if !arg.is_empty() => Command::Load(PathBuf::from(arg)),
        other => Command::Unknown(other.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Spinners carry the feedback; library logs only show with -v or
    // --no-progress.
    let filter = if cli.verbose {
        "debug"
    } else if cli.no_progress {
        "info"
    } else {
        "error"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress: Option<ProgressCallback> = if cli.no_progress || cli.json {
        None
    } else {
        Some(CliProgress::new() as ProgressCallback)
    };

    let config = build_config(&cli, progress).await?;
    let backend = resolve_backend(&config).context("Failed to set up the LLM backend")?;

    if cli.questions.is_empty() {
        run_interactive(&cli, backend, config).await
    } else {
        run_batch(&cli, backend, config).await
    }
}

/// Answer the `-q` questions in order. A failed question is reported and the
/// next one still runs.
async fn run_batch(cli: &Cli, backend: Arc<dyn ChatBackend>, config: SessionConfig) -> Result<()> {
    let session = load(&cli.input, backend, config)
        .await
        .context("Failed to load PDF")?;
    if cli.show_text {
        print_extracted(&session);
    }

    let mut failures = 0usize;
    for question in &cli.questions {
        if !ask_and_print(&session, question, cli.json).await {
            failures += 1;
        }
    }

    if failures > 0 {
        warn!("{}/{} questions failed", failures, cli.questions.len());
    }
    Ok(())
}

async fn run_interactive(
    cli: &Cli,
    backend: Arc<dyn ChatBackend>,
    config: SessionConfig,
) -> Result<()> {
    let mut show_text = cli.show_text;
    let mut session = match load(&cli.input, Arc::clone(&backend), config.clone()).await {
        Ok(s) => Some(s),
        Err(e) => {
            print_error(&e);
            None
        }
    };
    if let (true, Some(s)) = (show_text, session.as_ref()) {
        print_extracted(s);
    }

    eprintln!(
        "{} {}",
        cyan("◆"),
        bold("Ask a question based on the PDF content (:help for commands)")
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        io::stderr().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => eprintln!("{}", interactive_help()),
            Command::Unknown(name) => {
                eprintln!("{} unknown command ':{name}' (:help for commands)", red("✗"))
            }
            Command::ToggleText => {
                show_text = !show_text;
                eprintln!(
                    "{}",
                    dim(if show_text {
                        "Showing extracted text"
                    } else {
                        "Hiding extracted text"
                    })
                );
                if let (true, Some(s)) = (show_text, session.as_ref()) {
                    print_extracted(s);
                }
            }
            Command::Load(path) => {
                let result = if let Some(s) = session.as_mut() {
                    reload(s, &path).await
                } else {
                    match load(&path, Arc::clone(&backend), config.clone()).await {
                        Ok(s) => {
                            session = Some(s);
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                };
                match result {
                    Ok(()) => {
                        if let (true, Some(s)) = (show_text, session.as_ref()) {
                            print_extracted(s);
                        }
                    }
                    Err(e) => print_error(&e),
                }
            }
            Command::Ask(question) => match session.as_ref() {
                Some(s) => {
                    ask_and_print(s, &question, cli.json).await;
                }
                None => eprintln!(
                    "{} no document loaded; use :load <path>",
                    red("✗")
                ),
            },
        }
    }

    Ok(())
}

async fn load(
    path: &Path,
    backend: Arc<dyn ChatBackend>,
    config: SessionConfig,
) -> Result<Session, PdfQaError> {
    let bytes = read_pdf_file(path).await?;
    Session::open_with_backend(bytes, backend, config).await
}

async fn reload(session: &mut Session, path: &Path) -> Result<(), PdfQaError> {
    let bytes = read_pdf_file(path).await?;
    session.reload(bytes).await
}

/// Returns whether the question was answered.
async fn ask_and_print(session: &Session, question: &str, json: bool) -> bool {
    match session.ask(question).await {
        Ok(answer) => {
            if json {
                match serde_json::to_string(&answer) {
                    Ok(line) => println!("{line}"),
                    Err(e) => eprintln!("{} failed to serialise answer: {e}", red("✗")),
                }
            } else {
                println!("{}", bold("Response:"));
                println!("{}", answer.text);
            }
            true
        }
        Err(e) => {
            print_error(&e);
            false
        }
    }
}

fn print_error(e: &PdfQaError) {
    warn!("Interaction failed ({:?}): {}", e.kind(), e);
    eprintln!("{} {}", red("✗"), red(&e.user_message()));
}

fn print_extracted(session: &Session) {
    eprintln!(
        "{}",
        dim(&format!(
            "── Extracted Text ({} pages, {} chars) ──",
            session.page_count(),
            session.document().char_count()
        ))
    );
    println!("{}", session.extracted_text());
    if session.is_condensed() {
        eprintln!(
            "{}",
            dim("(answers use the condensed version of this text)")
        );
    }
}

fn interactive_help() -> &'static str {
    "  <question>     ask about the loaded document\n  \
     :text          toggle raw extracted text\n  \
     :load <path>   load another PDF\n  \
     :help          show this list\n  \
     :quit          exit (also Ctrl-D)"
}

/// Map CLI args to `SessionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SessionConfig> {
    let mut builder = SessionConfig::builder()
        .model(&cli.model)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .condense_threshold(cli.condense_threshold)
        .base_url(&cli.base_url);

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt.trim_end());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress(cb);
    }

    builder.build().context("Invalid configuration")
}
