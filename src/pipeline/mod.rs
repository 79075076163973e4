//! Pipeline stages for PDF question answering.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the session can sequence them explicitly.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ [condense] ──▶ respond (per question)
//! (bytes)    (pdfium)    (LLM, once)    (LLM)
//! ```
//!
//! 1. [`input`]    — read the PDF into memory and check the `%PDF` magic
//! 2. [`extract`]  — concatenate page texts; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`condense`] — summarise text over the threshold
//! 4. [`respond`]  — answer a question from the working text

pub mod condense;
pub mod extract;
pub mod input;
pub mod respond;
