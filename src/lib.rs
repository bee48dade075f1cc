//! # edgequake-pdfqa
//!
//! Ask questions about a PDF and get Markdown answers from an LLM, optionally
//! grounded with live web-search snippets. Summaries and quizzes too.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Extract  pdfium text layer, page by page (spawn_blocking)
//!  ├─ 3. Session  replace the single current-document slot
//!  ├─ 4. Search   DuckDuckGo top-3 snippets (ask-with-web only)
//!  ├─ 5. Context  fixed-prefix truncation: 4000 / 6000 / 4000 chars
//!  └─ 6. LLM      one chat-completion request → Answer
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{Assistant, QaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential from OPENROUTER_API_KEY
//!     let assistant = Assistant::new(QaConfig::default())?;
//!     assistant.upload_input("paper.pdf").await?;
//!
//!     println!("{}", assistant.summarize().await?);
//!     println!("{}", assistant.ask_with_web("Who cites this work?").await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Extraction and session problems are `Err(PdfQaError)`. Remote failures
//! are not: a search error becomes part of the web context, and an LLM error
//! comes back as [`Answer::ProviderError`] or [`Answer::TransportError`],
//! whose `Display` reads like any other answer.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assistant;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assistant::{resolve_backend, Assistant};
pub use config::{QaConfig, QaConfigBuilder};
pub use document::{Document, DocumentStore};
pub use error::PdfQaError;
pub use pipeline::context::{build_context, Task};
pub use pipeline::extract::{extract_text, DocumentText, PageTextSource};
pub use pipeline::llm::{generate_answer, Answer, ChatCompletionsClient, CompletionBackend};
pub use pipeline::search::{search_web, DuckDuckGoSearch, SearchProvider, SearchSnippet};
