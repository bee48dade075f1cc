//! Pipeline stages for document question answering.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and replaceable behind its trait seam.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ [session] ──▶ context ──▶ llm
//! (path/URL) (pdfium)               ▲  (truncate)  (chat completion)
//!                       search ─────┘
//!                       (web snippets, QaWithWeb only)
//! ```
//!
//! 1. [`input`]: read a local path or download a URL, check `%PDF`
//! 2. [`extract`]: pdfium text layer, page by page; runs in `spawn_blocking`
//! 3. [`search`]: top web results flattened to a bounded blob; fails soft
//! 4. [`context`]: fixed-prefix truncation per task
//! 5. [`llm`]: one request per call; fails soft into [`llm::Answer`]

pub mod context;
pub mod extract;
pub mod input;
pub mod llm;
pub mod search;
