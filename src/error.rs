//! Error types for the edgequake-pdfqa library.
//!
//! Two distinct failure tiers exist:
//!
//! * [`PdfQaError`] is **hard**: the operation cannot proceed at all
//!   (unreadable PDF, no document uploaded, provider not configured).
//!   Returned as `Err(PdfQaError)` and never mutates the session.
//!
//! * [`crate::pipeline::llm::Answer`] soft variants and the
//!   `"Web search error: …"` web blob are **soft**: a remote service failed,
//!   but the pipeline still produces a value. Callers render it as content.

use std::path::PathBuf;
use thiserror::Error;

/// All hard errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("'{filename}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: Vec<u8> },

    // ── Document errors ───────────────────────────────────────────────────
    /// pdfium could not parse the document (corrupt, unsupported, encrypted).
    #[error("Error processing PDF: {detail}")]
    DocumentParse { detail: String },

    /// An answer operation ran before any document was uploaded, or the
    /// uploaded document has no extractable text.
    #[error("Please upload a PDF first")]
    NoDocument,

    // ── Provider errors ───────────────────────────────────────────────────
    /// The LLM backend cannot be built (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library in the working\n\
directory, or install it on the system library path.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfQaError {
    /// `true` for the one failure class the caller should report as
    /// "the document itself is unusable".
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            PdfQaError::DocumentParse { .. } | PdfQaError::NotAPdf { .. }
        )
    }
}
