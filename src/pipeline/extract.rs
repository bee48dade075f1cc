//! Text extraction: PDF bytes → one plain-text string via pdfium.
//!
//! ## Threading
//!
//! pdfium is synchronous and CPU-bound, so page sources always run inside
//! `tokio::task::spawn_blocking`.
//!
//! ## Page joining
//!
//! Each page that yields text contributes `text + "\n"`; a page with no text
//! layer (scans, blank pages, figure-only pages) contributes nothing at all.
//! The rule lives in [`join_page_texts`], independent of pdfium.

use crate::error::PdfQaError;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    /// Concatenated page text, each contributing page followed by `\n`.
    pub text: String,
    /// Pages in the document.
    pub page_count: usize,
    /// Pages that contributed text.
    pub pages_with_text: usize,
}

/// Produces the raw text of every page of a document, in order.
///
/// `None` (or an empty string) marks a page with no extractable text.
/// Structural failures must be reported as [`PdfQaError::DocumentParse`].
pub trait PageTextSource: Send + Sync {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<Option<String>>, PdfQaError>;
}

/// Join per-page text in document order, skipping pages without text.
pub fn join_page_texts<I>(pages: I) -> DocumentText
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut text = String::new();
    let mut page_count = 0;
    let mut pages_with_text = 0;

    for page in pages {
        page_count += 1;
        match page {
            Some(t) if !t.is_empty() => {
                text.push_str(&t);
                text.push('\n');
                pages_with_text += 1;
            }
            _ => debug!("Page {}: no extractable text, skipped", page_count),
        }
    }

    DocumentText {
        text,
        page_count,
        pages_with_text,
    }
}

/// Extract the text of a PDF held in memory using pdfium.
pub async fn extract_text(bytes: Vec<u8>) -> Result<DocumentText, PdfQaError> {
    extract_text_with(Arc::new(PdfiumTextSource), bytes).await
}

/// Extract the text of a document using a caller-supplied page source.
///
/// Runs inside `spawn_blocking` since page sources are synchronous.
pub async fn extract_text_with(
    source: Arc<dyn PageTextSource>,
    bytes: Vec<u8>,
) -> Result<DocumentText, PdfQaError> {
    let size = bytes.len();
    let pages = tokio::task::spawn_blocking(move || source.page_texts(&bytes))
        .await
        .map_err(|e| PdfQaError::Internal(format!("Extraction task panicked: {}", e)))??;

    let doc = join_page_texts(pages);
    info!(
        "Extracted {} chars from {}/{} pages ({} bytes)",
        doc.text.chars().count(),
        doc.pages_with_text,
        doc.page_count,
        size
    );
    Ok(doc)
}

/// [`PageTextSource`] backed by the pdfium text layer.
///
/// The library is bound on every call from, in order: `PDFIUM_LIB_PATH`, the
/// working directory, the system library path.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumTextSource;

impl PageTextSource for PdfiumTextSource {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<Option<String>>, PdfQaError> {
        let pdfium = bind_pdfium()?;

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| PdfQaError::DocumentParse {
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        debug!("PDF loaded: {} pages", pages.len());

        let texts = pages
            .iter()
            .enumerate()
            .map(|(idx, page)| match page.text() {
                Ok(text) => Some(text.all()),
                Err(e) => {
                    warn!("Page {}: text layer unreadable, skipped: {:?}", idx + 1, e);
                    None
                }
            })
            .collect();

        Ok(texts)
    }
}

/// Bind to a pdfium shared library.
fn bind_pdfium() -> Result<Pdfium, PdfQaError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(PathBuf::from(path)),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PdfQaError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}
