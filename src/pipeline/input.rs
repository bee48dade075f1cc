//! Input resolution: read a user-supplied path or URL into memory.
//!
//! Extraction works on an in-memory byte slice, so both local files and URL
//! downloads end up as a [`LoadedInput`]. The `%PDF` magic bytes are checked
//! here so callers get a meaningful error instead of a pdfium parse failure.

use crate::error::PdfQaError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// A document ready for upload.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// Display name: the file name of the path or the last URL segment.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a local file or download a URL.
pub async fn load_input(input: &str, timeout_secs: u64) -> Result<LoadedInput, PdfQaError> {
    if input.trim().is_empty() {
        return Err(PdfQaError::InvalidInput {
            input: input.to_string(),
        });
    }
    let loaded = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(Path::new(input)).await?
    };
    check_magic(&loaded)?;
    Ok(loaded)
}

/// Reject byte buffers that do not start with `%PDF`.
pub fn check_magic(input: &LoadedInput) -> Result<(), PdfQaError> {
    if input.bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    Err(PdfQaError::NotAPdf {
        filename: input.filename.clone(),
        magic: input.bytes.iter().take(4).copied().collect(),
    })
}

async fn read_local(path: &Path) -> Result<LoadedInput, PdfQaError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => PdfQaError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfQaError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(LoadedInput {
        filename: file_name_of(path),
        bytes,
    })
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<LoadedInput, PdfQaError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PdfQaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfQaError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PdfQaError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PdfQaError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PdfQaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(LoadedInput {
        filename: filename_from_url(url),
        bytes: bytes.to_vec(),
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| PathBuf::from(path).display().to_string())
}

/// Extract a reasonable filename from the URL path.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
