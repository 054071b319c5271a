//! Text Extractor: pulls plain text out of an uploaded PDF and normalizes it.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Below this many characters the PDF is treated as image-based, encrypted or corrupted.
pub const MIN_TEXT_LENGTH: usize = 50;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("Failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse PDF: {0}")]
    Parse(String),

    #[error("No text could be extracted from the PDF")]
    Empty,

    #[error(
        "Extracted text is too short ({length} characters, minimum {min}); \
         the PDF may be image-based, encrypted or corrupted",
        min = MIN_TEXT_LENGTH
    )]
    InsufficientContent { length: usize },
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the raw text of the document at `path`.
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// `pdf-extract` backed extractor. Parsing runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;
        debug!("Extracting text from {} ({} bytes)", path.display(), bytes.len());

        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::Parse(format!("extraction task failed: {e}")))?
            .map_err(|e| ExtractionError::Parse(e.to_string()))
    }
}

/// Number of characters, as counted for the length thresholds and response metadata.
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

/// Rejects raw extractor output that is empty or obviously too short.
pub fn check_raw_text(raw: &str) -> Result<(), ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::Empty);
    }
    let length = char_length(trimmed);
    if length < MIN_TEXT_LENGTH {
        return Err(ExtractionError::InsufficientContent { length });
    }
    Ok(())
}

/// Collapses whitespace: runs containing a newline become one `\n`, other
/// runs become one space. Leading and trailing whitespace is dropped.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending: Option<char> = None;

    for c in raw.chars() {
        if c.is_whitespace() {
            pending = match (pending, c) {
                (_, '\n') | (Some('\n'), _) => Some('\n'),
                _ => Some(' '),
            };
            continue;
        }
        if let Some(sep) = pending.take() {
            if !out.is_empty() {
                out.push(sep);
            }
        }
        out.push(c);
    }
    out
}

/// Normalizes raw text and re-validates the minimum length.
pub fn clean_text(raw: &str) -> Result<String, ExtractionError> {
    check_raw_text(raw)?;
    let cleaned = normalize_text(raw);
    let length = char_length(&cleaned);
    if length < MIN_TEXT_LENGTH {
        return Err(ExtractionError::InsufficientContent { length });
    }
    Ok(cleaned)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
