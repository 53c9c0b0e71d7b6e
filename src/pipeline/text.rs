//! Convert stage: PDF → layout-preserving plain text via `pdftotext`.
//!
//! `-layout` keeps the visual column spacing as runs of spaces, which is what
//! the row parser splits on. `-nopgbrk` drops the form feed between pages.

use crate::error::ExtractError;
use crate::pipeline::command;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, info};

/// Arguments for `pdftotext`.
pub fn pdftotext_args(pdf: &Path, txt: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-layout"),
        OsString::from("-nopgbrk"),
        pdf.as_os_str().to_os_string(),
        txt.as_os_str().to_os_string(),
    ]
}

/// Run `pdftotext` on `pdf`, writing `txt`.
pub async fn convert_to_text(program: &str, pdf: &Path, txt: &Path) -> Result<(), ExtractError> {
    info!("Extracting text: {} → {}", pdf.display(), txt.display());
    super::ensure_parent(txt).await?;
    command::run(program, &pdftotext_args(pdf, txt)).await?;
    Ok(())
}

/// Read a text dump, dropping any byte sequences that are not valid UTF-8.
pub async fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ExtractError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    let text = decode_dropping_invalid(&bytes);
    debug!(
        "Read {} bytes ({} chars) from {}",
        bytes.len(),
        text.chars().count(),
        path.display()
    );
    Ok(text)
}

/// Keep the valid UTF-8 runs of `bytes` and skip everything else.
pub fn decode_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
