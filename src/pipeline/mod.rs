//! Pipeline stages for the PDF-to-JSON extraction.
//!
//! Each submodule implements exactly one step and is usable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ text ──▶ parse ──▶ write
//! (curl)   (pdftotext) (rows)  (JSON)
//! ```
//!
//! 1. [`fetch`] — download the PDF (external `curl` or in-process reqwest)
//! 2. [`text`]  — `pdftotext -layout -nopgbrk` into a text dump
//! 3. [`parse`] — split lines on wide gaps and build [`crate::Row`]s
//! 4. [`write`] — atomic JSON write
//!
//! [`command`] is the shared helper for running external tools.

pub mod command;
pub mod fetch;
pub mod parse;
pub mod text;
pub mod write;

use crate::error::ExtractError;
use std::path::Path;

/// Create the parent directory of `path` if it has one.
pub(crate) async fn ensure_parent(path: &Path) -> Result<(), ExtractError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExtractError::OutputWriteFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
    }
    Ok(())
}
