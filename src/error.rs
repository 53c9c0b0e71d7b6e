//! Error types for the warsaw-minpoints library.
//!
//! Only one kind of failure is represented here: the **fatal** kind, where the
//! run cannot continue (a tool exited non-zero, the download failed, the
//! output could not be written). A text line that does not look like a table
//! row is *not* an error. The parser drops it and counts it in
//! [`crate::output::ParseStats`].

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// All fatal errors returned by the warsaw-minpoints library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── External tools ────────────────────────────────────────────────────
    /// An external command ran but exited with a non-zero status.
    ///
    /// Both captured streams are kept so the caller can show what the tool
    /// actually said.
    #[error("Command failed ({status}): {command}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    /// The external command could not be started at all (not installed,
    /// not executable).
    #[error("Failed to run '{program}': {source}\nIs it installed and on PATH?")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // ── Download errors ───────────────────────────────────────────────────
    /// HTTP request failed or returned a non-success status.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The downloaded file is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an intermediate or input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rows could not be encoded to, or decoded from, JSON.
    #[error("JSON error for '{path}': {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
