//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn ExtractProgressCallback>`] via
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to hear about
//! each stage as the run advances. The library never prints anything itself;
//! the CLI turns these events into a spinner.
//!
//! # Example
//!
//! ```rust
//! use warsaw_minpoints::{ExtractConfig, ExtractProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ExtractProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{} done in {elapsed_ms}ms", stage.label());
//!     }
//! }
//!
//! let config = ExtractConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ExtractProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Fetch,
    Convert,
    Parse,
    Write,
}

impl Stage {
    /// All stages in the order [`crate::extract`] runs them.
    pub const ALL: [Stage; 4] = [Stage::Fetch, Stage::Convert, Stage::Parse, Stage::Write];

    /// Short human label, e.g. for a spinner prefix.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Fetch => "Downloading PDF",
            Stage::Convert => "Extracting text",
            Stage::Parse => "Parsing rows",
            Stage::Write => "Writing JSON",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the pipeline at each stage boundary.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is sequential, so events never overlap,
/// but the trait is `Send + Sync` so a callback can be shared with other
/// tasks.
pub trait ExtractProgressCallback: Send + Sync {
    /// Called just before a stage starts.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails; the run aborts right after.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the JSON has been written.
    ///
    /// * `rows`    — rows written
    /// * `skipped` — text lines that did not produce a row
    fn on_extract_complete(&self, rows: usize, skipped: usize) {
        let _ = (rows, skipped);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractConfig`].
pub type ProgressCallback = Arc<dyn ExtractProgressCallback>;
