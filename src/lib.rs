//! # warsaw-minpoints
//!
//! Turn the City of Warsaw's PDF of minimum admission points (the lowest
//! score among qualified candidates, per school and class profile) into
//! structured JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF URL
//!  │
//!  ├─ 1. Fetch    curl -L -k (or in-process reqwest) → data/*.pdf
//!  ├─ 2. Convert  pdftotext -layout -nopgbrk        → data/source.txt
//!  ├─ 3. Parse    split lines on 2+ whitespace       → Vec<Row>
//!  └─ 4. Write    atomic JSON write                  → data/schools-2025.json
//! ```
//!
//! Any external tool exiting non-zero aborts the run. Text lines that do not
//! look like table rows are skipped and counted, never treated as errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warsaw_minpoints::{extract, ExtractConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::default();
//!     let output = extract(&config).await?;
//!     eprintln!("{} rows → {}", output.rows.len(), output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! The parser is usable on its own:
//!
//! ```rust
//! use warsaw_minpoints::parse_rows;
//!
//! let rows = parse_rows("Wola   Technikum ABC   tech   2B   n.d.\n");
//! assert_eq!(rows[0].min_points, None);
//! assert_eq!(rows[0].min_points_raw, "n.d.");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `minpoints` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod query;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder, FetchBackend, DEFAULT_PDF_URL};
pub use error::ExtractError;
pub use extract::{extract, extract_from_text, extract_sync, load_rows, parse_text_file};
pub use output::{ExtractOutput, ParseStats, Row, StageTimings};
pub use pipeline::parse::{parse_line, parse_rows, parse_rows_with_stats, split_lines, LineOutcome};
pub use progress::{ExtractProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use query::{Page, RowFilter, SortMode, Summary, PAGE_SIZE};
