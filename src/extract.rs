//! Run the whole extraction: fetch → convert → parse → write.
//!
//! Stages run strictly in order and the first failure aborts the run. The
//! JSON file is only touched after parsing has finished, so a failed run
//! never leaves partial output behind.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::output::{ExtractOutput, ParseStats, Row, StageTimings};
use crate::pipeline::{fetch, parse, text, write};
use crate::progress::Stage;
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Download the PDF, convert it, parse it and write the JSON.
///
/// # Errors
/// Any failing stage aborts the run:
/// - `curl` / `pdftotext` exiting non-zero ([`ExtractError::CommandFailed`])
/// - the download not being a PDF
/// - I/O errors reading the dump or writing the output
///
/// Lines that do not parse are not errors; see [`ExtractOutput::stats`].
pub async fn extract(config: &ExtractConfig) -> Result<ExtractOutput, ExtractError> {
    let total_start = Instant::now();
    info!("Starting extraction: {}", config.url);

    let (pdf_path, fetch_ms) =
        run_stage(config, Stage::Fetch, fetch::fetch_pdf(config)).await?;

    let text_path = config.text_path();
    let ((), convert_ms) = run_stage(
        config,
        Stage::Convert,
        text::convert_to_text(&config.pdftotext_program, &pdf_path, &text_path),
    )
    .await?;

    let mut output = finish_from_text(config, &text_path).await?;
    output.timings.fetch_ms = fetch_ms;
    output.timings.convert_ms = convert_ms;
    output.timings.total_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Extraction complete: {} rows, {} lines skipped, {}ms total",
        output.stats.rows,
        output.stats.skipped(),
        output.timings.total_ms
    );
    Ok(output)
}

/// Parse an existing text dump and write the JSON, skipping fetch and convert.
///
/// Useful when the text was produced elsewhere or to re-run the parser after
/// tweaking it without hitting the network.
pub async fn extract_from_text(
    config: &ExtractConfig,
    text_path: impl AsRef<Path>,
) -> Result<ExtractOutput, ExtractError> {
    let total_start = Instant::now();
    let mut output = finish_from_text(config, text_path.as_ref()).await?;
    output.timings.total_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a current-thread tokio runtime internally.
pub fn extract_sync(config: &ExtractConfig) -> Result<ExtractOutput, ExtractError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(config))
}

/// Parse a text dump into rows without writing anything.
pub async fn parse_text_file(
    path: impl AsRef<Path>,
) -> Result<(Vec<Row>, ParseStats), ExtractError> {
    let text = text::read_text(path.as_ref()).await?;
    Ok(parse::parse_rows_with_stats(&text))
}

/// Load rows from a JSON file written by a previous run.
pub async fn load_rows(path: impl AsRef<Path>) -> Result<Vec<Row>, ExtractError> {
    write::load_rows(path.as_ref()).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Parse + write, shared by [`extract`] and [`extract_from_text`].
async fn finish_from_text(
    config: &ExtractConfig,
    text_path: &Path,
) -> Result<ExtractOutput, ExtractError> {
    let ((rows, stats), parse_ms) =
        run_stage(config, Stage::Parse, parse_text_file(text_path)).await?;

    info!(
        "Parsed {} rows from {} lines ({} header, {} blank, {} short, {} bad points)",
        stats.rows,
        stats.lines,
        stats.skipped_header,
        stats.skipped_blank,
        stats.skipped_columns,
        stats.skipped_points
    );
    if rows.is_empty() {
        warn!(
            "No rows parsed from {}; the document layout may have changed",
            text_path.display()
        );
    }

    let output_path = config.json_path();
    let ((), write_ms) = run_stage(
        config,
        Stage::Write,
        write::write_json(&rows, &output_path, config.pretty),
    )
    .await?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_extract_complete(stats.rows, stats.skipped());
    }

    Ok(ExtractOutput {
        rows,
        stats,
        output_path,
        timings: StageTimings {
            parse_ms,
            write_ms,
            ..StageTimings::default()
        },
    })
}

/// Await one stage, timing it and firing the progress callback around it.
async fn run_stage<T>(
    config: &ExtractConfig,
    stage: Stage,
    fut: impl Future<Output = Result<T, ExtractError>>,
) -> Result<(T, u64), ExtractError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    match fut.await {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_complete(stage, elapsed_ms);
            }
            Ok((value, elapsed_ms))
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_error(stage, &e.to_string());
            }
            Err(e)
        }
    }
}
