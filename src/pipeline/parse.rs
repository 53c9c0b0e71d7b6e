//! Parse stage: turn `pdftotext -layout` output into [`Row`] records.
//!
//! The table has no fixed schema in the text dump. Columns are recovered
//! from whitespace width alone:
//!
//! ```text
//! Mokotów   XLI LO im. J. Lelewela   1A   mat-fiz-inf   172.35
//! └─ [0] ─┘ └─────── [1 .. n-3] ───┘ [n-3]  └─ [n-2] ─┘ └ [n-1] ┘
//!  district          school          symbol   profile     points
//! ```
//!
//! A run of two or more whitespace characters separates columns; single
//! spaces stay inside a column. Anything that does not fit is dropped
//! silently and counted in [`ParseStats`]. If the published layout changes,
//! rows start disappearing rather than failing loudly.
//!
//! Lines end at any Unicode line boundary, not only `\n`: a form feed, a
//! lone `\r` or `U+2028` starts a new line (`\r\n` counts once). See
//! [`split_lines`].

use crate::output::{ParseStats, Row};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// First word of the repeated column header line.
pub const HEADER_PREFIX: &str = "Dzielnica";

/// Marker the document uses when no minimum is available ("brak danych").
pub const NO_DATA: &str = "n.d.";

/// Minimum number of columns for a data line.
pub const MIN_COLUMNS: usize = 5;

const FORM_FEED: char = '\u{000C}';

/// Characters that end a line, besides `\r\n` taken as one break.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{000B}', FORM_FEED, '\u{001C}', '\u{001D}', '\u{001E}', '\u{0085}',
    '\u{2028}', '\u{2029}',
];

static RE_COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

static RE_POINTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]+(?:\.[0-9]+)?|n\.d\.)$").unwrap());

/// Why a line did or did not become a row.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Row(Row),
    Blank,
    Header,
    TooFewColumns(usize),
    InvalidPoints(String),
}

/// Parse every line of `text`, keeping document order.
pub fn parse_rows(text: &str) -> Vec<Row> {
    parse_rows_with_stats(text).0
}

/// Like [`parse_rows`], also returning per-reason skip counters.
pub fn parse_rows_with_stats(text: &str) -> (Vec<Row>, ParseStats) {
    let mut rows = Vec::new();
    let mut stats = ParseStats::default();

    for (idx, line) in split_lines(text).enumerate() {
        stats.lines += 1;
        match parse_line(line, idx + 1) {
            LineOutcome::Row(row) => {
                stats.rows += 1;
                rows.push(row);
            }
            LineOutcome::Blank => stats.skipped_blank += 1,
            LineOutcome::Header => stats.skipped_header += 1,
            LineOutcome::TooFewColumns(_) => stats.skipped_columns += 1,
            LineOutcome::InvalidPoints(_) => stats.skipped_points += 1,
        }
    }

    (rows, stats)
}

/// Split `text` into lines at every Unicode line boundary.
///
/// A trailing terminator does not produce an extra empty line, and empty
/// input yields no lines.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(LINE_BREAKS) {
            Some(pos) => {
                let line = &rest[..pos];
                let width = if rest[pos..].starts_with("\r\n") {
                    2
                } else {
                    rest[pos..].chars().next().map_or(1, char::len_utf8)
                };
                rest = &rest[pos + width..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// Classify a single line. `line_no` is only used for logging.
pub fn parse_line(raw: &str, line_no: usize) -> LineOutcome {
    let cleaned: String = raw.chars().filter(|&c| c != FORM_FEED).collect();
    let line = cleaned.trim();

    if line.is_empty() {
        return LineOutcome::Blank;
    }
    if line.starts_with(HEADER_PREFIX) {
        return LineOutcome::Header;
    }

    let parts: Vec<&str> = RE_COLUMN_GAP.split(line).collect();
    let n = parts.len();
    if n < MIN_COLUMNS {
        debug!("line {}: {} columns, skipping: {:?}", line_no, n, line);
        return LineOutcome::TooFewColumns(n);
    }

    let points_raw = parts[n - 1].trim();
    if !RE_POINTS.is_match(points_raw) {
        debug!("line {}: bad points token {:?}, skipping", line_no, points_raw);
        return LineOutcome::InvalidPoints(points_raw.to_string());
    }

    let min_points = if points_raw == NO_DATA {
        None
    } else {
        match points_raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                debug!("line {}: points {:?} out of range, skipping", line_no, points_raw);
                return LineOutcome::InvalidPoints(points_raw.to_string());
            }
        }
    };

    let school = parts[1..n - 3]
        .iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    LineOutcome::Row(Row {
        district: parts[0].trim().to_string(),
        school,
        symbol: parts[n - 3].trim().to_string(),
        profile: parts[n - 2].trim().to_string(),
        min_points,
        min_points_raw: points_raw.to_string(),
    })
}
