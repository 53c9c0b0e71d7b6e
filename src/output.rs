//! Output types: the parsed [`Row`] records and run statistics.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One admission threshold: a single profile (class) offered by a school.
///
/// Field names serialise in camelCase so the JSON matches what the viewer
/// consumes: `district`, `school`, `symbol`, `profile`, `minPoints`,
/// `minPointsRaw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Warsaw district (first column).
    pub district: String,
    /// School name; every column between the district and the symbol joined
    /// with single spaces.
    pub school: String,
    /// Short class code, e.g. `1A`.
    pub symbol: String,
    /// Profile (extended subjects) description.
    pub profile: String,
    /// Minimum points of qualified candidates. `None` when the document says
    /// no data is available.
    pub min_points: Option<f64>,
    /// The points token exactly as it appeared in the text.
    pub min_points_raw: String,
}

impl Row {
    /// `true` when the document had no points for this profile.
    pub fn has_no_data(&self) -> bool {
        self.min_points.is_none()
    }
}

/// Counters collected while parsing the text dump.
///
/// Every non-emitted line lands in exactly one of the `skipped_*` buckets, so
/// `lines == rows + skipped_blank + skipped_header + skipped_columns
/// + skipped_points` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Total lines examined.
    pub lines: usize,
    /// Rows emitted.
    pub rows: usize,
    /// Empty after stripping form feeds and whitespace.
    pub skipped_blank: usize,
    /// Column header lines.
    pub skipped_header: usize,
    /// Fewer than five columns.
    pub skipped_columns: usize,
    /// Last column neither a number nor the no-data marker.
    pub skipped_points: usize,
}

impl ParseStats {
    /// Lines that did not produce a row.
    pub fn skipped(&self) -> usize {
        self.skipped_blank + self.skipped_header + self.skipped_columns + self.skipped_points
    }
}

/// Wall-clock duration of each pipeline stage in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings {
    pub fetch_ms: u64,
    pub convert_ms: u64,
    pub parse_ms: u64,
    pub write_ms: u64,
    pub total_ms: u64,
}

/// Result of a full [`crate::extract`] run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutput {
    /// Parsed rows in document order.
    pub rows: Vec<Row>,
    /// Parse counters.
    pub stats: ParseStats,
    /// Where the JSON was written.
    pub output_path: PathBuf,
    /// Per-stage timings.
    pub timings: StageTimings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_serialises_camel_case_with_null_points() {
        let row = Row {
            district: "Wola".into(),
            school: "Technikum ABC".into(),
            symbol: "tech".into(),
            profile: "2B".into(),
            min_points: None,
            min_points_raw: "n.d.".into(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"district":"Wola","school":"Technikum ABC","symbol":"tech","profile":"2B","minPoints":null,"minPointsRaw":"n.d."}"#
        );
        assert!(row.has_no_data());
    }

    #[test]
    fn row_keeps_polish_characters_unescaped() {
        let row = Row {
            district: "Mokotów".into(),
            school: "XLI LO im. Joachima Lelewela".into(),
            symbol: "1A".into(),
            profile: "mat-fiz-inf".into(),
            min_points: Some(172.35),
            min_points_raw: "172.35".into(),
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("Mokotów"));
        assert!(json.contains(r#""minPoints":172.35"#));
    }

    #[test]
    fn skipped_sums_all_buckets() {
        let stats = ParseStats {
            lines: 10,
            rows: 4,
            skipped_blank: 2,
            skipped_header: 1,
            skipped_columns: 2,
            skipped_points: 1,
        };
        assert_eq!(stats.skipped(), 6);
        assert_eq!(stats.rows + stats.skipped(), stats.lines);
    }
}
