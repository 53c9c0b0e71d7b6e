//! Filtering, sorting and grouping of parsed rows.
//!
//! These mirror what the public results table offers on top of the JSON:
//! free-text search, a district picker, a points range, an opt-in for rows
//! without data, four orderings that keep each school's profiles together,
//! and fixed-size pages.
//!
//! Text comparison follows Polish alphabetical order (`ą` after `a`, `ł`
//! after `l`, …) and ignores case.

use crate::output::Row;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;

// ── Filtering ────────────────────────────────────────────────────────────

/// Row filter. The default keeps every row that has points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    /// Case-insensitive substring over school, profile, symbol and district.
    pub search: Option<String>,
    /// Exact district name.
    pub district: Option<String>,
    /// Inclusive lower bound on points.
    pub min_points: Option<f64>,
    /// Inclusive upper bound on points.
    pub max_points: Option<f64>,
    /// Keep rows whose points are `n.d.`. Bounds never apply to them.
    pub include_no_data: bool,
}

impl RowFilter {
    pub fn matches(&self, row: &Row) -> bool {
        if let Some(query) = self.search.as_deref().map(str::trim) {
            if !query.is_empty() {
                let haystack = format!(
                    "{} {} {} {}",
                    row.school, row.profile, row.symbol, row.district
                )
                .to_lowercase();
                if !haystack.contains(&query.to_lowercase()) {
                    return false;
                }
            }
        }

        if let Some(ref district) = self.district {
            if !district.is_empty() && &row.district != district {
                return false;
            }
        }

        let Some(points) = row.min_points else {
            return self.include_no_data;
        };

        if self.min_points.is_some_and(|min| points < min) {
            return false;
        }
        if self.max_points.is_some_and(|max| points > max) {
            return false;
        }
        true
    }

    /// Rows that pass the filter, in input order.
    pub fn apply<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

// ── Sorting ──────────────────────────────────────────────────────────────

/// Ordering of the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// District, then school. (default)
    #[default]
    DistrictAsc,
    /// School, then district.
    SchoolAsc,
    /// Schools by their highest threshold, highest first.
    PointsDesc,
    /// Schools by their lowest threshold, lowest first.
    PointsAsc,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "district-asc" | "district" => Ok(SortMode::DistrictAsc),
            "school-asc" | "school" => Ok(SortMode::SchoolAsc),
            "points-desc" => Ok(SortMode::PointsDesc),
            "points-asc" => Ok(SortMode::PointsAsc),
            other => Err(format!(
                "unknown sort mode '{other}' (expected district-asc, school-asc, points-desc, points-asc)"
            )),
        }
    }
}

/// Rows of one school, as produced by [`sort_rows`] and [`group_consecutive`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolGroup<'a> {
    pub district: &'a str,
    pub school: &'a str,
    pub rows: Vec<&'a Row>,
}

impl SchoolGroup<'_> {
    fn best_points(&self, mode: SortMode) -> Option<f64> {
        let points = self.rows.iter().filter_map(|r| r.min_points);
        match mode {
            SortMode::PointsAsc => points.reduce(f64::min),
            _ => points.reduce(f64::max),
        }
    }
}

/// Sort rows, keeping each (district, school) pair together.
///
/// Inside a school, profiles go by points (highest first, or lowest first
/// for [`SortMode::PointsAsc`]) with `n.d.` last and symbol as tie-break.
pub fn sort_rows<'a>(rows: &[&'a Row], mode: SortMode) -> Vec<&'a Row> {
    let mut groups = group_by_school(rows);

    let direction = if mode == SortMode::PointsAsc {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    for group in &mut groups {
        group.rows.sort_by(|a, b| {
            compare_points(a.min_points, b.min_points, direction)
                .then_with(|| collate(&a.symbol, &b.symbol))
        });
    }

    groups.sort_by(|a, b| match mode {
        SortMode::DistrictAsc => {
            collate(a.district, b.district).then_with(|| collate(a.school, b.school))
        }
        SortMode::SchoolAsc => {
            collate(a.school, b.school).then_with(|| collate(a.district, b.district))
        }
        SortMode::PointsDesc | SortMode::PointsAsc => {
            compare_points(a.best_points(mode), b.best_points(mode), direction)
                .then_with(|| collate(a.school, b.school))
        }
    });

    groups.into_iter().flat_map(|g| g.rows).collect()
}

/// Split rows into runs that share district and school, without reordering.
pub fn group_consecutive<'a>(rows: &[&'a Row]) -> Vec<SchoolGroup<'a>> {
    let mut groups: Vec<SchoolGroup<'a>> = Vec::new();
    for &row in rows {
        if let Some(g) = groups.last_mut() {
            if g.district == row.district && g.school == row.school {
                g.rows.push(row);
                continue;
            }
        }
        groups.push(SchoolGroup {
            district: &row.district,
            school: &row.school,
            rows: vec![row],
        });
    }
    groups
}

/// Group by (district, school) in first-seen order.
fn group_by_school<'a>(rows: &[&'a Row]) -> Vec<SchoolGroup<'a>> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<SchoolGroup<'a>> = Vec::new();
    for &row in rows {
        let key = (row.district.as_str(), row.school.as_str());
        match index.get(&key) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(SchoolGroup {
                    district: &row.district,
                    school: &row.school,
                    rows: vec![row],
                });
            }
        }
    }
    groups
}

/// `wanted` is the ordering a higher value should get; missing points last.
fn compare_points(a: Option<f64>, b: Option<f64>, wanted: Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if wanted == Ordering::Greater {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

// ── Collation ────────────────────────────────────────────────────────────

const POLISH_ALPHABET: &str = "aąbcćdeęfghijklłmnńoópqrsśtuvwxyzźż";

/// Case-insensitive comparison in Polish alphabetical order.
///
/// Letters of the Polish alphabet sort by their position in it. Accented
/// Latin letters outside it (`é`, `ü`, `ñ`, ...) sort as their base letter.
/// Any other character sorts before letters (digits, punctuation) by code
/// point.
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

fn collation_key(s: &str) -> Vec<u32> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            let letter = POLISH_ALPHABET
                .chars()
                .position(|p| p == c)
                .or_else(|| {
                    let base = fold_accent(c);
                    POLISH_ALPHABET.chars().position(|p| p == base)
                });
            match letter {
                Some(pos) => 0x0011_0000 + pos as u32,
                None => c as u32,
            }
        })
        .collect()
}

/// Base letter of a lowercase accented Latin letter outside the Polish
/// alphabet. Other characters are returned unchanged.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' => 'a',
        'ç' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' | 'ħ' => 'h',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' => 'l',
        'ñ' | 'ņ' | 'ň' => 'n',
        'ò' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' => 'y',
        'ž' => 'z',
        _ => c,
    }
}

// ── Paging ───────────────────────────────────────────────────────────────

/// Rows per page in the results table.
pub const PAGE_SIZE: usize = 25;

/// One page out of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number, clamped to `1..=total_pages`.
    pub number: usize,
    pub total_pages: usize,
    /// Index range of the page in the full list.
    pub start: usize,
    pub end: usize,
}

impl Page {
    /// Page `number` of a list with `total` items. There is always at least
    /// one page, and out-of-range numbers land on the first or last page.
    pub fn of(total: usize, number: usize, page_size: usize) -> Self {
        let size = page_size.max(1);
        let total_pages = total.div_ceil(size).max(1);
        let number = number.clamp(1, total_pages);
        let start = ((number - 1) * size).min(total);
        let end = (start + size).min(total);
        Self {
            number,
            total_pages,
            start,
            end,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start..self.end]
    }
}

// ── Summary ──────────────────────────────────────────────────────────────

/// Headline counts for a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Profiles (rows).
    pub rows: usize,
    /// Distinct school names.
    pub schools: usize,
    /// Distinct districts.
    pub districts: usize,
}

pub fn summarize(rows: &[&Row]) -> Summary {
    let schools: HashSet<&str> = rows.iter().map(|r| r.school.as_str()).collect();
    let districts: HashSet<&str> = rows.iter().map(|r| r.district.as_str()).collect();
    Summary {
        rows: rows.len(),
        schools: schools.len(),
        districts: districts.len(),
    }
}

/// Distinct districts in Polish alphabetical order.
pub fn districts(rows: &[Row]) -> Vec<&str> {
    let unique: BTreeSet<&str> = rows.iter().map(|r| r.district.as_str()).collect();
    let mut list: Vec<&str> = unique.into_iter().collect();
    list.sort_by(|a, b| collate(a, b));
    list
}
