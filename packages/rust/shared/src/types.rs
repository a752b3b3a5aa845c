//! Core domain types for plotsift scans.

use serde::{Deserialize, Serialize};

use crate::error::{PlotsiftError, Result};

/// Number of tab-separated columns a data line must carry.
pub const TITLE_ROW_FIELDS: usize = 9;

/// Marker the legacy flag surface used for "no filter on this column".
const LEGACY_UNSET: &str = "notset";

/// Integer counterpart of [`LEGACY_UNSET`].
const LEGACY_UNSET_INT: i32 = -1;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A matched title, optionally enriched with its plot summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// IMDb identifier (`tconst`), e.g. `tt0000001`.
    pub id: String,
    /// Primary title.
    pub title: String,
    /// Plot summary; empty until enrichment.
    #[serde(default)]
    pub plot: String,
}

// ---------------------------------------------------------------------------
// TitleRow
// ---------------------------------------------------------------------------

/// One parsed line of `title.basics.tsv`.
///
/// Column order: `tconst titleType primaryTitle originalTitle isAdult
/// startYear endYear runtimeMinutes genres`. Numeric columns that do not
/// parse (including the `\N` null marker) become `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRow {
    pub id: String,
    pub title_type: String,
    pub primary_title: String,
    pub original_title: String,
    pub is_adult: bool,
    pub start_year: i32,
    pub end_year: i32,
    pub runtime_minutes: i32,
    pub genres: String,
}

impl TitleRow {
    /// Split a raw TSV line into its fixed columns.
    ///
    /// Extra trailing columns are ignored; fewer than [`TITLE_ROW_FIELDS`]
    /// is an error.
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < TITLE_ROW_FIELDS {
            return Err(PlotsiftError::MalformedLine {
                expected: TITLE_ROW_FIELDS,
                found: fields.len(),
            });
        }

        Ok(Self {
            id: fields[0].to_string(),
            title_type: fields[1].to_string(),
            primary_title: fields[2].to_string(),
            original_title: fields[3].to_string(),
            is_adult: fields[4] == "1",
            start_year: lenient_int(fields[5]),
            end_year: lenient_int(fields[6]),
            runtime_minutes: lenient_int(fields[7]),
            genres: fields[8].to_string(),
        })
    }

    /// Drop the filter-only columns, keeping what gets listed.
    pub fn into_record(self) -> Record {
        Record {
            id: self.id,
            title: self.primary_title,
            plot: String::new(),
        }
    }
}

fn lenient_int(raw: &str) -> i32 {
    raw.parse().unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Filter configuration for one scan. `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    /// Exact match on `titleType` (e.g. `movie`, `short`).
    pub title_type: Option<String>,
    /// Substring of `primaryTitle`.
    pub primary_title: Option<String>,
    /// Substring of `originalTitle`.
    pub original_title: Option<String>,
    /// Substring of the comma-separated `genres` column.
    pub genre: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub runtime_minutes: Option<i32>,
    /// Regular expression the fetched plot must match.
    pub plot_filter: Option<String>,
    /// Maximum number of data lines to dispatch.
    pub max_lines: Option<usize>,
}

impl Criteria {
    /// Fold the legacy sentinels into `None`.
    ///
    /// Only the exact markers are folded: the string `notset`, the integer
    /// `-1`, and a cap of `0`. Any other value, including `""` or `-5`,
    /// stays a real filter.
    pub fn normalized(self) -> Self {
        Self {
            title_type: unset_text(self.title_type),
            primary_title: unset_text(self.primary_title),
            original_title: unset_text(self.original_title),
            genre: unset_text(self.genre),
            start_year: unset_int(self.start_year),
            end_year: unset_int(self.end_year),
            runtime_minutes: unset_int(self.runtime_minutes),
            plot_filter: unset_text(self.plot_filter),
            max_lines: self.max_lines.filter(|&n| n > 0),
        }
    }
}

fn unset_text(value: Option<String>) -> Option<String> {
    value.filter(|v| v != LEGACY_UNSET)
}

fn unset_int(value: Option<i32>) -> Option<i32> {
    value.filter(|&v| v != LEGACY_UNSET_INT)
}
