//! Record matching against a [`Criteria`] snapshot.

use plotsift_shared::{Criteria, TitleRow};
use regex::Regex;
use tracing::warn;

/// Compiled plot filter.
#[derive(Debug)]
enum PlotFilter {
    /// No filter configured: every plot passes.
    Any,
    Pattern(Regex),
    /// The configured pattern did not compile: no plot passes.
    Invalid,
}

/// Evaluates one [`Criteria`] against parsed rows and fetched plots.
///
/// Built once per scan and shared read-only by every line task.
#[derive(Debug)]
pub struct RecordMatcher {
    criteria: Criteria,
    plot_filter: PlotFilter,
}

impl RecordMatcher {
    /// Take ownership of `criteria` and compile its plot filter.
    pub fn new(criteria: Criteria) -> Self {
        let plot_filter = match criteria.plot_filter.as_deref() {
            None => PlotFilter::Any,
            Some(pattern) => match Regex::new(pattern) {
                Ok(re) => PlotFilter::Pattern(re),
                Err(e) => {
                    warn!(pattern, error = %e, "invalid plot filter, no record will match");
                    PlotFilter::Invalid
                }
            },
        };

        Self {
            criteria,
            plot_filter,
        }
    }

    /// The criteria this matcher was built from.
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// True when every configured column predicate holds for `row`.
    pub fn matches(&self, row: &TitleRow) -> bool {
        let c = &self.criteria;
        text_equals(&c.title_type, &row.title_type)
            && text_contains(&c.primary_title, &row.primary_title)
            && text_contains(&c.original_title, &row.original_title)
            && text_contains(&c.genre, &row.genres)
            && int_equals(c.start_year, row.start_year)
            && int_equals(c.end_year, row.end_year)
            && int_equals(c.runtime_minutes, row.runtime_minutes)
    }

    /// True when `plot` passes the plot filter (always, if none is set).
    pub fn plot_matches(&self, plot: &str) -> bool {
        match &self.plot_filter {
            PlotFilter::Any => true,
            PlotFilter::Pattern(re) => re.is_match(plot),
            PlotFilter::Invalid => false,
        }
    }
}

fn text_equals(want: &Option<String>, got: &str) -> bool {
    want.as_deref().is_none_or(|w| got == w)
}

fn text_contains(want: &Option<String>, got: &str) -> bool {
    want.as_deref().is_none_or(|w| got.contains(w))
}

fn int_equals(want: Option<i32>, got: i32) -> bool {
    want.is_none_or(|w| got == w)
}
