//! Per-line work: parse, match, enrich, collect.

use plotsift_omdb::PlotLookup;
use plotsift_shared::{Result, TitleRow};

use crate::collection::ResultCollection;
use crate::matcher::RecordMatcher;

/// What happened to one data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A column predicate failed; no lookup was made.
    Rejected,
    /// Columns matched but the fetched plot failed the plot filter.
    PlotFiltered,
    /// The record was added to the results.
    Collected,
}

/// Process one raw TSV line.
///
/// The lookup runs only for rows that pass the column predicates, and the
/// results lock is taken only after it returns. A line with too few columns
/// is an error for this line alone.
pub async fn process_line<L: PlotLookup>(
    line: &str,
    matcher: &RecordMatcher,
    lookup: &L,
    results: &ResultCollection,
) -> Result<LineOutcome> {
    let row = TitleRow::parse(line)?;
    if !matcher.matches(&row) {
        return Ok(LineOutcome::Rejected);
    }

    let mut record = row.into_record();
    record.plot = lookup.plot(&record.id).await;

    if !matcher.plot_matches(&record.plot) {
        return Ok(LineOutcome::PlotFiltered);
    }

    results.prepend(record).await;
    Ok(LineOutcome::Collected)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use plotsift_shared::{Criteria, PlotsiftError};

    use super::*;
    use crate::testing::StubLookup;

    const CARMENCITA: &str =
        "tt0000001\tshort\tCarmencita\tCarmencita\t0\t1894\t\\N\t1\tDocumentary,Short";

    async fn run(
        line: &str,
        criteria: Criteria,
        lookup: &StubLookup,
    ) -> (Result<LineOutcome>, ResultCollection) {
        let matcher = RecordMatcher::new(criteria);
        let results = ResultCollection::new();
        let outcome = process_line(line, &matcher, lookup, &results).await;
        (outcome, results)
    }

    #[tokio::test]
    async fn matching_title_is_enriched_and_collected() {
        let lookup = StubLookup::new("plot");
        let criteria = Criteria {
            primary_title: Some("Carmencita".into()),
            ..Criteria::default()
        };

        let (outcome, results) = run(CARMENCITA, criteria, &lookup).await;

        assert_eq!(outcome.unwrap(), LineOutcome::Collected);
        let records = results.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "tt0000001");
        assert_eq!(records[0].title, "Carmencita");
        assert_eq!(records[0].plot, "plot");
    }

    #[tokio::test]
    async fn mismatched_title_type_skips_lookup() {
        let lookup = StubLookup::new("plot");
        let criteria = Criteria {
            title_type: Some("movie".into()),
            ..Criteria::default()
        };

        let (outcome, results) = run(CARMENCITA, criteria, &lookup).await;

        assert_eq!(outcome.unwrap(), LineOutcome::Rejected);
        assert!(results.is_empty().await);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn plot_filter_miss_excludes_record() {
        let lookup = StubLookup::new("plot");
        let criteria = Criteria {
            primary_title: Some("Carmencita".into()),
            plot_filter: Some("^dance".into()),
            ..Criteria::default()
        };

        let (outcome, results) = run(CARMENCITA, criteria, &lookup).await;

        assert_eq!(outcome.unwrap(), LineOutcome::PlotFiltered);
        assert!(results.is_empty().await);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn plot_filter_hit_keeps_record() {
        let lookup = StubLookup::new("Carmencita does a dance");
        let criteria = Criteria {
            plot_filter: Some("dance$".into()),
            ..Criteria::default()
        };

        let (outcome, results) = run(CARMENCITA, criteria, &lookup).await;

        assert_eq!(outcome.unwrap(), LineOutcome::Collected);
        assert_eq!(results.len().await, 1);
    }

    #[tokio::test]
    async fn empty_plot_is_still_collected_without_filter() {
        let lookup = StubLookup::new("");

        let (outcome, results) = run(CARMENCITA, Criteria::default(), &lookup).await;

        assert_eq!(outcome.unwrap(), LineOutcome::Collected);
        assert_eq!(results.into_records()[0].plot, "");
    }

    #[tokio::test]
    async fn short_line_fails_without_side_effects() {
        let lookup = StubLookup::new("plot");

        let (outcome, results) = run("tt0000001\tshort", Criteria::default(), &lookup).await;

        assert!(matches!(
            outcome,
            Err(PlotsiftError::MalformedLine { found: 2, .. })
        ));
        assert!(results.is_empty().await);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }
}
