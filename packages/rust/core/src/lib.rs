//! Scan pipeline for plotsift.
//!
//! This crate ties together row parsing, criteria matching, plot lookups and
//! result collection into the concurrent `scan` workflow:
//! - [`matcher`] — column and plot predicates
//! - [`processor`] — the work done for a single line
//! - [`collection`] — the lock-protected result list
//! - [`pipeline`] — the fan-out driver

pub mod collection;
pub mod matcher;
pub mod pipeline;
pub mod processor;

pub use collection::ResultCollection;
pub use matcher::RecordMatcher;
pub use pipeline::{DriverState, ProgressReporter, ScanOutcome, Scanner, SilentProgress};
pub use processor::{LineOutcome, process_line};

#[cfg(test)]
mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use plotsift_omdb::PlotLookup;

    /// Lookup that returns a fixed plot and counts calls.
    pub(crate) struct StubLookup {
        plot: String,
        pub(crate) calls: AtomicUsize,
    }

    impl StubLookup {
        pub(crate) fn new(plot: &str) -> Self {
            Self {
                plot: plot.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PlotLookup for StubLookup {
        async fn plot(&self, _id: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.plot.clone()
        }
    }
}
