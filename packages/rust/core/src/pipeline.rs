//! End-to-end `scan` pipeline: lines → match → enrich → collect.
//!
//! The driver spawns one task per data line with no concurrency limit, then
//! waits for every task before handing back the collected records. Very
//! large inputs without a `max_lines` cap therefore keep one task alive per
//! matching line until its lookup returns.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument, warn};

use plotsift_omdb::PlotLookup;
use plotsift_shared::{Criteria, Record, Result};

use crate::collection::ResultCollection;
use crate::matcher::RecordMatcher;
use crate::processor::{LineOutcome, process_line};

/// Lifecycle of one driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    /// Reading lines and spawning tasks.
    Running,
    /// Source exhausted or cap reached; waiting on outstanding tasks.
    Draining,
    Done,
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Matched records, most recently completed first.
    pub records: Vec<Record>,
    /// Number of line tasks spawned.
    pub dispatched: usize,
    /// Number of records collected.
    pub matched: usize,
    /// Tasks that ended in an error or a panic.
    pub failed: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting scan status.
pub trait ProgressReporter: Send + Sync {
    /// Called on every driver state change.
    fn state(&self, state: DriverState);
    /// Called after each line task is spawned.
    fn line_dispatched(&self, dispatched: usize);
    /// Called when a finished task reports a collected record.
    fn record_matched(&self, matched: usize);
    /// Called when the scan completes.
    fn done(&self, outcome: &ScanOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn state(&self, _state: DriverState) {}
    fn line_dispatched(&self, _dispatched: usize) {}
    fn record_matched(&self, _matched: usize) {}
    fn done(&self, _outcome: &ScanOutcome) {}
}

/// Drives scans for one set of criteria and one lookup client.
pub struct Scanner<L> {
    matcher: Arc<RecordMatcher>,
    lookup: Arc<L>,
}

impl<L: PlotLookup> Scanner<L> {
    pub fn new(criteria: Criteria, lookup: Arc<L>) -> Self {
        Self {
            matcher: Arc::new(RecordMatcher::new(criteria)),
            lookup,
        }
    }

    /// Run one scan over `source`.
    ///
    /// The first line is a header and is skipped. Reading stops as soon as
    /// `max_lines` tasks have been dispatched. Errors inside a line task are
    /// counted in [`ScanOutcome::failed`]. Invalid UTF-8 is decoded lossily;
    /// only an I/O error on `source` is returned, and only after every
    /// dispatched task has finished.
    #[instrument(skip_all, fields(max_lines = ?self.matcher.criteria().max_lines))]
    pub async fn run<R>(&self, mut source: R, progress: &dyn ProgressReporter) -> Result<ScanOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        let start = Instant::now();
        let cap = self.matcher.criteria().max_lines;
        let results = Arc::new(ResultCollection::new());
        let mut tasks: JoinSet<Result<LineOutcome>> = JoinSet::new();
        let mut tally = Tally::default();
        let mut buf = Vec::new();
        let mut read_error = None;
        let mut header_skipped = false;

        transition(progress, DriverState::NotStarted);
        info!("starting scan");
        transition(progress, DriverState::Running);

        loop {
            if header_skipped && cap.is_some_and(|max| tally.dispatched >= max) {
                debug!(dispatched = tally.dispatched, "line cap reached, stopping read");
                break;
            }

            let line = match read_line(&mut source, &mut buf).await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            };

            if !header_skipped {
                header_skipped = true;
                continue;
            }

            let matcher = Arc::clone(&self.matcher);
            let lookup = Arc::clone(&self.lookup);
            let results = Arc::clone(&results);
            tasks.spawn(async move {
                process_line(&line, &matcher, lookup.as_ref(), &results).await
            });

            tally.dispatched += 1;
            progress.line_dispatched(tally.dispatched);

            while let Some(joined) = tasks.try_join_next() {
                tally.record(joined, progress);
            }
        }

        transition(progress, DriverState::Draining);
        while let Some(joined) = tasks.join_next().await {
            tally.record(joined, progress);
        }
        transition(progress, DriverState::Done);

        if let Some(e) = read_error {
            warn!(error = %e, dispatched = tally.dispatched, "input read failed");
            return Err(e.into());
        }

        let outcome = ScanOutcome {
            records: results.take().await,
            dispatched: tally.dispatched,
            matched: tally.matched,
            failed: tally.failed,
            elapsed: start.elapsed(),
        };

        info!(
            dispatched = outcome.dispatched,
            matched = outcome.matched,
            failed = outcome.failed,
            duration_ms = outcome.elapsed.as_millis(),
            "scan completed"
        );

        progress.done(&outcome);
        Ok(outcome)
    }
}

/// Read one line, dropping the `\n` or `\r\n` terminator.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD so a single bad
/// line never ends the scan. `Ok(None)` means end of input.
async fn read_line<R>(source: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if source.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn transition(progress: &dyn ProgressReporter, state: DriverState) {
    debug!(?state, "driver state");
    progress.state(state);
}

/// Running counters, updated as tasks are joined.
#[derive(Debug, Default)]
struct Tally {
    dispatched: usize,
    matched: usize,
    failed: usize,
}

impl Tally {
    fn record(
        &mut self,
        joined: std::result::Result<Result<LineOutcome>, JoinError>,
        progress: &dyn ProgressReporter,
    ) {
        match joined {
            Ok(Ok(LineOutcome::Collected)) => {
                self.matched += 1;
                progress.record_matched(self.matched);
            }
            Ok(Ok(LineOutcome::Rejected | LineOutcome::PlotFiltered)) => {}
            Ok(Err(e)) => {
                self.failed += 1;
                debug!(error = %e, "line task failed");
            }
            Err(e) => {
                self.failed += 1;
                warn!(error = %e, "line task panicked");
            }
        }
    }
}
