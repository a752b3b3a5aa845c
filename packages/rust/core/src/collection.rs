//! Run-scoped accumulator for matched records.

use std::collections::VecDeque;

use plotsift_shared::Record;
use tokio::sync::Mutex;

/// Matched records for one scan, newest first.
///
/// Each insert goes to the front, so the final order is the reverse of the
/// order in which line tasks finished. That order differs between runs.
#[derive(Debug, Default)]
pub struct ResultCollection {
    records: Mutex<VecDeque<Record>>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` at the front. The lock is held for the insert only.
    pub async fn prepend(&self, record: Record) {
        self.records.lock().await.push_front(record);
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Move every record out, front to back, leaving the collection empty.
    pub async fn take(&self) -> Vec<Record> {
        let mut records = self.records.lock().await;
        std::mem::take(&mut *records).into()
    }

    /// Consume the collection without locking.
    pub fn into_records(self) -> Vec<Record> {
        self.records.into_inner().into()
    }
}
