//! Windowed ledger.
//!
//! A validated, time-bounded view over raw feed records. The window is
//! anchored to the newest retained entry, never to wall-clock time, so
//! replayed historical feeds analyze identically to live ones. Eviction is
//! local cache policy; the feed itself is append-only.

use ringfence_core::prelude::{LedgerRecord, Transaction, WindowConfig};
use std::collections::VecDeque;
use tracing::debug;

/// Rolling window of validated transactions.
#[derive(Debug, Clone)]
pub struct WindowedLedger {
    window_secs: i64,
    min_window_size: usize,
    entries: VecDeque<Transaction>,
}

impl WindowedLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            window_secs: config.window_secs,
            min_window_size: config.min_window_size,
            entries: VecDeque::new(),
        }
    }

    /// Ingest a batch of raw records, returning how many were kept.
    ///
    /// Malformed records are dropped individually with a log line; one bad
    /// record never fails the batch. After ingest, every retained entry is
    /// within the window of the newest one.
    pub fn ingest(&mut self, records: &[LedgerRecord]) -> usize {
        let before = self.entries.len();
        for record in records {
            match Transaction::parse(record) {
                Ok(tx) => self.entries.push_back(tx),
                Err(e) => debug!(error = %e, "dropping malformed record"),
            }
        }
        let kept = self.entries.len() - before;
        self.prune();
        kept
    }

    /// Evict entries older than the window horizon. Handles out-of-order
    /// arrival, so a record already past the horizon is a no-op overall.
    fn prune(&mut self) {
        let Some(newest) = self.entries.iter().map(|t| t.epoch).max() else {
            return;
        };
        let horizon = newest - self.window_secs;
        self.entries.retain(|t| t.epoch >= horizon);
    }

    /// Snapshot of the current window, in arrival order.
    #[must_use]
    pub fn current_window(&self) -> Vec<Transaction> {
        self.entries.iter().cloned().collect()
    }

    /// Entries currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once enough entries are retained for analysis.
    #[must_use]
    pub fn has_minimum(&self) -> bool {
        self.entries.len() >= self.min_window_size
    }
}
