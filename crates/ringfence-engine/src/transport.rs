//! Transport seams.
//!
//! The governor is generic over where ledger entries come from and where
//! alerts go. [`LedgerFeed`] is an append-only sequence consumed by cursor;
//! [`AlertSink`] is an append-only alert log. The in-memory implementations
//! back the test harness and single-process deployments.

use async_trait::async_trait;
use ringfence_core::prelude::{Alert, LedgerRecord, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// A feed record with its feed-assigned sequence number.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// Monotonically increasing position in the feed, starting at 1.
    pub seq: u64,
    /// The raw record.
    pub record: LedgerRecord,
}

/// Append-only source of ledger records.
#[async_trait]
pub trait LedgerFeed: Send + Sync {
    /// Fetch up to `max` entries with `seq > cursor`, waiting up to `wait`
    /// for at least one to appear. An empty result after the wait is not an
    /// error.
    async fn fetch_after(
        &self,
        cursor: u64,
        max: usize,
        wait: Duration,
    ) -> Result<Vec<LedgerEntry>>;
}

/// Append-only destination for alert records.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Append one alert.
    async fn append(&self, alert: &Alert) -> Result<()>;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// In-process ledger feed.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
    next_seq: AtomicU64,
    notify: Notify,
}

impl MemoryLedger {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record, returning its sequence number.
    pub fn push(&self, record: LedgerRecord) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.lock().unwrap().push(LedgerEntry { seq, record });
        self.notify.notify_waiters();
        seq
    }

    /// Total entries appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// True when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerFeed for MemoryLedger {
    async fn fetch_after(
        &self,
        cursor: u64,
        max: usize,
        wait: Duration,
    ) -> Result<Vec<LedgerEntry>> {
        let deadline = Instant::now() + wait;
        loop {
            {
                let entries = self.entries.lock().unwrap();
                let batch: Vec<LedgerEntry> = entries
                    .iter()
                    .filter(|e| e.seq > cursor)
                    .take(max)
                    .cloned()
                    .collect();
                if !batch.is_empty() {
                    return Ok(batch);
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }
            let _ = tokio::time::timeout(deadline - now, self.notify.notified()).await;
        }
    }
}

/// In-process alert log.
#[derive(Debug, Default)]
pub struct MemoryAlertLog {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    /// Alerts appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    /// True when no alerts have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AlertSink for MemoryAlertLog {
    async fn append(&self, alert: &Alert) -> Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
