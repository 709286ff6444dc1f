//! Enforcement loop.
//!
//! The governor drives one cycle at a time: fetch new feed entries past the
//! cursor, rebuild the analysis window, run the three detectors over one
//! shared snapshot, publish alerts, then ban every implicated account.
//!
//! Banning feeds back into detection: banned accounts' transactions are
//! excluded from every later window, so a ring is reported once and then
//! disappears from analysis. System accounts are exempt; they sit at the
//! laundering source and destination and must stay visible. Shutdown is
//! honored only between cycles, never mid-cycle.

use crate::ledger::WindowedLedger;
use crate::publisher::AlertPublisher;
use crate::transport::{AlertSink, LedgerFeed};
use ringfence_core::prelude::{
    GovernorConfig, LayeringCase, LedgerRecord, Result, SmurfingCase, Transaction, TriangleCase,
};
use ringfence_detect::prelude::{CycleDetector, FanOutDetector, FlowGraph, TriangleDetector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

// ============================================================================
// Ban handling
// ============================================================================

/// Enforcement callback invoked once per newly banned account.
pub trait BanHandler: Send + Sync {
    /// Apply the ban downstream (freeze the account, notify the simulation,
    /// etc.). Infallible by contract; implementations handle their own
    /// errors.
    fn ban(&self, account: &str);
}

impl<F> BanHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn ban(&self, account: &str) {
        self(account);
    }
}

/// Set of banned accounts. Insertion is idempotent; there is no unban.
#[derive(Debug, Default, Clone)]
pub struct BanRegistry {
    banned: HashSet<String>,
}

impl BanRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ban. Returns true only the first time.
    pub fn insert(&mut self, account: &str) -> bool {
        self.banned.insert(account.to_owned())
    }

    /// True when the account is banned.
    #[must_use]
    pub fn contains(&self, account: &str) -> bool {
        self.banned.contains(account)
    }

    /// Number of banned accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.banned.len()
    }

    /// True when no account is banned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.banned.is_empty()
    }
}

// ============================================================================
// Governor
// ============================================================================

/// Phase of the enforcement loop. Externally the governor is always
/// observed `Idle`; the intermediate phases exist for in-cycle logging and
/// the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GovernorState {
    /// Between cycles.
    #[default]
    Idle,
    /// Pulling new entries from the feed.
    Fetching,
    /// Running the detectors over the window snapshot.
    Analyzing,
    /// Applying bans for implicated accounts.
    Banning,
}

/// What happened during one cycle.
#[derive(Debug, Default, Clone)]
pub struct CycleReport {
    /// Entries fetched from the feed.
    pub fetched: usize,
    /// Whether the detectors ran (enough usable window entries).
    pub analyzed: bool,
    /// Layering cases found.
    pub layering: usize,
    /// Smurfing cases found.
    pub smurfing: usize,
    /// Structuring cases found.
    pub structuring: usize,
    /// Alerts actually delivered to the sink.
    pub published: usize,
    /// Accounts banned for the first time this cycle, sorted.
    pub newly_banned: Vec<String>,
}

/// The enforcement loop.
pub struct Governor {
    config: GovernorConfig,
    feed: Arc<dyn LedgerFeed>,
    publisher: AlertPublisher,
    ban_handler: Arc<dyn BanHandler>,
    cursor: u64,
    buffer: VecDeque<LedgerRecord>,
    registry: BanRegistry,
    state: GovernorState,
}

impl Governor {
    /// Create a governor over a feed and a sink.
    pub fn new(
        config: GovernorConfig,
        feed: Arc<dyn LedgerFeed>,
        sink: Arc<dyn AlertSink>,
        ban_handler: Arc<dyn BanHandler>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            feed,
            publisher: AlertPublisher::new(sink),
            ban_handler,
            cursor: 0,
            buffer: VecDeque::new(),
            registry: BanRegistry::new(),
            state: GovernorState::Idle,
        })
    }

    /// Feed position of the last consumed entry.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// The ban registry.
    #[must_use]
    pub fn registry(&self) -> &BanRegistry {
        &self.registry
    }

    /// Current loop phase.
    #[must_use]
    pub fn state(&self) -> GovernorState {
        self.state
    }

    /// Run one fetch–analyze–publish–ban cycle. The governor is `Idle`
    /// again by the time this returns.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        // Fetch. The cursor only moves forward, so an already-consumed
        // range is never re-fetched and never re-triggers analysis.
        self.state = GovernorState::Fetching;
        let wait = Duration::from_millis(self.config.loop_.fetch_wait_ms);
        let entries = match self
            .feed
            .fetch_after(self.cursor, self.config.loop_.fetch_batch, wait)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "feed fetch failed, retrying next cycle");
                self.state = GovernorState::Idle;
                return report;
            }
        };
        report.fetched = entries.len();
        for entry in entries {
            self.cursor = self.cursor.max(entry.seq);
            self.buffer.push_back(entry.record);
            while self.buffer.len() > self.config.loop_.buffer_capacity {
                self.buffer.pop_front();
            }
        }
        if report.fetched == 0 {
            self.state = GovernorState::Idle;
            return report;
        }

        // Analyze. The window is rebuilt from the rolling buffer each cycle
        // so freshly banned accounts drop out of history, not just out of
        // new arrivals.
        self.state = GovernorState::Analyzing;
        let Some(window) = self.build_window() else {
            debug!("window below minimum size, skipping analysis");
            self.state = GovernorState::Idle;
            return report;
        };
        report.analyzed = true;

        let graph = FlowGraph::build(&window, &self.config.graph);
        let layering = Self::guard("layering", || {
            CycleDetector::detect(&graph, &window, &self.config.layering)
        });
        let smurfing = Self::guard("smurfing", || {
            FanOutDetector::detect(&graph, &window, &self.config.smurfing)
        });
        let structuring = Self::guard("structuring", || TriangleDetector::detect(&graph));
        report.layering = layering.len();
        report.smurfing = smurfing.len();
        report.structuring = structuring.len();

        // Ban from the in-memory results, not the published alerts, so a
        // sink outage cannot stall enforcement.
        let implicated = Self::implicated(&layering, &smurfing, &structuring);
        report.published = self.publisher.publish(layering, smurfing, structuring).await;

        self.state = GovernorState::Banning;
        for account in implicated {
            if self
                .config
                .loop_
                .system_accounts
                .iter()
                .any(|s| s == &account)
            {
                debug!(account = %account, "system account exempt from banning");
                continue;
            }
            if self.registry.insert(&account) {
                self.ban_handler.ban(&account);
                info!(account = %account, "account banned");
                report.newly_banned.push(account);
            }
        }
        report.newly_banned.sort();

        if report.analyzed {
            info!(
                fetched = report.fetched,
                layering = report.layering,
                smurfing = report.smurfing,
                structuring = report.structuring,
                banned = report.newly_banned.len(),
                "cycle complete"
            );
        }
        self.state = GovernorState::Idle;
        report
    }

    /// Run cycles until `shutdown` turns true. Checked only between cycles;
    /// a cycle in flight always completes.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) {
        info!(cursor = self.cursor, "governor started");
        while !*shutdown.borrow() {
            self.run_cycle().await;
        }
        info!(
            cursor = self.cursor,
            banned = self.registry.len(),
            "governor stopped"
        );
    }

    /// Rebuild the windowed ledger from the rolling buffer and strip
    /// transactions touching banned accounts. None when too few usable
    /// entries remain.
    fn build_window(&self) -> Option<Vec<Transaction>> {
        let mut ledger = WindowedLedger::new(&self.config.window);
        let records: Vec<LedgerRecord> = self.buffer.iter().cloned().collect();
        ledger.ingest(&records);

        let window: Vec<Transaction> = ledger
            .current_window()
            .into_iter()
            .filter(|tx| {
                !self.registry.contains(&tx.sender) && !self.registry.contains(&tx.receiver)
            })
            .collect();
        if window.len() < self.config.window.min_window_size {
            return None;
        }
        Some(window)
    }

    /// Run one detector, converting failure into an empty result. One
    /// detector blowing up must not take down the loop or its peers.
    fn guard<T>(name: &str, detect: impl FnOnce() -> Result<Vec<T>>) -> Vec<T> {
        match detect() {
            Ok(cases) => cases,
            Err(e) => {
                warn!(detector = name, error = %e, "detector failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Union of accounts across all cases, sorted and deduplicated.
    fn implicated(
        layering: &[LayeringCase],
        smurfing: &[SmurfingCase],
        structuring: &[TriangleCase],
    ) -> Vec<String> {
        let mut out: Vec<String> = layering
            .iter()
            .flat_map(|c| c.accounts.iter().cloned())
            .chain(smurfing.iter().flat_map(|c| {
                c.accounts().into_iter().map(str::to_owned).collect::<Vec<_>>()
            }))
            .chain(
                structuring
                    .iter()
                    .flat_map(|c| c.accounts.iter().cloned()),
            )
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
