//! Configuration for the detection engine and enforcement loop.
//!
//! Every threshold the detectors consult is a field here. Historical values
//! were tuned iteratively, so correctness is calibrated against controlled
//! scenarios rather than any one constant; the defaults below are the
//! shipping baseline.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Windowed ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window duration in seconds, relative to the newest entry.
    pub window_secs: i64,
    /// Minimum retained entries before analysis runs at all.
    pub min_window_size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_secs: 3600,
            min_window_size: 5,
        }
    }
}

/// Graph construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Distance regularizer: d = 1 / (amount + epsilon).
    pub epsilon: f64,
    /// Adjacency tier 1: a single transfer above this always sets the edge.
    pub high_amount: f64,
    /// Adjacency tier 2 amount floor.
    pub mid_amount: f64,
    /// Adjacency tier 2 pair-frequency floor.
    pub mid_frequency: u32,
    /// Adjacency tier 3 amount floor.
    pub low_amount: f64,
    /// Adjacency tier 3 pair-frequency floor.
    pub high_frequency: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-10,
            high_amount: 2000.0,
            mid_amount: 750.0,
            mid_frequency: 3,
            low_amount: 250.0,
            high_frequency: 8,
        }
    }
}

/// Cycle detector (layering) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeringConfig {
    /// Maximum persistence for a topological feature to qualify.
    pub persistence_bound: f64,
    /// Minimum combined ring volume, per participant.
    pub min_volume_per_member: f64,
    /// Minimum transaction count strictly between ring members.
    pub min_internal_txs: usize,
    /// Maximum coefficient of variation of internal amounts.
    pub max_amount_cv: f64,
}

impl Default for LayeringConfig {
    fn default() -> Self {
        Self {
            persistence_bound: 0.005,
            min_volume_per_member: 3000.0,
            min_internal_txs: 4,
            max_amount_cv: 0.5,
        }
    }
}

/// Fan-out detector (smurfing) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmurfingConfig {
    /// Distance below which a pair implies a very large transfer.
    pub near_distance: f64,
    /// Pair frequency a near pair must exceed to qualify.
    pub min_pair_frequency: u32,
    /// Smallest outgoing amount counted as real money for hub analysis.
    pub min_real_amount: f64,
    /// Minimum qualifying outgoing transaction count for a hub.
    pub min_tx_count: u32,
    /// Minimum distinct recipient count for a hub.
    pub min_recipients: u32,
    /// Minimum average qualifying amount for a hub.
    pub min_avg_amount: f64,
}

impl Default for SmurfingConfig {
    fn default() -> Self {
        Self {
            near_distance: 0.01,
            min_pair_frequency: 6,
            min_real_amount: 100.0,
            min_tx_count: 6,
            min_recipients: 4,
            min_avg_amount: 500.0,
        }
    }
}

/// Enforcement loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Rolling analysis buffer capacity, in records.
    pub buffer_capacity: usize,
    /// Maximum entries fetched from the feed per cycle.
    pub fetch_batch: usize,
    /// Milliseconds to wait on the feed when no entries are available.
    pub fetch_wait_ms: u64,
    /// Accounts that are never banned (laundering source/destination,
    /// kept visible for scoring).
    pub system_accounts: Vec<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 512,
            fetch_batch: 256,
            fetch_wait_ms: 500,
            system_accounts: Vec::new(),
        }
    }
}

/// Unified engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Windowed ledger settings.
    pub window: WindowConfig,
    /// Graph construction settings.
    pub graph: GraphConfig,
    /// Layering detector settings.
    pub layering: LayeringConfig,
    /// Smurfing detector settings.
    pub smurfing: SmurfingConfig,
    /// Enforcement loop settings.
    #[serde(rename = "loop")]
    pub loop_: LoopConfig,
}

impl GovernorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| EngineError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the exempt system accounts.
    #[must_use]
    pub fn with_system_accounts(mut self, accounts: Vec<String>) -> Self {
        self.loop_.system_accounts = accounts;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.window.window_secs <= 0 {
            return Err(EngineError::config("window_secs must be positive"));
        }
        if self.graph.epsilon <= 0.0 {
            return Err(EngineError::config("epsilon must be positive"));
        }
        if !(self.graph.low_amount <= self.graph.mid_amount
            && self.graph.mid_amount <= self.graph.high_amount)
        {
            return Err(EngineError::config(
                "adjacency amount tiers must be ordered low <= mid <= high",
            ));
        }
        if self.layering.persistence_bound <= 0.0 {
            return Err(EngineError::config("persistence_bound must be positive"));
        }
        if self.layering.max_amount_cv <= 0.0 {
            return Err(EngineError::config("max_amount_cv must be positive"));
        }
        if self.smurfing.near_distance <= 0.0 {
            return Err(EngineError::config("near_distance must be positive"));
        }
        if self.loop_.buffer_capacity == 0 {
            return Err(EngineError::config("buffer_capacity must be nonzero"));
        }
        if self.loop_.fetch_batch == 0 {
            return Err(EngineError::config("fetch_batch must be nonzero"));
        }
        Ok(())
    }
}
