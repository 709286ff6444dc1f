//! Core data types shared across the engine.

use crate::error::{EngineError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Ledger Records and Transactions
// ============================================================================

/// Timestamp format used by the ledger feed.
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A raw record as it arrives from the ledger feed.
///
/// All fields are untrusted strings; `Transaction::parse` validates them.
/// The `kind` field is informational only and never drives detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Sending account id.
    pub sender_id: String,
    /// Receiving account id.
    pub receiver_id: String,
    /// Transfer amount, decimal string.
    pub amount: String,
    /// Feed-assigned transaction category (untrusted).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// A validated transaction, the unit the detection engine works on.
///
/// Immutable once parsed; eviction from an analysis window is a local cache
/// policy, not deletion from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sending account id.
    pub sender: String,
    /// Receiving account id.
    pub receiver: String,
    /// Transfer amount, strictly positive.
    pub amount: f64,
    /// Timestamp as Unix epoch seconds.
    pub epoch: i64,
}

impl Transaction {
    /// Validate a raw feed record.
    ///
    /// Rejects unparseable timestamps and amounts that are not strictly
    /// positive reals. Callers drop rejected records individually and
    /// continue the batch.
    pub fn parse(record: &LedgerRecord) -> Result<Self> {
        let amount: f64 = record
            .amount
            .trim()
            .parse()
            .map_err(|_| EngineError::malformed(format!("bad amount '{}'", record.amount)))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::malformed(format!(
                "non-positive amount {amount}"
            )));
        }

        let naive = NaiveDateTime::parse_from_str(&record.timestamp, FEED_TIMESTAMP_FORMAT)
            .map_err(|_| {
                EngineError::malformed(format!("bad timestamp '{}'", record.timestamp))
            })?;

        Ok(Self {
            sender: record.sender_id.clone(),
            receiver: record.receiver_id.clone(),
            amount,
            epoch: naive.and_utc().timestamp(),
        })
    }
}

// ============================================================================
// Alerts
// ============================================================================

/// Laundering pattern category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    /// Closed loop of intermediaries obscuring fund origin.
    Layering,
    /// Fan-out dispersal across many transfers or recipients.
    Smurfing,
    /// Closed three-hop relay among accounts.
    Structuring,
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layering => write!(f, "Layering"),
            Self::Smurfing => write!(f, "Smurfing"),
            Self::Structuring => write!(f, "Structuring"),
        }
    }
}

/// A laundering ring surfaced by the cycle detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeringCase {
    /// Persistence (death − birth) of the topological feature.
    pub persistence: f64,
    /// Accounts forming the ring.
    pub accounts: Vec<String>,
    /// Combined trading volume of the ring members within the window.
    pub volume: f64,
}

/// A fan-out finding; the two heuristics report independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "case")]
pub enum SmurfingCase {
    /// A pair at near-zero distance with repeated large transfers.
    NearPair {
        /// First account of the pair.
        u1: String,
        /// Second account of the pair.
        u2: String,
        /// Transaction count on the unordered pair.
        freq: u32,
        /// Pair distance (smaller means larger transfers).
        score: f64,
    },
    /// An account dispersing real money across many recipients.
    Hub {
        /// The dispersing account.
        account: String,
        /// Distinct recipients of its qualifying transfers.
        recipients: Vec<String>,
        /// Qualifying outgoing transaction count.
        tx_count: u32,
        /// Distinct recipient count.
        recipient_count: u32,
        /// Total qualifying outgoing volume.
        total_volume: f64,
    },
}

impl SmurfingCase {
    /// Accounts implicated by this case.
    #[must_use]
    pub fn accounts(&self) -> Vec<&str> {
        match self {
            Self::NearPair { u1, u2, .. } => vec![u1.as_str(), u2.as_str()],
            Self::Hub {
                account, recipients, ..
            } => {
                let mut out = vec![account.as_str()];
                out.extend(recipients.iter().map(String::as_str));
                out
            }
        }
    }
}

/// A directed three-hop relay, reported once in canonical sorted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleCase {
    /// The three accounts, in traversal order from the detected root.
    pub accounts: [String; 3],
}

/// Per-type alert payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "pattern", content = "cases")]
pub enum AlertDetails {
    /// Layering cases.
    Layering(Vec<LayeringCase>),
    /// Smurfing cases.
    Smurfing(Vec<SmurfingCase>),
    /// Structuring cases.
    Structuring(Vec<TriangleCase>),
}

impl AlertDetails {
    /// Number of cases carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Layering(c) => c.len(),
            Self::Smurfing(c) => c.len(),
            Self::Structuring(c) => c.len(),
        }
    }

    /// True when no cases are carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All accounts implicated across the carried cases.
    #[must_use]
    pub fn involved_accounts(&self) -> Vec<String> {
        let mut out: Vec<String> = match self {
            Self::Layering(cases) => cases.iter().flat_map(|c| c.accounts.clone()).collect(),
            Self::Smurfing(cases) => cases
                .iter()
                .flat_map(|c| c.accounts().into_iter().map(str::to_owned))
                .collect(),
            Self::Structuring(cases) => cases
                .iter()
                .flat_map(|c| c.accounts.iter().cloned())
                .collect(),
        };
        out.sort();
        out.dedup();
        out
    }
}

/// One alert record, produced once and consumed once by enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Pattern category.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Publication time.
    pub timestamp: DateTime<Utc>,
    /// Number of cases in `details`.
    pub count: usize,
    /// Type-specific payload.
    pub details: AlertDetails,
}

impl Alert {
    /// Package a nonempty case list into an alert record.
    #[must_use]
    pub fn new(alert_type: AlertType, details: AlertDetails) -> Self {
        Self {
            alert_type,
            timestamp: Utc::now(),
            count: details.len(),
            details,
        }
    }
}
