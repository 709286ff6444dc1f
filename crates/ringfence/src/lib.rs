//! # Ringfence
//!
//! Streaming anti-money-laundering engine: a windowed view over a
//! transaction feed, topological and matrix-based pattern detectors, alert
//! publishing and an enforcement loop that bans implicated accounts.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ringfence::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let feed = Arc::new(MemoryLedger::new());
//! let alerts = Arc::new(MemoryAlertLog::new());
//! let config = GovernorConfig::default()
//!     .with_system_accounts(vec!["treasury-in".into(), "treasury-out".into()]);
//!
//! let mut governor = Governor::new(
//!     config,
//!     feed.clone() as Arc<dyn LedgerFeed>,
//!     alerts.clone() as Arc<dyn AlertSink>,
//!     Arc::new(|account: &str| println!("banned {account}")),
//! )?;
//! let report = governor.run_cycle().await;
//! println!("published {} alerts", report.published);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use ringfence_core;
pub use ringfence_detect;
pub use ringfence_engine;

/// Prelude re-exporting the whole public surface.
pub mod prelude {
    pub use ringfence_core::prelude::*;
    pub use ringfence_detect::prelude::*;
    pub use ringfence_engine::prelude::*;
}
