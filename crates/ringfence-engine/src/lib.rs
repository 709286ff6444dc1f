//! # Ringfence Engine
//!
//! The stateful half of the system: windowed ledger, feed/sink transport,
//! alert publishing and the enforcement loop.
//!
//! - [`ledger::WindowedLedger`] — validated rolling view over the feed
//! - [`transport`] — async feed and sink seams plus in-memory transports
//! - [`publisher::AlertPublisher`] — best-effort alert delivery
//! - [`governor::Governor`] — fetch, analyze, publish, ban; repeat

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod governor;
pub mod ledger;
pub mod publisher;
pub mod transport;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::governor::{BanHandler, BanRegistry, CycleReport, Governor, GovernorState};
    pub use crate::ledger::WindowedLedger;
    pub use crate::publisher::AlertPublisher;
    pub use crate::transport::{
        AlertSink, LedgerEntry, LedgerFeed, MemoryAlertLog, MemoryLedger,
    };
}
