//! # Ringfence Core
//!
//! Shared foundations for the ringfence transaction-monitoring engine.
//!
//! This crate provides:
//! - Ledger record and transaction types
//! - Typed alert records with per-pattern payloads
//! - Error types and the engine `Result` alias
//! - Configuration for every tunable threshold
//! - Logging bootstrap

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        GovernorConfig, GraphConfig, LayeringConfig, LoopConfig, SmurfingConfig, WindowConfig,
    };
    pub use crate::error::{EngineError, Result};
    pub use crate::logging::LogConfig;
    pub use crate::types::{
        Alert, AlertDetails, AlertType, LayeringCase, LedgerRecord, SmurfingCase, Transaction,
        TriangleCase,
    };
}
