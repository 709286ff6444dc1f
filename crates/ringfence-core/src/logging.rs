//! Logging bootstrap.
//!
//! Thin wrapper over `tracing-subscriber`: plain formatted output for
//! development, JSON structured output for log aggregation in production.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose).
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level; `RUST_LOG` overrides when set.
    pub level: LogLevel,
    /// Emit structured JSON output.
    pub structured: bool,
}

impl LogConfig {
    /// Development preset: debug level, human-readable.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            structured: false,
        }
    }

    /// Production preset: info level, JSON.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            structured: true,
        }
    }

    /// Install the global subscriber. Safe to call more than once; later
    /// calls are no-ops.
    pub fn init(&self) {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        let registry = tracing_subscriber::registry().with(filter);

        if self.structured {
            registry.with(fmt::layer().json()).try_init().ok();
        } else {
            registry.with(fmt::layer()).try_init().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LogConfig::development().level, LogLevel::Debug);
        assert!(LogConfig::production().structured);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LogConfig::development();
        config.init();
        config.init();
    }
}
