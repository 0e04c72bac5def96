//! Logging setup on top of `tracing-subscriber`.
//!
//! The container emits `tracing` events under the `wiring_container`
//! target. Applications that do not install their own subscriber can
//! use this module:
//!
//! ```rust,ignore
//! use wiring_support::logging;
//!
//! logging::init();
//!
//! logging::builder()
//!     .debug()
//!     .container_only()
//!     .compact()
//!     .init();
//! ```
//!
//! `RUST_LOG`, when set, takes precedence over the configured level.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Target used by every event the container emits.
pub const CONTAINER_TARGET: &str = "wiring_container";

/// Output format of the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human oriented.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
}

/// Builder for the global subscriber.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_thread_ids: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            target: None,
            with_thread_ids: false,
        }
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Only show events from `target`.
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show container events.
    pub fn container_only(self) -> Self {
        self.with_target_filter(CONTAINER_TARGET)
    }

    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// Directive string handed to [`EnvFilter`] when `RUST_LOG` is unset.
    pub fn directive(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        match self.target {
            Some(target) => format!("{target}={level}"),
            None => level,
        }
    }

    /// Installs the subscriber globally.
    ///
    /// Returns `false` if a global subscriber was already installed.
    pub fn init(self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directive()));

        let result = match self.format {
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(self.with_thread_ids)
                        .with_target(true),
                )
                .try_init(),
            LogFormat::Compact => tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_thread_ids(self.with_thread_ids)
                        .with_target(true),
                )
                .try_init(),
        };
        result.is_ok()
    }
}

/// Creates a new [`LoggingBuilder`].
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// Installs a pretty subscriber at `INFO`.
pub fn init() -> bool {
    builder().init()
}

/// Installs a compact subscriber showing container events at `DEBUG`.
pub fn init_container_debug() -> bool {
    builder().debug().container_only().compact().init()
}
