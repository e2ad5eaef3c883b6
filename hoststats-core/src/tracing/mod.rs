//! Tracing integration for structured logging
//!
//! The library itself only emits through the `tracing` facade; binaries
//! call [`init_tracing`] once at startup to install a subscriber. The
//! `HOSTSTATS_LOG` environment variable overrides the requested level with
//! a full `EnvFilter` directive string.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for a filter directive override
pub const LOG_ENV_VAR: &str = "HOSTSTATS_LOG";

/// Global flag indicating whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Tracing already initialized
    #[error("tracing has already been initialized")]
    AlreadyInitialized,
    /// Failed to install the subscriber
    #[error("failed to initialize tracing: {0}")]
    InitializationFailed(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Log level requested by the hosting binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Errors, warnings, and info (default)
    #[default]
    Info,
    /// All above plus debug messages
    Debug,
    /// Everything including trace
    Trace,
}

impl TracingLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installs the global tracing subscriber, writing to stderr
///
/// `level` is the default filter; a `HOSTSTATS_LOG` directive takes
/// precedence when set. Calling this twice returns
/// [`TracingError::AlreadyInitialized`].
pub fn init_tracing(level: TracingLevel) -> TracingResult<()> {
    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(TracingError::AlreadyInitialized);
    }

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))
}
