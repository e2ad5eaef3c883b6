//! CLI error types and exit codes.

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, serialization, or other local errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Remote failure - the Webdock API could not be reached or refused
    /// the request
    pub const REMOTE_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Webdock API error
    #[error("Webdock API error: {0}")]
    Remote(String),

    /// Output serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hoststats_core::webdock::WebdockError> for CliError {
    fn from(err: hoststats_core::webdock::WebdockError) -> Self {
        Self::Remote(err.to_string())
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, serialization, IO)
    /// - 2: Remote failure (Webdock API unreachable or request refused)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Remote(_) => exit_codes::REMOTE_FAILURE,
            Self::Config(_) | Self::Serialize(_) | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
