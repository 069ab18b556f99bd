//! Error types for provider operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A provider document is malformed.
    Parse,
    /// A provider or action is unknown.
    NotFound,
    /// Every degradation strategy was exhausted.
    Exhausted,
    /// Filesystem access failed.
    Io,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Parse => "Malformed provider document",
            Self::NotFound => "Unknown provider",
            Self::Exhausted => "No provider can handle the request",
            Self::Io => "Filesystem error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Parse => "Fix the YAML syntax in the reported provider file",
            Self::NotFound => "Run 'sai providers' to list known providers",
            Self::Exhausted => {
                "Install a supported package manager or add fallback providers to the policy"
            }
            Self::Io => "Check permissions on the provider directory",
        }
    }
}

/// Errors that can occur while loading providers or degrading.
#[derive(Debug, Error)]
pub enum Error {
    /// A provider document could not be parsed.
    #[error("failed to parse provider {}: {source}", path.display())]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The named provider is not in the catalog.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// No strategy produced a usable outcome.
    #[error(
        "all fallback providers failed for {action} {software} (tried: {}; strategies: {})",
        tried.join(", "),
        attempted.join(", ")
    )]
    AllStrategiesFailed {
        /// Requested action.
        action: String,
        /// Software name.
        software: String,
        /// Providers already tried by the caller.
        tried: Vec<String>,
        /// Strategies attempted, in order.
        attempted: Vec<String>,
    },

    /// IO error with path context.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Parse { .. } => ErrorCategory::Parse,
            Error::ProviderNotFound(_) => ErrorCategory::NotFound,
            Error::AllStrategiesFailed { .. } => ErrorCategory::Exhausted,
            Error::Io { .. } => ErrorCategory::Io,
        }
    }
}
