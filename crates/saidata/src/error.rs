//! Error types for saidata operations.
//!
//! Only unrecoverable problems surface as errors. A missing document falls
//! back to generated defaults and a broken override is skipped with a
//! warning, so callers mostly see [`Error::Parse`] and [`Error::InvalidName`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for saidata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of saidata errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Document does not exist (recoverable through defaults).
    NotFound,
    /// Document exists but is malformed.
    Parse,
    /// Software name is not usable as a path component.
    InvalidInput,
    /// Filesystem access failed.
    Io,
    /// Platform could not be inspected.
    Platform,
}

impl ErrorCategory {
    /// Whether the manager recovers from this category on its own.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Saidata not found",
            Self::Parse => "Malformed saidata",
            Self::InvalidInput => "Invalid software name",
            Self::Io => "Filesystem error",
            Self::Platform => "Platform inspection failed",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Generated defaults will be used instead",
            Self::Parse => "Fix the YAML syntax in the reported file",
            Self::InvalidInput => "Use a plain software name without path separators",
            Self::Io => "Check permissions on the saidata directory",
            Self::Platform => "Run on a supported platform (Linux, macOS, Windows)",
        }
    }
}

/// Errors that can occur while loading or generating saidata.
#[derive(Debug, Error)]
pub enum Error {
    /// No document exists for the software.
    #[error("saidata not found for {name}: {}", path.display())]
    NotFound {
        /// Software name.
        name: String,
        /// Path that was tried.
        path: PathBuf,
    },

    /// A document could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Document path.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A document could not be serialized.
    #[error("failed to serialize saidata: {source}")]
    Serialize {
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The software name cannot be used to locate a document.
    #[error("invalid software name: {0:?}")]
    InvalidName(String),

    /// IO error with path context.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Platform inspection failed.
    #[error(transparent)]
    Platform(#[from] sysprobe::Error),
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
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Parse { .. } | Error::Serialize { .. } => ErrorCategory::Parse,
            Error::InvalidName(_) => ErrorCategory::InvalidInput,
            Error::Io { .. } => ErrorCategory::Io,
            Error::Platform(_) => ErrorCategory::Platform,
        }
    }

    /// Whether this error means the document simply does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_recoverable() {
        let err = Error::NotFound {
            name: "nginx".to_string(),
            path: PathBuf::from("ng/nginx/default.yaml"),
        };
        assert!(err.is_not_found());
        assert!(err.category().is_recoverable());
        assert!(err.to_string().contains("ng/nginx/default.yaml"));
    }

    #[test]
    fn test_invalid_name_category() {
        let err = Error::InvalidName("../etc".to_string());
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
        assert!(!err.category().is_recoverable());
    }

    #[test]
    fn test_platform_error_converts() {
        let err: Error = sysprobe::Error::OsDetection("nope".to_string()).into();
        assert_eq!(err.category(), ErrorCategory::Platform);
    }
}
