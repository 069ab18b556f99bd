//! Error types for platform detection.
//!
//! Resource probes never return errors: a failed probe is simply `false`.
//! The errors here cover the few operations that can genuinely fail, such as
//! running on an unsupported host or being unable to identify the OS release.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sysprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of sysprobe errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Host platform is not supported.
    Platform,
    /// OS release information could not be determined.
    Detection,
    /// Filesystem access failed.
    Io,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Platform => "Unsupported platform",
            Self::Detection => "OS detection failed",
            Self::Io => "Filesystem error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Platform => "Only Linux, macOS and Windows hosts are supported",
            Self::Detection => "Check that /etc/os-release or /etc/lsb-release is readable",
            Self::Io => "Check file permissions and try again",
        }
    }
}

/// Errors that can occur while inspecting the host.
#[derive(Debug, Error)]
pub enum Error {
    /// The current OS has no platform implementation.
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform {
        /// Operating system reported by the standard library.
        os: String,
    },

    /// OS release files were present but unusable.
    #[error("could not detect OS release: {0}")]
    OsDetection(String),

    /// IO error with path context.
    #[error("IO error at {path}: {source}")]
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
            Error::UnsupportedPlatform { .. } => ErrorCategory::Platform,
            Error::OsDetection(_) => ErrorCategory::Detection,
            Error::Io { .. } => ErrorCategory::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::UnsupportedPlatform {
            os: "plan9".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Platform);
        assert_eq!(err.to_string(), "unsupported platform: plan9");

        let err = Error::io("/etc/os-release", io::Error::other("boom"));
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.to_string().contains("/etc/os-release"));
    }

    #[test]
    fn test_category_advice_not_empty() {
        for cat in [
            ErrorCategory::Platform,
            ErrorCategory::Detection,
            ErrorCategory::Io,
        ] {
            assert!(!cat.description().is_empty());
            assert!(!cat.advice().is_empty());
        }
    }
}
