//! Error types for template resolution.

use crate::parser::Kind;
use thiserror::Error;

/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of template errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The template text is malformed.
    Syntax,
    /// The template is well-formed but the data cannot satisfy it.
    Resolution,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Syntax => "Malformed template",
            Self::Resolution => "Template refers to missing data",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Syntax => "Check the provider action's template for unbalanced {{ }} or bad calls",
            Self::Resolution => "Add the missing entity or field to the saidata, or pick another provider",
        }
    }
}

/// Errors raised while parsing or resolving a template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The template text could not be tokenized.
    #[error("template parse error at offset {offset}: {message}")]
    Parse {
        /// Byte offset of the offending block.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// Neither the base nor the provider override has an entity at this index.
    #[error("{kind} index {index} not found")]
    IndexNotFound {
        /// Entity kind.
        kind: Kind,
        /// Requested index.
        index: usize,
    },

    /// The entity exists but the field path does not resolve.
    #[error("field '{path}' not found on {kind} {index}")]
    FieldNotFound {
        /// Entity kind.
        kind: Kind,
        /// Entity index.
        index: usize,
        /// Dot-separated field path.
        path: String,
    },

    /// The field path ends at a structure or map.
    #[error("field '{path}' on {kind} {index} is not a scalar value")]
    NotScalar {
        /// Entity kind.
        kind: Kind,
        /// Entity index.
        index: usize,
        /// Dot-separated field path.
        path: String,
    },
}

impl Error {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Parse { .. } => ErrorCategory::Syntax,
            Error::IndexNotFound { .. } | Error::FieldNotFound { .. } | Error::NotScalar { .. } => {
                ErrorCategory::Resolution
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::IndexNotFound {
            kind: Kind::Source,
            index: 0,
        };
        assert_eq!(err.to_string(), "source index 0 not found");
        assert_eq!(err.category(), ErrorCategory::Resolution);

        let err = Error::FieldNotFound {
            kind: Kind::Binary,
            index: 1,
            path: "archive.format".to_string(),
        };
        assert!(err.to_string().starts_with("field 'archive.format' not found"));

        assert_eq!(Error::parse(3, "x").category(), ErrorCategory::Syntax);
    }
}
