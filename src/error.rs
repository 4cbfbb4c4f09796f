//! Error types for the codec.

use thiserror::Error;

/// The main error type for codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Cell text does not match the lexical form of its declared type.
    #[error("Cannot convert '{text}' to {kind}{}: {reason}", child_suffix(.child))]
    Conversion {
        kind: String,
        child: Option<String>,
        text: String,
        reason: String,
    },

    /// A cell failed to decode; carries the column it belongs to.
    #[error("Column {index} ('{name}'): {source}")]
    Column {
        index: usize,
        name: String,
        #[source]
        source: Box<CodecError>,
    },

    /// Row has a different number of cells than the schema has columns.
    #[error("Expected {expected} cells, got {got}")]
    ColumnCount { expected: usize, got: usize },

    /// The encoder does not know how to write this runtime type.
    #[error("Type not supported for literal encoding: {0}")]
    UnsupportedEncodingType(String),

    /// A recognized value that cannot be written as a safe literal.
    #[error("Cannot encode {kind} literal: {reason}")]
    MalformedLiteral { kind: &'static str, reason: String },

    /// Nesting deeper than the configured limit.
    #[error("Nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn child_suffix(child: &Option<String>) -> String {
    match child {
        Some(c) => format!(" (element {})", c),
        None => String::new(),
    }
}

impl CodecError {
    /// Create a conversion error for a leaf value.
    pub fn conversion(
        kind: impl Into<String>,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            kind: kind.into(),
            child: None,
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Re-tag a leaf conversion error raised inside a container: the leaf
    /// kind becomes the child and the container type becomes the kind.
    /// Only the innermost container is recorded.
    pub fn within(self, container: impl Into<String>) -> Self {
        match self {
            Self::Conversion {
                kind,
                child: None,
                text,
                reason,
            } => Self::Conversion {
                kind: container.into(),
                child: Some(kind),
                text,
                reason,
            },
            other => other,
        }
    }

    /// Wrap a cell error with its column position and name.
    pub fn in_column(self, index: usize, name: impl Into<String>) -> Self {
        Self::Column {
            index,
            name: name.into(),
            source: Box::new(self),
        }
    }

    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedLiteral {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
