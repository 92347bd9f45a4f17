//! Error types for docsift.
//!
//! Uses the dual-error pattern: `ExtractError` for library consumers with
//! detailed error context, and `HandlerError` for aborts raised by content
//! handlers while a parse is running.

use thiserror::Error;

/// Error raised by a content handler to abort the parse.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A bounded handler reached its configured output limit.
    #[error("Output limit of {limit} bytes exceeded")]
    CapacityExceeded { limit: usize },

    /// Writing to the handler's output sink failed.
    #[error("Failed to write handler output: {0}")]
    Sink(#[from] std::io::Error),

    /// Handler-specific abort with a reason.
    #[error("Parse aborted by handler: {0}")]
    Aborted(String),
}

/// Main error type for the docsift library.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading the input stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No detector recognised the input.
    #[error("No parser matches the input{}", .hint.as_ref().map(|h| format!(" (hint: {h})")).unwrap_or_default())]
    UnknownFormat { hint: Option<String> },

    /// A content type was requested that no registered parser supports.
    #[error("Unsupported content type: '{0}'")]
    UnsupportedType(String),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// PDF parsing failed.
    #[error("PDF parsing failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The content handler aborted the parse.
    #[error("Content handler aborted the parse: {0}")]
    Handler(#[from] HandlerError),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml_ng::Error),
}

impl ExtractError {
    /// Whether the input itself was rejected (undetected, unsupported or malformed).
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFormat { .. } | Self::UnsupportedType(_) | Self::Xml(_) | Self::Pdf(_)
        )
    }

    /// Whether a bounded handler overflowed.
    #[must_use]
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::Handler(HandlerError::CapacityExceeded { .. }))
    }
}

/// Result type alias for docsift operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
