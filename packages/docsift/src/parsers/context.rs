//! Per-call parse options.

use std::fmt;

use crate::config::{ExtractConfig, DEFAULT_MAX_INPUT_BYTES};

/// Options passed through one parse.
///
/// Contexts are cheap to build and owned by the caller. Each concurrent
/// parse should use its own context, metadata and handler.
#[derive(Clone, PartialEq, Eq)]
pub struct ParseContext {
    /// Content type that overrides magic-byte detection.
    pub content_type_hint: Option<String>,

    /// Inputs larger than this are rejected before detection.
    pub max_input_bytes: u64,
}

impl ParseContext {
    /// Create a context with default limits and no hint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content_type_hint: None,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    /// Set the content type hint.
    #[must_use]
    pub fn with_content_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.content_type_hint = Some(hint.into());
        self
    }

    /// Set the input size limit.
    #[must_use]
    pub fn with_max_input_bytes(mut self, limit: u64) -> Self {
        self.max_input_bytes = limit;
        self
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&ExtractConfig> for ParseContext {
    fn from(config: &ExtractConfig) -> Self {
        Self {
            content_type_hint: config.content_type_hint.clone(),
            max_input_bytes: config.max_input_bytes,
        }
    }
}

impl fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("content_type_hint", &self.content_type_hint)
            .field("max_input_bytes", &self.max_input_bytes)
            .finish()
    }
}
