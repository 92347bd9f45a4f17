//! Configuration constants and per-call extraction options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::handlers::EchoPolicy;

/// Default body text limit in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 100_000;

/// Default number of elements echoed by the bounded echo handler.
pub const DEFAULT_MAX_ECHO_ELEMENTS: usize = 100;

/// Default maximum input size in bytes (100 MB).
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 100 * 1024 * 1024;

/// Number of leading bytes inspected by the detector.
pub const DETECTION_PREFIX_BYTES: usize = 1024;

fn default_max_body_bytes() -> Option<usize> {
    Some(DEFAULT_MAX_BODY_BYTES)
}

fn default_max_echo_elements() -> usize {
    DEFAULT_MAX_ECHO_ELEMENTS
}

fn default_max_input_bytes() -> u64 {
    DEFAULT_MAX_INPUT_BYTES
}

/// Options for one extraction call.
///
/// # Examples
/// ```
/// use docsift::config::ExtractConfig;
///
/// let config = ExtractConfig::from_yaml_str("max_body_bytes: 1024\n").unwrap();
/// assert_eq!(config.max_body_bytes, Some(1024));
/// assert_eq!(config.max_echo_elements, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Body text limit; `None` is unbounded.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: Option<usize>,

    /// Number of start elements the echo handler writes.
    #[serde(default = "default_max_echo_elements")]
    pub max_echo_elements: usize,

    /// Closing-tag policy of the echo handler.
    #[serde(default)]
    pub echo_policy: EchoPolicy,

    /// Content type that overrides magic-byte detection.
    #[serde(default)]
    pub content_type_hint: Option<String>,

    /// Inputs larger than this are rejected.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            max_echo_elements: default_max_echo_elements(),
            echo_policy: EchoPolicy::default(),
            content_type_hint: None,
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

impl ExtractConfig {
    /// Parse options from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load options from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Set the content type hint.
    #[must_use]
    pub fn with_content_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.content_type_hint = Some(hint.into());
        self
    }

    /// Set the body text limit.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.max_body_bytes, Some(DEFAULT_MAX_BODY_BYTES));
        assert_eq!(config.max_echo_elements, DEFAULT_MAX_ECHO_ELEMENTS);
        assert_eq!(config.echo_policy, EchoPolicy::Observed);
        assert!(config.content_type_hint.is_none());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ExtractConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ExtractConfig::default());
    }

    #[test]
    fn test_unbounded_body_from_yaml() {
        let yaml = "max_body_bytes: null\nmax_echo_elements: 5\necho_policy: balanced\ncontent_type_hint: text/html\n";
        let config = ExtractConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.max_body_bytes, None);
        assert_eq!(config.max_echo_elements, 5);
        assert_eq!(config.echo_policy, EchoPolicy::Balanced);
        assert_eq!(config.content_type_hint.as_deref(), Some("text/html"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ExtractConfig::from_yaml_str("max_echo_elements: many").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_input_bytes: 2048").unwrap();

        let config = ExtractConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_input_bytes, 2048);
    }

    #[test]
    fn test_builders() {
        let config = ExtractConfig::default()
            .with_content_type_hint("application/pdf")
            .with_max_body_bytes(None);
        assert_eq!(config.content_type_hint.as_deref(), Some("application/pdf"));
        assert_eq!(config.max_body_bytes, None);
    }
}
