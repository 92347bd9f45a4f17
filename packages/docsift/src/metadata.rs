//! Metadata record populated by parsers alongside the event stream.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Document title.
pub const TITLE: &str = "title";
/// Document author.
pub const AUTHOR: &str = "author";
/// Detected media type of the input.
pub const CONTENT_TYPE: &str = "content-type";
/// Number of input bytes consumed.
pub const CONTENT_LENGTH: &str = "content-length";
/// Character encoding used to decode textual input.
pub const CONTENT_ENCODING: &str = "content-encoding";
/// Original file name of the input, used as a detection hint.
pub const RESOURCE_NAME: &str = "resourceName";

/// Name to value mapping describing a document.
///
/// Every name maps to an ordered list of values. Names enumerate in sorted
/// order, so iteration is stable for a given record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values of `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), vec![value.into()]);
    }

    /// Append a value to `name`, keeping earlier values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of `name`, in insertion order.
    #[must_use]
    pub fn get_values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `name` has at least one value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove `name` and return its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.fields.remove(name)
    }

    /// Field names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Renders one `name=value` line per field; multi-valued fields are joined with `, `.
impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, values) in self.iter() {
            writeln!(f, "{name}={}", values.join(", "))?;
        }
        Ok(())
    }
}
