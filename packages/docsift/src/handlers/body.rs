//! Handler that collects the textual body of a document.

use std::fmt;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::HandlerError;
use crate::sax::{payload, Attributes, ContentHandler, HandlerResult};

/// Elements that start a new line in the extracted text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "title",
    "tr",
    "ul",
];

/// Table cells, separated by a tab.
const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Elements whose character data is not part of the body.
const IGNORED_SUBTREES: &[&str] = &["head", "script", "style"];

/// Accumulates the body text of a document into a bounded buffer.
///
/// Character data inside `head`, `script` and `style` is ignored. Block
/// level elements are separated by newlines. When the configured byte limit
/// would be exceeded, the handler keeps what fits and fails with
/// [`HandlerError::CapacityExceeded`].
#[derive(Debug)]
pub struct BodyTextHandler {
    text: String,
    limit: Option<usize>,
    ignored_depth: usize,
}

impl BodyTextHandler {
    /// Handler with the default limit of [`DEFAULT_MAX_BODY_BYTES`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_limit(Some(DEFAULT_MAX_BODY_BYTES))
    }

    /// Handler that fails once more than `limit` bytes of text are produced.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self::from_limit(Some(limit))
    }

    /// Handler without an output limit.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::from_limit(None)
    }

    #[must_use]
    pub fn from_limit(limit: Option<usize>) -> Self {
        Self {
            text: String::new(),
            limit,
            ignored_depth: 0,
        }
    }

    /// The configured byte limit, if any.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Text collected so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Clear collected text so the handler can serve another parse.
    pub fn reset(&mut self) {
        self.text.clear();
        self.ignored_depth = 0;
    }

    fn append(&mut self, chunk: &str) -> HandlerResult {
        let Some(limit) = self.limit else {
            self.text.push_str(chunk);
            return Ok(());
        };

        let room = limit.saturating_sub(self.text.len());
        if chunk.len() <= room {
            self.text.push_str(chunk);
            return Ok(());
        }

        let mut cut = room;
        while !chunk.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&chunk[..cut]);
        tracing::warn!(limit, "Body text limit reached, aborting parse");
        Err(HandlerError::CapacityExceeded { limit })
    }

    fn separate(&mut self, separator: &str) -> HandlerResult {
        if self.text.is_empty() || self.text.ends_with('\n') || self.text.ends_with(separator) {
            return Ok(());
        }
        self.append(separator)
    }
}

impl Default for BodyTextHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BodyTextHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl ContentHandler for BodyTextHandler {
    fn start_element(
        &mut self,
        _namespace: &str,
        local_name: &str,
        _qname: &str,
        _attributes: &Attributes,
    ) -> HandlerResult {
        if self.ignored_depth > 0 || IGNORED_SUBTREES.contains(&local_name) {
            self.ignored_depth += 1;
            return Ok(());
        }
        if BLOCK_ELEMENTS.contains(&local_name) {
            self.separate("\n")?;
        } else if CELL_ELEMENTS.contains(&local_name) {
            self.separate("\t")?;
        }
        Ok(())
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        if self.ignored_depth > 0 {
            return Ok(());
        }
        self.append(payload(buffer, offset, length))
    }

    fn end_element(&mut self, _namespace: &str, local_name: &str, _qname: &str) -> HandlerResult {
        if self.ignored_depth > 0 {
            self.ignored_depth -= 1;
            return Ok(());
        }
        if BLOCK_ELEMENTS.contains(&local_name) {
            self.separate("\n")?;
        }
        Ok(())
    }
}
