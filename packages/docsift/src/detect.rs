//! Media type detection from a content-type hint, magic bytes and file names.
//!
//! Detection runs in a fixed order and the first match wins:
//!
//! 1. explicit content-type hint from the parse context
//! 2. magic bytes: PDF, then HTML, then XML
//!    - HTML when the first tag is a doctype or a document, head-level or
//!      block-level HTML element (`html`, `body`, `p`, `div`, `br`, `table`, ...)
//!    - XML for any other leading tag or an XML declaration
//! 3. resource name extension from the metadata
//! 4. text heuristic (valid UTF-8 without control bytes)
//!
//! When nothing matches, detection fails with `UnknownFormat`.
//!
//! Inline HTML tags such as `a`, `b` or `span` are also valid XML element
//! names, so a fragment opening with one is sniffed as XML. When such a
//! fragment is not well-formed XML, [`starts_with_html_element`] lets the
//! caller reparse it as HTML.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::DETECTION_PREFIX_BYTES;
use crate::error::{ExtractError, Result};
use crate::metadata::{Metadata, RESOURCE_NAME};

/// Media types with a registered parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaType {
    Pdf,
    Html,
    Xml,
    PlainText,
}

impl MediaType {
    /// Canonical MIME string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Html => "text/html",
            Self::Xml => "application/xml",
            Self::PlainText => "text/plain",
        }
    }

    /// Resolve a MIME string, ignoring parameters and case.
    ///
    /// # Examples
    /// ```
    /// use docsift::detect::MediaType;
    ///
    /// assert_eq!(MediaType::from_mime("text/html; charset=UTF-8"), Some(MediaType::Html));
    /// assert_eq!(MediaType::from_mime("image/png"), None);
    /// ```
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => Some(Self::Pdf),
            "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "application/xml" | "text/xml" => Some(Self::Xml),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Resolve a file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "html" | "htm" | "xhtml" => Some(Self::Html),
            "xml" => Some(Self::Xml),
            "txt" | "text" => Some(Self::PlainText),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PDF header.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Leading HTML markers, optionally after a BOM, an XML declaration,
/// comments and whitespace.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HTML_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\x{FEFF}?\s*(<\?xml[^>]*>\s*)?(<!--.*?-->\s*)*(<!doctype\s+html|<(html|head|body|title|script|style|meta|p|div|br|hr|h[1-6]|table|ul|ol|dl|pre|blockquote|form|img|iframe|section|article|header|footer|nav|main|aside)([\s/>]|$))",
    )
    .expect("valid regex")
});

/// Name of the first element tag.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEADING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\x{FEFF}?\s*(<\?xml[^>]*>\s*)?(<!--.*?-->\s*)*<([A-Za-z][A-Za-z0-9]*)")
        .expect("valid regex")
});

/// HTML element names, used to tell an HTML fragment from XML.
const HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "b", "bdi", "bdo", "blockquote", "body",
    "br", "button", "caption", "center", "cite", "code", "dd", "del", "details", "dfn", "div",
    "dl", "dt", "em", "fieldset", "figure", "font", "footer", "form", "frameset", "h1", "h2",
    "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "li", "main", "mark", "meta", "nav", "ol", "p", "pre", "q", "s", "samp",
    "script", "section", "select", "small", "span", "strong", "style", "sub", "sup", "table",
    "tbody", "td", "textarea", "tfoot", "th", "thead", "title", "tr", "tt", "u", "ul", "var",
];

/// XML declaration or a leading element tag.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static XML_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\x{FEFF}?\s*(<\?xml|(<!--.*?-->\s*)*<[A-Za-z_:])").expect("valid regex")
});

/// Selects a media type for an input.
#[derive(Debug, Clone, Default)]
pub struct Detector;

impl Detector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Detect the media type of `bytes`.
    ///
    /// # Errors
    /// - `UnsupportedType` when `hint` names a type without a parser
    /// - `UnknownFormat` when no detector matches
    pub fn detect(&self, bytes: &[u8], hint: Option<&str>, metadata: &Metadata) -> Result<MediaType> {
        if let Some(hint) = hint {
            let media_type = MediaType::from_mime(hint)
                .ok_or_else(|| ExtractError::UnsupportedType(hint.to_string()))?;
            tracing::debug!(media_type = %media_type, "Detected from content type hint");
            return Ok(media_type);
        }

        let prefix = &bytes[..bytes.len().min(DETECTION_PREFIX_BYTES)];

        if let Some(media_type) = detect_magic(prefix) {
            tracing::debug!(media_type = %media_type, "Detected from magic bytes");
            return Ok(media_type);
        }

        if let Some(media_type) = metadata.get(RESOURCE_NAME).and_then(detect_resource_name) {
            tracing::debug!(media_type = %media_type, "Detected from resource name");
            return Ok(media_type);
        }

        if looks_like_text(prefix) {
            tracing::debug!("Detected plain text");
            return Ok(MediaType::PlainText);
        }

        Err(ExtractError::UnknownFormat { hint: None })
    }
}

fn detect_magic(prefix: &[u8]) -> Option<MediaType> {
    if prefix.starts_with(PDF_MAGIC) {
        return Some(MediaType::Pdf);
    }

    let head = String::from_utf8_lossy(prefix);
    if HTML_PATTERN.is_match(&head) {
        Some(MediaType::Html)
    } else if XML_PATTERN.is_match(&head) {
        Some(MediaType::Xml)
    } else {
        None
    }
}

/// Whether the first tag of `bytes` names an HTML element.
///
/// # Examples
/// ```
/// use docsift::detect::starts_with_html_element;
///
/// assert!(starts_with_html_element(b"<a href=\"/\">&nbsp;</a>"));
/// assert!(!starts_with_html_element(b"<catalog/>"));
/// ```
#[must_use]
pub fn starts_with_html_element(bytes: &[u8]) -> bool {
    let prefix = &bytes[..bytes.len().min(DETECTION_PREFIX_BYTES)];
    LEADING_TAG
        .captures(&String::from_utf8_lossy(prefix))
        .and_then(|captures| captures.get(3))
        .is_some_and(|tag| {
            HTML_ELEMENTS
                .iter()
                .any(|name| tag.as_str().eq_ignore_ascii_case(name))
        })
}

fn detect_resource_name(name: &str) -> Option<MediaType> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaType::from_extension)
}

/// Valid UTF-8 (a character cut off at the end of the prefix is allowed)
/// without control bytes other than tab, line feed, form feed and carriage return.
fn looks_like_text(prefix: &[u8]) -> bool {
    let valid = match std::str::from_utf8(prefix) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    };
    valid
        && !prefix
            .iter()
            .any(|&b| (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c)) || b == 0x7f)
}
