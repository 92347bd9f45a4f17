//! Document event model shared by parsers and content handlers.
//!
//! Parsers describe a document as a stream of structural events
//! (start element, characters, end element) delivered synchronously to a
//! [`ContentHandler`]. Format-specific parsers render their input as XHTML
//! events, so handlers can be written once for every supported format.

use std::fmt;

use crate::error::HandlerError;

/// Namespace URI of XHTML events emitted by the HTML, PDF and text parsers.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Result type for content handler callbacks.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// A single attribute of a start element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name (`prefix:local` or `local`).
    pub qname: String,
    /// Attribute value with entities resolved.
    pub value: String,
}

/// Ordered attribute set attached to a start element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// Create an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, qname: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Attribute {
            qname: qname.into(),
            value: value.into(),
        });
    }

    /// Builder form of [`Attributes::push`].
    #[must_use]
    pub fn with(mut self, qname: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(qname, value);
        self
    }

    /// Value of the first attribute with the given qualified name.
    #[must_use]
    pub fn get(&self, qname: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|attr| attr.qname == qname)
            .map(|attr| attr.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (qname, value) in iter {
            attributes.push(qname, value);
        }
        attributes
    }
}

/// Renders as ` a="1" b="2"`, ready to splice into a start tag.
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in &self.entries {
            write!(f, " {}=\"{}\"", attr.qname, attr.value)?;
        }
        Ok(())
    }
}

/// Consumer of document structural events.
///
/// Every start element is matched by exactly one end element, in LIFO
/// order, and character data only arrives between a start and its end.
/// Returning an error aborts the parse: the parser delivers no further
/// events to the handler.
///
/// The `buffer` passed to [`ContentHandler::characters`] is scratch space
/// owned by the parser and borrowed only for the duration of the call.
/// The payload is `buffer[offset..offset + length]`; copy it to keep it.
pub trait ContentHandler {
    /// Called once before any other event.
    fn start_document(&mut self) -> HandlerResult {
        Ok(())
    }

    /// Called once after the last event of a successful parse.
    fn end_document(&mut self) -> HandlerResult {
        Ok(())
    }

    /// Called on each opening tag.
    fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult;

    /// Called on each chunk of character data.
    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult;

    /// Called on each closing tag.
    fn end_element(&mut self, namespace: &str, local_name: &str, qname: &str) -> HandlerResult;
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn start_document(&mut self) -> HandlerResult {
        (**self).start_document()
    }

    fn end_document(&mut self) -> HandlerResult {
        (**self).end_document()
    }

    fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        (**self).start_element(namespace, local_name, qname, attributes)
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        (**self).characters(buffer, offset, length)
    }

    fn end_element(&mut self, namespace: &str, local_name: &str, qname: &str) -> HandlerResult {
        (**self).end_element(namespace, local_name, qname)
    }
}

impl<H: ContentHandler + ?Sized> ContentHandler for Box<H> {
    fn start_document(&mut self) -> HandlerResult {
        (**self).start_document()
    }

    fn end_document(&mut self) -> HandlerResult {
        (**self).end_document()
    }

    fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        (**self).start_element(namespace, local_name, qname, attributes)
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        (**self).characters(buffer, offset, length)
    }

    fn end_element(&mut self, namespace: &str, local_name: &str, qname: &str) -> HandlerResult {
        (**self).end_element(namespace, local_name, qname)
    }
}

/// Slice the character payload out of a `characters` callback.
///
/// Returns an empty string when the range is out of bounds or does not fall
/// on character boundaries.
#[must_use]
pub fn payload(buffer: &str, offset: usize, length: usize) -> &str {
    offset
        .checked_add(length)
        .and_then(|end| buffer.get(offset..end))
        .unwrap_or_default()
}

/// An element opened through the emitter and not yet closed.
#[derive(Debug)]
struct OpenElement {
    namespace: String,
    local_name: String,
    qname: String,
}

/// Helper used by parsers to drive a handler.
///
/// Owns the scratch buffer handed to `characters` and the stack of open
/// elements, so every element it opens is closed in LIFO order, even when
/// a parser stops early and calls [`EventEmitter::finish`].
pub struct EventEmitter<'h> {
    handler: &'h mut dyn ContentHandler,
    scratch: String,
    open: Vec<OpenElement>,
}

impl<'h> EventEmitter<'h> {
    /// Wrap a handler.
    pub fn new(handler: &'h mut dyn ContentHandler) -> Self {
        Self {
            handler,
            scratch: String::new(),
            open: Vec::new(),
        }
    }

    pub fn start_document(&mut self) -> HandlerResult {
        self.handler.start_document()
    }

    /// Open an element with explicit naming.
    pub fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        self.handler
            .start_element(namespace, local_name, qname, attributes)?;
        self.open.push(OpenElement {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
        });
        Ok(())
    }

    /// Open an XHTML element.
    pub fn start_xhtml(&mut self, name: &str, attributes: &Attributes) -> HandlerResult {
        self.start_element(XHTML_NS, name, name, attributes)
    }

    /// Deliver character data through the scratch buffer. Empty text is dropped.
    pub fn characters(&mut self, text: &str) -> HandlerResult {
        if text.is_empty() {
            return Ok(());
        }
        self.scratch.clear();
        self.scratch.push_str(text);
        self.handler.characters(&self.scratch, 0, self.scratch.len())
    }

    /// Close the innermost open element.
    pub fn end_element(&mut self) -> HandlerResult {
        match self.open.pop() {
            Some(element) => {
                self.handler
                    .end_element(&element.namespace, &element.local_name, &element.qname)
            }
            None => {
                tracing::debug!("end_element called with no open element");
                Ok(())
            }
        }
    }

    /// Emit `<name>text</name>` in the XHTML namespace.
    pub fn xhtml_element(&mut self, name: &str, attributes: &Attributes, text: &str) -> HandlerResult {
        self.start_xhtml(name, attributes)?;
        self.characters(text)?;
        self.end_element()
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Close any elements still open and end the document.
    pub fn finish(mut self) -> HandlerResult {
        while !self.open.is_empty() {
            self.end_element()?;
        }
        self.handler.end_document()
    }
}
