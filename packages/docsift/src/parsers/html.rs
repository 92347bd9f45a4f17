//! HTML parser built on scraper (html5ever).

use std::sync::LazyLock;

use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};

use crate::detect::MediaType;
use crate::error::Result;
use crate::metadata::{
    Metadata, AUTHOR, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, RESOURCE_NAME, TITLE,
};
use crate::sax::{Attributes, ContentHandler, EventEmitter, HandlerResult};

use super::{decode_utf8, ParseContext, Parser};

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// `<meta>` elements carrying a name/content pair.
#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name][content]").expect("valid selector"));

/// Parses HTML with browser error recovery and emits the resulting DOM.
///
/// The tree always has `html`, `head` and `body` elements, even when the
/// input omits them. Comments are not emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Fields owned by the parser or the extraction driver; `<meta>` cannot set them.
const RESERVED_FIELDS: &[&str] = &[
    TITLE,
    CONTENT_TYPE,
    CONTENT_ENCODING,
    CONTENT_LENGTH,
    RESOURCE_NAME,
];

/// Record `title` and `<meta name content>` pairs.
fn collect_metadata(document: &Html, metadata: &mut Metadata) {
    if let Some(title) = document.select(&TITLE_SELECTOR).next() {
        let title = title.text().collect::<String>();
        let title = title.trim();
        if !title.is_empty() {
            metadata.set(TITLE, title);
        }
    }

    for meta in document.select(&META_SELECTOR) {
        let element = meta.value();
        let (Some(name), Some(content)) = (element.attr("name"), element.attr("content")) else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if RESERVED_FIELDS.iter().any(|field| name.eq_ignore_ascii_case(field)) {
            tracing::debug!(name, "Skipping meta element for a reserved field");
            continue;
        }
        metadata.add(name, content.trim());
        if name.eq_ignore_ascii_case(AUTHOR) && name != AUTHOR {
            metadata.add(AUTHOR, content.trim());
        }
    }
}

fn start_element(element: &Element, emitter: &mut EventEmitter<'_>) -> HandlerResult {
    let attributes: Attributes = element.attrs().collect();
    emitter.start_element(&element.name.ns, element.name(), element.name(), &attributes)
}

/// Walk the DOM in document order with an explicit stack of child
/// iterators.
fn emit_tree(root: ElementRef<'_>, emitter: &mut EventEmitter<'_>) -> HandlerResult {
    start_element(root.value(), emitter)?;
    let mut stack = vec![root.children()];

    while let Some(children) = stack.last_mut() {
        match children.next() {
            Some(child) => match child.value() {
                Node::Text(text) => emitter.characters(text)?,
                Node::Element(element) => {
                    start_element(element, emitter)?;
                    stack.push(child.children());
                }
                _ => {}
            },
            None => {
                stack.pop();
                emitter.end_element()?;
            }
        }
    }

    Ok(())
}

impl Parser for HtmlParser {
    fn supported_types(&self) -> &'static [MediaType] {
        &[MediaType::Html]
    }

    fn parse(
        &self,
        bytes: &[u8],
        handler: &mut dyn ContentHandler,
        metadata: &mut Metadata,
        _context: &ParseContext,
    ) -> Result<()> {
        let text = decode_utf8(bytes);
        let document = Html::parse_document(&text);

        if !document.errors.is_empty() {
            tracing::debug!(errors = document.errors.len(), "Recovered from HTML parse errors");
        }

        metadata.set(CONTENT_TYPE, MediaType::Html.as_str());
        metadata.set(CONTENT_ENCODING, "UTF-8");
        collect_metadata(&document, metadata);

        let mut emitter = EventEmitter::new(handler);
        emitter.start_document()?;
        emit_tree(document.root_element(), &mut emitter)?;
        emitter.finish()?;

        Ok(())
    }
}
