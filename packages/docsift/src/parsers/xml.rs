//! Generic XML parser built on roxmltree.

use roxmltree::{Document, Node, ParsingOptions};

use crate::detect::MediaType;
use crate::error::Result;
use crate::metadata::{Metadata, CONTENT_TYPE};
use crate::sax::{Attributes, ContentHandler, EventEmitter, HandlerResult};

use super::{decode_utf8, ParseContext, Parser};

/// Emits the element tree of an XML document as-is, with resolved
/// namespaces and prefixed qualified names.
///
/// Comments and processing instructions are dropped. Malformed documents
/// fail before any event is delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl XmlParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Qualified name for a namespaced name in the scope of `node`.
fn qualified_name(node: Node<'_, '_>, namespace: Option<&str>, local_name: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local_name}"),
        _ => local_name.to_string(),
    }
}

fn element_attributes(node: Node<'_, '_>) -> Attributes {
    node.attributes()
        .map(|attr| {
            (
                qualified_name(node, attr.namespace(), attr.name()),
                attr.value(),
            )
        })
        .collect()
}

fn start_element(node: Node<'_, '_>, emitter: &mut EventEmitter<'_>) -> HandlerResult {
    let name = node.tag_name();
    let qname = qualified_name(node, name.namespace(), name.name());
    emitter.start_element(
        name.namespace().unwrap_or_default(),
        name.name(),
        &qname,
        &element_attributes(node),
    )
}

/// Walk the element tree in document order with an explicit stack of
/// child iterators.
fn emit_tree(root: Node<'_, '_>, emitter: &mut EventEmitter<'_>) -> HandlerResult {
    start_element(root, emitter)?;
    let mut stack = vec![root.children()];

    while let Some(children) = stack.last_mut() {
        match children.next() {
            Some(node) if node.is_element() => {
                start_element(node, emitter)?;
                stack.push(node.children());
            }
            Some(node) if node.is_text() => {
                emitter.characters(node.text().unwrap_or_default())?;
            }
            Some(_) => {}
            None => {
                stack.pop();
                emitter.end_element()?;
            }
        }
    }

    Ok(())
}

impl Parser for XmlParser {
    fn supported_types(&self) -> &'static [MediaType] {
        &[MediaType::Xml]
    }

    fn parse(
        &self,
        bytes: &[u8],
        handler: &mut dyn ContentHandler,
        metadata: &mut Metadata,
        _context: &ParseContext,
    ) -> Result<()> {
        let text = decode_utf8(bytes);
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);

        metadata.set(CONTENT_TYPE, MediaType::Xml.as_str());

        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(text, options)?;

        let mut emitter = EventEmitter::new(handler);
        emitter.start_document()?;
        emit_tree(doc.root_element(), &mut emitter)?;
        emitter.finish()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::handlers::{Event, EventRecorder};
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> Result<(EventRecorder, Metadata)> {
        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        XmlParser::new().parse(
            xml.as_bytes(),
            &mut recorder,
            &mut metadata,
            &ParseContext::new(),
        )?;
        Ok((recorder, metadata))
    }

    #[test]
    fn test_plain_elements() {
        let (recorder, metadata) = parse("<a><b/><c>text</c><!-- note --><d/></a>").unwrap();

        assert_eq!(metadata.get(CONTENT_TYPE), Some("application/xml"));
        assert_eq!(recorder.start_qnames(), vec!["a", "b", "c", "d"]);
        assert_eq!(recorder.text(), "text");
        assert!(recorder.is_balanced());
        assert_eq!(recorder.events().first(), Some(&Event::StartDocument));
        assert_eq!(recorder.events().last(), Some(&Event::EndDocument));
    }

    #[test]
    fn test_namespaces_and_prefixes() {
        let xml = r#"<root xmlns="urn:default" xmlns:dc="http://purl.org/dc/elements/1.1/">
            <dc:title xml:lang="en">Report</dc:title>
        </root>"#;
        let (recorder, _) = parse(xml).unwrap();

        let title = recorder
            .events()
            .iter()
            .find_map(|event| match event {
                Event::StartElement {
                    namespace,
                    local_name,
                    qname,
                    attributes,
                } if local_name == "title" => Some((namespace, qname, attributes)),
                _ => None,
            })
            .unwrap();

        assert_eq!(title.0, "http://purl.org/dc/elements/1.1/");
        assert_eq!(title.1, "dc:title");
        assert_eq!(title.2.get("xml:lang"), Some("en"));
        assert_eq!(recorder.start_qnames()[0], "root");
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 60_000;
        let xml = format!("{}x{}", "<n>".repeat(depth), "</n>".repeat(depth));
        let (recorder, _) = parse(&xml).unwrap();

        assert_eq!(recorder.start_qnames().len(), depth);
        assert_eq!(recorder.text(), "x");
        assert!(recorder.is_balanced());
    }

    #[test]
    fn test_malformed_xml_is_format_error() {
        let err = parse("<a><b></a>").unwrap_err();
        assert!(matches!(err, ExtractError::Xml(_)));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_handler_abort_propagates() {
        let mut recorder = EventRecorder::abort_after(2);
        let mut metadata = Metadata::new();
        let err = XmlParser::new()
            .parse(b"<a><b/><c/></a>", &mut recorder, &mut metadata, &ParseContext::new())
            .unwrap_err();

        assert!(matches!(err, ExtractError::Handler(_)));
        assert_eq!(recorder.events().len(), 2);
    }
}
