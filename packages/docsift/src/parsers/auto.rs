//! Parser that detects the media type and delegates to a registered parser.

use std::collections::HashMap;
use std::fmt;

use crate::detect::{starts_with_html_element, Detector, MediaType};
use crate::error::{ExtractError, Result};
use crate::metadata::{Metadata, CONTENT_TYPE};
use crate::sax::ContentHandler;

use super::{HtmlParser, ParseContext, Parser, PdfParser, TextParser, XmlParser};

/// Registry mapping media types to parsers, fronted by a [`Detector`].
///
/// The parser is immutable once built and can be shared between threads;
/// every call brings its own handler, metadata and context.
pub struct AutoDetectParser {
    detector: Detector,
    parsers: HashMap<MediaType, Box<dyn Parser>>,
}

impl AutoDetectParser {
    /// Create a parser with no registered formats.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            detector: Detector::new(),
            parsers: HashMap::new(),
        }
    }

    /// Create a parser with the HTML, XML, PDF and text parsers registered.
    #[must_use]
    pub fn new() -> Self {
        let mut parser = Self::empty();
        parser.register(HtmlParser::new());
        parser.register(XmlParser::new());
        parser.register(PdfParser::new());
        parser.register(TextParser::new());
        parser
    }

    /// Register a parser for every media type it supports, replacing any
    /// parser registered for those types before.
    pub fn register(&mut self, parser: impl Parser + Clone + 'static) {
        for media_type in parser.supported_types() {
            self.parsers.insert(*media_type, Box::new(parser.clone()));
        }
    }

    /// Check if a parser is registered for a media type.
    #[must_use]
    pub fn supports(&self, media_type: MediaType) -> bool {
        self.parsers.contains_key(&media_type)
    }

    /// Return all media types with a registered parser, sorted.
    #[must_use]
    pub fn supported_media_types(&self) -> Vec<MediaType> {
        let mut types: Vec<_> = self.parsers.keys().copied().collect();
        types.sort();
        types
    }

    /// Detect the media type of `bytes` without parsing.
    pub fn detect(&self, bytes: &[u8], metadata: &Metadata, context: &ParseContext) -> Result<MediaType> {
        self.detector
            .detect(bytes, context.content_type_hint.as_deref(), metadata)
    }
}

impl Default for AutoDetectParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AutoDetectParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoDetectParser")
            .field("media_types", &self.supported_media_types())
            .finish()
    }
}

impl Parser for AutoDetectParser {
    fn supported_types(&self) -> &'static [MediaType] {
        &[
            MediaType::Pdf,
            MediaType::Html,
            MediaType::Xml,
            MediaType::PlainText,
        ]
    }

    fn parse(
        &self,
        bytes: &[u8],
        handler: &mut dyn ContentHandler,
        metadata: &mut Metadata,
        context: &ParseContext,
    ) -> Result<()> {
        let media_type = self.detect(bytes, metadata, context)?;
        let parser = self
            .parsers
            .get(&media_type)
            .ok_or_else(|| ExtractError::UnsupportedType(media_type.to_string()))?;

        metadata.set(CONTENT_TYPE, media_type.as_str());
        tracing::debug!(media_type = %media_type, bytes = bytes.len(), "Dispatching to parser");

        match parser.parse(bytes, handler, metadata, context) {
            // The XML parser rejects malformed input before emitting any event.
            Err(ExtractError::Xml(err))
                if context.content_type_hint.is_none() && starts_with_html_element(bytes) =>
            {
                let Some(html) = self.parsers.get(&MediaType::Html) else {
                    return Err(ExtractError::Xml(err));
                };
                tracing::debug!(error = %err, "Not well-formed XML, reparsing as an HTML fragment");
                metadata.set(CONTENT_TYPE, MediaType::Html.as_str());
                html.parse(bytes, handler, metadata, context)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::EventRecorder;

    #[test]
    fn test_default_registry() {
        let parser = AutoDetectParser::new();
        assert_eq!(
            parser.supported_media_types(),
            vec![
                MediaType::Pdf,
                MediaType::Html,
                MediaType::Xml,
                MediaType::PlainText
            ]
        );
        assert!(format!("{parser:?}").contains("Html"));
    }

    #[test]
    fn test_dispatch_by_magic() {
        let parser = AutoDetectParser::new();
        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        parser
            .parse(b"<doc><item/></doc>", &mut recorder, &mut metadata, &ParseContext::new())
            .unwrap();

        assert_eq!(metadata.get(CONTENT_TYPE), Some("application/xml"));
        assert_eq!(recorder.start_qnames(), vec!["doc", "item"]);
    }

    #[test]
    fn test_detected_type_without_parser() {
        let mut parser = AutoDetectParser::empty();
        parser.register(TextParser::new());
        assert!(parser.supports(MediaType::PlainText));
        assert!(!parser.supports(MediaType::Html));

        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        let err = parser
            .parse(b"<html></html>", &mut recorder, &mut metadata, &ParseContext::new())
            .unwrap_err();

        assert!(matches!(err, ExtractError::UnsupportedType(ref t) if t == "text/html"));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_hint_selects_parser() {
        let parser = AutoDetectParser::new();
        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        let context = ParseContext::new().with_content_type_hint("text/plain");
        parser
            .parse(b"<b>not markup</b>", &mut recorder, &mut metadata, &context)
            .unwrap();

        assert_eq!(metadata.get(CONTENT_TYPE), Some("text/plain"));
        assert_eq!(recorder.text(), "<b>not markup</b>");
    }

    #[test]
    fn test_malformed_inline_fragment_is_reparsed_as_html() {
        let parser = AutoDetectParser::new();
        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        parser
            .parse(
                b"<a href=\"/menu\">Menu</a>&nbsp;<b>open",
                &mut recorder,
                &mut metadata,
                &ParseContext::new(),
            )
            .unwrap();

        assert_eq!(metadata.get(CONTENT_TYPE), Some("text/html"));
        assert_eq!(recorder.start_qnames(), vec!["html", "head", "body", "a", "b"]);
        assert_eq!(recorder.text(), "Menu\u{a0}open");
        assert!(recorder.is_balanced());
    }

    #[test]
    fn test_well_formed_inline_fragment_stays_xml() {
        let parser = AutoDetectParser::new();
        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        parser
            .parse(b"<a><b/><c/><d/></a>", &mut recorder, &mut metadata, &ParseContext::new())
            .unwrap();

        assert_eq!(metadata.get(CONTENT_TYPE), Some("application/xml"));
        assert_eq!(recorder.start_qnames(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_xml_hint_disables_html_fallback() {
        let parser = AutoDetectParser::new();
        let mut recorder = EventRecorder::new();
        let mut metadata = Metadata::new();
        let context = ParseContext::new().with_content_type_hint("application/xml");
        let err = parser
            .parse(b"<span>a<br>b</span>", &mut recorder, &mut metadata, &context)
            .unwrap_err();

        assert!(matches!(err, ExtractError::Xml(_)));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AutoDetectParser>();
    }
}
