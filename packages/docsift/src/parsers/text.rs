//! Plain text parser.

use crate::detect::MediaType;
use crate::error::Result;
use crate::metadata::{Metadata, CONTENT_ENCODING, CONTENT_TYPE};
use crate::sax::{Attributes, ContentHandler, EventEmitter};

use super::{decode_utf8, ParseContext, Parser};

/// Renders plain text as an XHTML document with one paragraph per
/// blank-line separated block.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextParser;

impl TextParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Split text into paragraphs on blank lines, trimming each paragraph.
fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                result.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        result.push(current.join("\n"));
    }

    result
}

impl Parser for TextParser {
    fn supported_types(&self) -> &'static [MediaType] {
        &[MediaType::PlainText]
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

        metadata.set(CONTENT_TYPE, MediaType::PlainText.as_str());
        metadata.set(CONTENT_ENCODING, "UTF-8");

        let none = Attributes::new();
        let mut emitter = EventEmitter::new(handler);
        emitter.start_document()?;
        emitter.start_xhtml("html", &none)?;
        emitter.start_xhtml("head", &none)?;
        emitter.end_element()?;
        emitter.start_xhtml("body", &none)?;
        for paragraph in paragraphs(text) {
            emitter.xhtml_element("p", &none, &paragraph)?;
        }
        emitter.finish()?;

        Ok(())
    }
}
