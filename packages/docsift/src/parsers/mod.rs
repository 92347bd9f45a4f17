//! Format parsers that turn raw bytes into document events.
//!
//! Each parser handles one family of media types:
//! - `HtmlParser`: HTML and XHTML
//! - `XmlParser`: generic XML with real namespaces
//! - `PdfParser`: PDF text and document information
//! - `TextParser`: plain text
//!
//! `AutoDetectParser` picks one of them for each input.

mod auto;
mod context;
mod html;
mod pdf;
mod text;
mod xml;

pub use auto::*;
pub use context::*;
pub use html::*;
pub use pdf::*;
pub use text::*;
pub use xml::*;

use crate::detect::MediaType;
use crate::error::Result;
use crate::metadata::Metadata;
use crate::sax::ContentHandler;

/// A parser for one or more media types.
///
/// Parsers are stateless and shared across threads. All per-call state
/// lives in the handler, the metadata record and the context.
pub trait Parser: Send + Sync {
    /// Media types this parser accepts.
    fn supported_types(&self) -> &'static [MediaType];

    /// Parse `bytes`, recording metadata and delivering events to `handler`.
    ///
    /// # Arguments
    /// * `bytes` - Complete input document
    /// * `handler` - Receiver of the event stream
    /// * `metadata` - Record filled with document properties
    /// * `context` - Per-call options
    ///
    /// # Errors
    /// Returns a format error for malformed input, or `Handler` when the
    /// handler aborts.
    fn parse(
        &self,
        bytes: &[u8],
        handler: &mut dyn ContentHandler,
        metadata: &mut Metadata,
        context: &ParseContext,
    ) -> Result<()>;
}

/// Decode bytes as UTF-8, replacing invalid sequences.
///
/// Lossy decoding is logged, since it changes the text handlers see.
pub(crate) fn decode_utf8(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if let std::borrow::Cow::Owned(_) = text {
        tracing::warn!(bytes = bytes.len(), "Input is not valid UTF-8, decoding lossily");
    }
    text
}
