//! Extraction entry points.
//!
//! [`extract`] reads an input stream to the end, detects its format and
//! runs the matching parser against the caller's handler and metadata.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::Result;
use crate::metadata::{Metadata, CONTENT_LENGTH, RESOURCE_NAME};
use crate::parsers::{AutoDetectParser, ParseContext, Parser};
use crate::sax::ContentHandler;

static DEFAULT_PARSER: LazyLock<AutoDetectParser> = LazyLock::new(AutoDetectParser::new);

/// Extract metadata and document events from `input`.
///
/// The stream is read to the end but not closed. `content-length` and
/// `content-type` are recorded before the parser runs, so they are
/// available even when parsing fails.
///
/// # Arguments
/// * `input` - Stream holding one document
/// * `handler` - Receiver of the event stream
/// * `metadata` - Record filled with document properties
/// * `context` - Per-call options
///
/// # Errors
/// - `Io` when reading fails or the input exceeds `context.max_input_bytes`
/// - a format error when the input cannot be detected or parsed
/// - `Handler` when the handler aborts
///
/// # Examples
/// ```
/// use docsift::{extract, BodyTextHandler, Metadata, ParseContext};
///
/// let mut input: &[u8] = b"<html><head><title>Hi</title></head><body><p>there</p></body></html>";
/// let mut body = BodyTextHandler::new();
/// let mut metadata = Metadata::new();
/// extract(&mut input, &mut body, &mut metadata, &ParseContext::new()).unwrap();
///
/// assert_eq!(metadata.get("title"), Some("Hi"));
/// assert_eq!(body.text().trim(), "there");
/// ```
pub fn extract(
    input: &mut impl Read,
    handler: &mut dyn ContentHandler,
    metadata: &mut Metadata,
    context: &ParseContext,
) -> Result<()> {
    extract_with(&DEFAULT_PARSER, input, handler, metadata, context)
}

/// Like [`extract`], using a caller-supplied parser registry.
pub fn extract_with(
    parser: &AutoDetectParser,
    input: &mut impl Read,
    handler: &mut dyn ContentHandler,
    metadata: &mut Metadata,
    context: &ParseContext,
) -> Result<()> {
    let bytes = read_limited(input, context.max_input_bytes)?;
    metadata.set(CONTENT_LENGTH, bytes.len().to_string());

    parser.parse(&bytes, handler, metadata, context)
}

/// Extract from a file, recording its name as `resourceName` for detection.
pub fn extract_file(
    path: &Path,
    handler: &mut dyn ContentHandler,
    metadata: &mut Metadata,
    context: &ParseContext,
) -> Result<()> {
    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        if !metadata.contains(RESOURCE_NAME) {
            metadata.set(RESOURCE_NAME, name);
        }
    }
    let mut reader = BufReader::new(File::open(path)?);
    extract(&mut reader, handler, metadata, context)
}

/// Read the whole stream, failing once more than `limit` bytes arrive.
fn read_limited(input: &mut impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    input
        .by_ref()
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)?;

    if bytes.len() as u64 > limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("input exceeds the limit of {limit} bytes"),
        )
        .into());
    }

    Ok(bytes)
}
