//! PDF parser built on lopdf.
//!
//! Text is extracted page by page and rendered as XHTML: one
//! `<div class="page">` per page holding one `<p>` per non-empty line.
//! The document information dictionary is copied into the metadata record.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone};
use lopdf::{Dictionary, Document, Object};

use crate::detect::MediaType;
use crate::error::Result;
use crate::metadata::{Metadata, AUTHOR, CONTENT_TYPE, TITLE};
use crate::sax::{Attributes, ContentHandler, EventEmitter};

use super::{ParseContext, Parser};

pub const SUBJECT: &str = "subject";
pub const KEYWORDS: &str = "keywords";
pub const CREATOR: &str = "creator";
pub const PRODUCER: &str = "producer";
pub const CREATED: &str = "created";
pub const MODIFIED: &str = "modified";
pub const PDF_VERSION: &str = "pdf:PDFVersion";
pub const PDF_ENCRYPTED: &str = "pdf:encrypted";
pub const PAGE_COUNT: &str = "xmpTPg:NPages";

/// Text fields of the information dictionary and their metadata names.
const INFO_TEXT_FIELDS: &[(&[u8], &str)] = &[
    (b"Title", TITLE),
    (b"Author", AUTHOR),
    (b"Subject", SUBJECT),
    (b"Keywords", KEYWORDS),
    (b"Creator", CREATOR),
    (b"Producer", PRODUCER),
];

/// Date fields of the information dictionary and their metadata names.
const INFO_DATE_FIELDS: &[(&[u8], &str)] = &[(b"CreationDate", CREATED), (b"ModDate", MODIFIED)];

/// Extracts text and document information from PDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfParser;

impl PdfParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Decode a PDF text string.
///
/// Strings starting with a UTF-16BE or UTF-8 byte order mark are decoded
/// accordingly; anything else is treated as PDFDocEncoding, approximated
/// by Latin-1.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Every component after the year is optional. A missing offset is read
/// as UTC.
///
/// # Examples
/// ```
/// use docsift::parsers::parse_pdf_date;
///
/// let date = parse_pdf_date("D:20240115103000+01'00'").unwrap();
/// assert_eq!(date.to_rfc3339(), "2024-01-15T10:30:00+01:00");
/// assert!(parse_pdf_date("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("D:").unwrap_or(raw);
    let digits_end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, zone) = raw.split_at(digits_end);

    let field = |start: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + 2) {
            Some(value) => value.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 1)?, field(6, 1)?)?;
    let time = date.and_hms_opt(field(8, 0)?, field(10, 0)?, field(12, 0)?)?;

    parse_zone(zone)?.from_local_datetime(&time).single()
}

fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let sign = match zone.chars().next() {
        None | Some('Z' | 'z') => return FixedOffset::east_opt(0),
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };
    let digits: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(0..2).unwrap_or("0").parse().ok()?;
    let minutes: i32 = digits.get(2..4).unwrap_or("0").parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// The document information dictionary, if the trailer has one.
fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    info.get(key)
        .ok()
        .and_then(|value| value.as_str().ok())
        .map(decode_text_string)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn collect_metadata(doc: &Document, metadata: &mut Metadata) {
    metadata.set(CONTENT_TYPE, MediaType::Pdf.as_str());
    metadata.set(PDF_VERSION, doc.version.as_str());
    metadata.set(PDF_ENCRYPTED, doc.trailer.has(b"Encrypt").to_string());
    metadata.set(PAGE_COUNT, doc.get_pages().len().to_string());

    let Some(info) = info_dictionary(doc) else {
        return;
    };

    for (key, name) in INFO_TEXT_FIELDS {
        if let Some(value) = info_string(info, key) {
            metadata.set(*name, value);
        }
    }

    for (key, name) in INFO_DATE_FIELDS {
        let Some(raw) = info_string(info, key) else {
            continue;
        };
        match parse_pdf_date(&raw) {
            Some(date) => metadata.set(*name, date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => {
                tracing::debug!(field = *name, value = %raw, "Keeping unparseable PDF date as-is");
                metadata.set(*name, raw);
            }
        }
    }
}

impl Parser for PdfParser {
    fn supported_types(&self) -> &'static [MediaType] {
        &[MediaType::Pdf]
    }

    fn parse(
        &self,
        bytes: &[u8],
        handler: &mut dyn ContentHandler,
        metadata: &mut Metadata,
        _context: &ParseContext,
    ) -> Result<()> {
        let doc = Document::load_mem(bytes)?;
        collect_metadata(&doc, metadata);

        let none = Attributes::new();
        let page_attrs = Attributes::new().with("class", "page");

        let mut emitter = EventEmitter::new(handler);
        emitter.start_document()?;
        emitter.start_xhtml("html", &none)?;
        emitter.start_xhtml("head", &none)?;
        if let Some(title) = metadata.get(TITLE) {
            emitter.xhtml_element("title", &none, title)?;
        }
        emitter.end_element()?;
        emitter.start_xhtml("body", &none)?;

        for (page_number, _) in doc.get_pages() {
            emitter.start_xhtml("div", &page_attrs)?;
            match doc.extract_text(&[page_number]) {
                Ok(text) => {
                    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
                        emitter.xhtml_element("p", &none, line)?;
                    }
                }
                Err(err) => {
                    tracing::warn!(page = page_number, error = %err, "Failed to extract page text");
                }
            }
            emitter.end_element()?;
        }

        emitter.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_string() {
        assert_eq!(decode_text_string(b"Plain"), "Plain");
        assert_eq!(
            decode_text_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9]),
            "H\u{e9}"
        );
        assert_eq!(decode_text_string(b"caf\xE9"), "caf\u{e9}");
        assert_eq!(decode_text_string("\u{FEFF}ok".as_bytes()), "ok");
    }

    #[test]
    fn test_parse_pdf_date_full() {
        let date = parse_pdf_date("D:20231105143015-05'30'").unwrap();
        assert_eq!(date.to_rfc3339(), "2023-11-05T14:30:15-05:30");
    }

    #[test]
    fn test_parse_pdf_date_partial_is_utc() {
        let date = parse_pdf_date("D:2021").unwrap();
        assert_eq!(
            date.to_rfc3339_opts(SecondsFormat::Secs, true),
            "2021-01-01T00:00:00Z"
        );
        let date = parse_pdf_date("20210304Z").unwrap();
        assert_eq!(
            date.to_rfc3339_opts(SecondsFormat::Secs, true),
            "2021-03-04T00:00:00Z"
        );
    }

    #[test]
    fn test_parse_pdf_date_rejects_invalid() {
        assert!(parse_pdf_date("D:20211340").is_none());
        assert!(parse_pdf_date("D:20").is_none());
        assert!(parse_pdf_date("").is_none());
    }

    #[test]
    fn test_malformed_pdf_is_format_error() {
        let mut recorder = crate::handlers::EventRecorder::new();
        let mut metadata = Metadata::new();
        let err = PdfParser::new()
            .parse(
                b"%PDF-1.4\nnot really a pdf",
                &mut recorder,
                &mut metadata,
                &ParseContext::new(),
            )
            .unwrap_err();

        assert!(err.is_format_error());
        assert!(recorder.events().is_empty());
    }
}
