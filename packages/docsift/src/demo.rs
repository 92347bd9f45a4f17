//! Ready-made extraction pipelines.
//!
//! - [`echo_document`]: echo a capped prefix of the document, then print
//!   its metadata
//! - [`extract_text_and_links`]: body text and hyperlinks in one pass,
//!   through a [`TeeHandler`]
//! - [`summarize_html`]: the same for an HTML string

use std::io::{Read, Write};

use crate::config::ExtractConfig;
use crate::error::Result;
use crate::extract::extract;
use crate::handlers::{BodyTextHandler, BoundedEchoHandler, Link, LinkHandler, TeeHandler};
use crate::metadata::Metadata;
use crate::parsers::ParseContext;
use crate::sax::ContentHandler;

/// Result of a combined text and link extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub metadata: Metadata,
    /// Body text of the document.
    pub body: String,
    /// Hyperlinks in document order.
    pub links: Vec<Link>,
}

impl Extraction {
    /// Link targets in document order.
    #[must_use]
    pub fn uris(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.uri.as_str()).collect()
    }
}

/// Echo the first `max_elements` elements of `input` to `echo_out`, then
/// write every metadata field as a `name=value` line to `metadata_out`.
///
/// Returns the metadata record.
///
/// # Examples
/// ```
/// use docsift::demo::echo_document;
///
/// let mut input: &[u8] = b"<a><b/><c/><d/></a>";
/// let mut echo = Vec::new();
/// let mut listing = Vec::new();
/// echo_document(&mut input, &mut listing, &mut echo, 2).unwrap();
///
/// assert_eq!(String::from_utf8(echo).unwrap(), "<a>\n<b>\n</b>\n");
/// assert!(String::from_utf8(listing).unwrap().contains("content-type=application/xml"));
/// ```
pub fn echo_document<W: Write>(
    input: &mut impl Read,
    metadata_out: &mut impl Write,
    echo_out: W,
    max_elements: usize,
) -> Result<Metadata> {
    let config = ExtractConfig {
        max_echo_elements: max_elements,
        ..ExtractConfig::default()
    };
    echo_document_with(input, metadata_out, echo_out, &config)
}

/// Like [`echo_document`], taking the element cap, closing-tag policy and
/// parse options from `config`.
pub fn echo_document_with<W: Write>(
    input: &mut impl Read,
    metadata_out: &mut impl Write,
    echo_out: W,
    config: &ExtractConfig,
) -> Result<Metadata> {
    let mut handler =
        BoundedEchoHandler::new(echo_out, config.max_echo_elements).with_policy(config.echo_policy);
    let mut metadata = Metadata::new();
    extract(input, &mut handler, &mut metadata, &ParseContext::from(config))?;

    write!(metadata_out, "{metadata}")?;
    metadata_out.flush()?;
    Ok(metadata)
}

/// Extract body text and hyperlinks from `input` in a single parse.
///
/// # Errors
/// Fails with `CapacityExceeded` when the body is longer than
/// `config.max_body_bytes`, or with any error of [`extract`].
pub fn extract_text_and_links(input: &mut impl Read, config: &ExtractConfig) -> Result<Extraction> {
    let mut links = LinkHandler::new();
    let mut body = BodyTextHandler::from_limit(config.max_body_bytes);
    let mut metadata = Metadata::new();
    {
        let mut tee = TeeHandler::new(vec![&mut links as &mut dyn ContentHandler, &mut body]);
        extract(input, &mut tee, &mut metadata, &ParseContext::from(config))?;
    }

    Ok(Extraction {
        metadata,
        body: body.into_text(),
        links: links.into_links(),
    })
}

/// Title, body text and links of an HTML string.
///
/// # Examples
/// ```
/// use docsift::demo::summarize_html;
///
/// let summary = summarize_html(r#"<title>T</title><p>See <a href="http://x/">x</a></p>"#).unwrap();
/// assert_eq!(summary.metadata.get("title"), Some("T"));
/// assert_eq!(summary.uris(), vec!["http://x/"]);
/// ```
pub fn summarize_html(html: &str) -> Result<Extraction> {
    let config = ExtractConfig::default().with_content_type_hint("text/html");
    extract_text_and_links(&mut html.as_bytes(), &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::EchoPolicy;
    use crate::metadata::TITLE;
    use pretty_assertions::assert_eq;

    const PIZZA: &str = r#"<html><head><title>The Big Brown Shoe</title></head><body><p>The best pizza place in the US is <a href="http://antoniospizzas.com/">Antonio's Pizza</a>.</p><p>It is located in Amherst, MA.</p></body></html>"#;

    #[test]
    fn test_summarize_html() {
        let summary = summarize_html(PIZZA).unwrap();

        assert_eq!(summary.metadata.get(TITLE), Some("The Big Brown Shoe"));
        assert_eq!(
            summary.body,
            "The best pizza place in the US is Antonio's Pizza.\nIt is located in Amherst, MA.\n"
        );
        assert_eq!(summary.uris(), vec!["http://antoniospizzas.com/"]);
        assert_eq!(summary.links[0].text, "Antonio's Pizza");
    }

    #[test]
    fn test_body_limit_from_config() {
        let config = ExtractConfig::default().with_max_body_bytes(Some(10));
        let err = extract_text_and_links(&mut PIZZA.as_bytes(), &config).unwrap_err();
        assert!(err.is_capacity_exceeded());
    }

    #[test]
    fn test_echo_document_lists_metadata() {
        let mut echo = Vec::new();
        let mut listing = Vec::new();
        let metadata = echo_document(&mut PIZZA.as_bytes(), &mut listing, &mut echo, 3).unwrap();

        let echo = String::from_utf8(echo).unwrap();
        // The cap is reached inside <head>, so </head> is still echoed but
        // nothing from <body> on.
        assert_eq!(
            echo,
            "<html>\n<head>\n<title>\nThe Big Brown Shoe</title>\n</head>\n"
        );

        let listing = String::from_utf8(listing).unwrap();
        assert!(listing.contains("title=The Big Brown Shoe\n"));
        assert!(listing.contains("content-type=text/html\n"));
        assert_eq!(listing.lines().count(), metadata.len());
    }

    #[test]
    fn test_echo_document_balanced_policy() {
        let config = ExtractConfig {
            max_echo_elements: 2,
            echo_policy: EchoPolicy::Balanced,
            ..ExtractConfig::default()
        };
        let mut echo = Vec::new();
        echo_document_with(&mut &b"<a><b/><c/><d/></a>"[..], &mut std::io::sink(), &mut echo, &config)
            .unwrap();

        assert_eq!(String::from_utf8(echo).unwrap(), "<a>\n<b>\n</b>\n</a>\n");
    }
}
