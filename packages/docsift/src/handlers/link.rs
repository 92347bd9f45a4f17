//! Handler that collects hyperlinks from the event stream.

use std::fmt;

use thiserror::Error;

use crate::sax::{payload, Attributes, ContentHandler, HandlerResult};

/// Kind of element a link was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `<a href>`.
    Anchor,
    /// `<area href>` in an image map.
    Area,
    /// `<link href>`.
    Link,
    /// `<img src>`.
    Image,
    /// `<iframe src>`.
    IFrame,
    /// `<frame src>` in a frameset.
    Frame,
    /// `<script src>`.
    Script,
    /// `<embed src>`.
    Embed,
}

impl LinkKind {
    /// Classify an element by local name, returning the kind and the
    /// attribute that carries its target.
    fn for_element(local_name: &str) -> Option<(Self, &'static str)> {
        match local_name.to_ascii_lowercase().as_str() {
            "a" => Some((Self::Anchor, "href")),
            "area" => Some((Self::Area, "href")),
            "link" => Some((Self::Link, "href")),
            "img" => Some((Self::Image, "src")),
            "iframe" => Some((Self::IFrame, "src")),
            "frame" => Some((Self::Frame, "src")),
            "script" => Some((Self::Script, "src")),
            "embed" => Some((Self::Embed, "src")),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anchor => "a",
            Self::Link => "link",
            Self::Image => "img",
            Self::Area => "area",
            Self::IFrame => "iframe",
            Self::Frame => "frame",
            Self::Script => "script",
            Self::Embed => "embed",
        }
    }
}

/// A hyperlink found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    /// Target URI, trimmed.
    pub uri: String,
    /// Value of the `title` attribute, if any.
    pub title: Option<String>,
    /// Value of the `rel` attribute, if any.
    pub rel: Option<String>,
    /// Anchor text with whitespace collapsed. Empty for non-anchor links.
    pub text: String,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LinkKind::Anchor => write!(f, "<a href=\"{}\">{}</a>", self.uri, self.text),
            kind => write!(f, "<{} {}=\"{}\"/>", kind.as_str(), target_attribute(kind), self.uri),
        }
    }
}

fn target_attribute(kind: LinkKind) -> &'static str {
    match kind {
        LinkKind::Anchor | LinkKind::Area | LinkKind::Link => "href",
        _ => "src",
    }
}

/// Link-bearing element without a usable target.
#[derive(Debug, Error)]
enum LinkError {
    #[error("<{element}> has no {attribute} attribute")]
    AttributeMissing {
        element: String,
        attribute: &'static str,
    },
}

fn link_target<'a>(
    local_name: &str,
    attribute: &'static str,
    attributes: &'a Attributes,
) -> Result<&'a str, LinkError> {
    attributes
        .get(attribute)
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .ok_or_else(|| LinkError::AttributeMissing {
            element: local_name.to_string(),
            attribute,
        })
}

/// Collects hyperlink targets in document order.
///
/// Duplicates are kept. Elements without a target attribute are skipped.
#[derive(Debug, Default)]
pub struct LinkHandler {
    links: Vec<Link>,
    /// Index into `links` of the anchor whose text is being collected, with
    /// the nesting depth at which it was opened.
    open_anchor: Option<(usize, usize)>,
    depth: usize,
}

impl LinkHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links collected so far.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Target URIs in document order.
    #[must_use]
    pub fn uris(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.uri.as_str()).collect()
    }

    #[must_use]
    pub fn into_links(self) -> Vec<Link> {
        self.links
    }

    pub fn reset(&mut self) {
        self.links.clear();
        self.open_anchor = None;
        self.depth = 0;
    }
}

impl ContentHandler for LinkHandler {
    fn start_element(
        &mut self,
        _namespace: &str,
        local_name: &str,
        _qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        self.depth += 1;

        let Some((kind, attribute)) = LinkKind::for_element(local_name) else {
            return Ok(());
        };

        match link_target(local_name, attribute, attributes) {
            Ok(uri) => {
                self.links.push(Link {
                    kind,
                    uri: uri.to_string(),
                    title: attributes.get("title").map(str::to_string),
                    rel: attributes.get("rel").map(str::to_string),
                    text: String::new(),
                });
                if kind == LinkKind::Anchor && self.open_anchor.is_none() {
                    self.open_anchor = Some((self.links.len() - 1, self.depth));
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "Skipping link element");
            }
        }
        Ok(())
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        if let Some((index, _)) = self.open_anchor {
            if let Some(link) = self.links.get_mut(index) {
                link.text.push_str(payload(buffer, offset, length));
            }
        }
        Ok(())
    }

    fn end_element(&mut self, _namespace: &str, _local_name: &str, _qname: &str) -> HandlerResult {
        if let Some((index, depth)) = self.open_anchor {
            if depth == self.depth {
                if let Some(link) = self.links.get_mut(index) {
                    link.text = link.text.split_whitespace().collect::<Vec<_>>().join(" ");
                }
                self.open_anchor = None;
            }
        }
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn anchor(handler: &mut LinkHandler, href: Option<&str>, text: &str) {
        let attrs = match href {
            Some(href) => Attributes::new().with("href", href),
            None => Attributes::new(),
        };
        handler.start_element("", "a", "a", &attrs).unwrap();
        handler.characters(text, 0, text.len()).unwrap();
        handler.end_element("", "a", "a").unwrap();
    }

    #[test]
    fn test_collects_anchor_with_text() {
        let mut handler = LinkHandler::new();
        anchor(&mut handler, Some("http://antoniospizzas.com/"), "Antonio's\n  Pizza");

        assert_eq!(handler.uris(), vec!["http://antoniospizzas.com/"]);
        assert_eq!(handler.links()[0].text, "Antonio's Pizza");
        assert_eq!(handler.links()[0].kind, LinkKind::Anchor);
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        let mut handler = LinkHandler::new();
        anchor(&mut handler, Some("http://b/"), "b");
        anchor(&mut handler, Some("http://a/"), "a");
        anchor(&mut handler, Some("http://b/"), "b again");

        assert_eq!(handler.uris(), vec!["http://b/", "http://a/", "http://b/"]);
    }

    #[test]
    fn test_missing_href_is_skipped() {
        let mut handler = LinkHandler::new();
        anchor(&mut handler, None, "named anchor");
        anchor(&mut handler, Some("   "), "blank");
        anchor(&mut handler, Some(" http://x/ "), "x");

        assert_eq!(handler.uris(), vec!["http://x/"]);
    }

    #[test]
    fn test_image_and_link_elements() {
        let mut handler = LinkHandler::new();
        let img = Attributes::new().with("src", "logo.png").with("title", "Logo");
        handler.start_element("", "img", "img", &img).unwrap();
        handler.end_element("", "img", "img").unwrap();
        let css = Attributes::new().with("href", "site.css").with("rel", "stylesheet");
        handler.start_element("", "link", "link", &css).unwrap();
        handler.end_element("", "link", "link").unwrap();

        let links = handler.links();
        assert_eq!(links[0].kind, LinkKind::Image);
        assert_eq!(links[0].title.as_deref(), Some("Logo"));
        assert_eq!(links[1].kind, LinkKind::Link);
        assert_eq!(links[1].rel.as_deref(), Some("stylesheet"));
        assert_eq!(links[1].to_string(), r#"<link href="site.css"/>"#);
    }

    #[test]
    fn test_frames_keep_their_element_name() {
        let mut handler = LinkHandler::new();
        for (name, uri) in [("frame", "nav.html"), ("iframe", "map.html"), ("area", "/north")] {
            let attribute = if name == "area" { "href" } else { "src" };
            let attrs = Attributes::new().with(attribute, uri);
            handler.start_element("", name, name, &attrs).unwrap();
            handler.end_element("", name, name).unwrap();
        }

        let rendered: Vec<String> = handler.links().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                r#"<frame src="nav.html"/>"#,
                r#"<iframe src="map.html"/>"#,
                r#"<area href="/north"/>"#,
            ]
        );
        assert_eq!(handler.links()[0].kind, LinkKind::Frame);
        assert_eq!(handler.links()[1].kind, LinkKind::IFrame);
        assert_eq!(handler.links()[2].kind, LinkKind::Area);
    }

    #[test]
    fn test_anchor_text_spans_nested_elements() {
        let mut handler = LinkHandler::new();
        let attrs = Attributes::new().with("href", "/x");
        handler.start_element("", "a", "a", &attrs).unwrap();
        handler.start_element("", "b", "b", &Attributes::new()).unwrap();
        handler.characters("bold", 0, 4).unwrap();
        handler.end_element("", "b", "b").unwrap();
        handler.characters(" tail", 0, 5).unwrap();
        handler.end_element("", "a", "a").unwrap();
        handler.characters("outside", 0, 7).unwrap();

        assert_eq!(handler.links()[0].text, "bold tail");
        assert_eq!(handler.links()[0].to_string(), r#"<a href="/x">bold tail</a>"#);
    }
}
