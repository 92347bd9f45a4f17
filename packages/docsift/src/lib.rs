//! docsift - Detect document formats and extract text, links and metadata.
//!
//! Inputs (PDF, HTML, XML or plain text) are detected from their content,
//! parsed once, and delivered as a stream of structural events to a
//! [`ContentHandler`]. Handlers turn the stream into derived artifacts and
//! can be composed so that one parse produces several of them.
//!
//! # Example
//!
//! ```
//! use docsift::{extract, BodyTextHandler, ContentHandler, LinkHandler, Metadata, ParseContext, TeeHandler};
//!
//! let html = r#"<html><head><title>Menu</title></head>
//!     <body><p>Order at <a href="http://pizza.example/">Pizza</a>.</p></body></html>"#;
//!
//! let mut links = LinkHandler::new();
//! let mut body = BodyTextHandler::new();
//! let mut metadata = Metadata::new();
//! {
//!     let mut tee = TeeHandler::new(vec![&mut links as &mut dyn ContentHandler, &mut body]);
//!     extract(&mut html.as_bytes(), &mut tee, &mut metadata, &ParseContext::new()).unwrap();
//! }
//!
//! assert_eq!(metadata.get("title"), Some("Menu"));
//! assert!(body.text().contains("Order at Pizza."));
//! assert_eq!(links.uris(), vec!["http://pizza.example/"]);
//! ```
//!
//! # Architecture
//!
//! - [`sax`]: Event model and the [`ContentHandler`] trait
//! - [`handlers`]: Body text, link, tee, bounded echo and recording handlers
//! - [`detect`]: Media type detection
//! - [`parsers`]: Format parsers and the auto-detecting registry
//! - [`extract`](mod@extract): Stream entry points
//! - [`metadata`]: Metadata record
//! - [`config`]: Limits and YAML-loadable options
//! - [`error`]: Error types and Result alias
//! - [`demo`]: Ready-made extraction pipelines

pub mod config;
pub mod demo;
pub mod detect;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metadata;
pub mod parsers;
pub mod sax;

// Re-export main functions
pub use extract::{extract, extract_file, extract_with};

// Re-export commonly used items
pub use config::ExtractConfig;
pub use detect::MediaType;
pub use error::{ExtractError, HandlerError, Result};
pub use handlers::{BodyTextHandler, BoundedEchoHandler, EchoPolicy, LinkHandler, TeeHandler};
pub use metadata::Metadata;
pub use parsers::{AutoDetectParser, ParseContext, Parser};
pub use sax::{Attributes, ContentHandler};
