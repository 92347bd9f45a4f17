//! Handler that echoes a capped prefix of the document as markup.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::sax::{payload, Attributes, ContentHandler, HandlerResult};

/// How closing tags are gated once the element cap is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EchoPolicy {
    /// Closing tags use the same gate as opening tags. Elements opened
    /// before the cap but closed after it lose their closing tag.
    #[default]
    Observed,
    /// Closing tags are echoed exactly for the elements whose opening tag
    /// was echoed, so the output is always a well-formed fragment.
    Balanced,
}

/// Gate state of a [`BoundedEchoHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoState {
    /// At most `max_elements` start elements seen; events are echoed.
    Open,
    /// The cap was passed; events are discarded.
    Closed,
}

/// Writes start tags, character data and end tags to a sink until
/// `max_elements` start elements have been seen.
///
/// The counter advances on start elements only, so the last admitted
/// element's text and closing tag are still echoed. From the
/// `max_elements + 1`-th start element on, nothing is written.
pub struct BoundedEchoHandler<W: Write> {
    sink: W,
    max_elements: usize,
    policy: EchoPolicy,
    counter: usize,
    echoed: Vec<bool>,
}

impl BoundedEchoHandler<io::Stdout> {
    /// Echo to standard output.
    #[must_use]
    pub fn to_stdout(max_elements: usize) -> Self {
        Self::new(io::stdout(), max_elements)
    }
}

impl<W: Write> BoundedEchoHandler<W> {
    #[must_use]
    pub fn new(sink: W, max_elements: usize) -> Self {
        Self {
            sink,
            max_elements,
            policy: EchoPolicy::default(),
            counter: 0,
            echoed: Vec::new(),
        }
    }

    /// Set the closing-tag policy.
    #[must_use]
    pub fn with_policy(mut self, policy: EchoPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn state(&self) -> EchoState {
        if self.counter <= self.max_elements {
            EchoState::Open
        } else {
            EchoState::Closed
        }
    }

    /// Number of start elements seen, saturating one past the cap.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.counter
    }

    #[must_use]
    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn is_open(&self) -> bool {
        self.state() == EchoState::Open
    }
}

impl<W: Write> ContentHandler for BoundedEchoHandler<W> {
    fn start_element(
        &mut self,
        _namespace: &str,
        _local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        if self.counter <= self.max_elements {
            self.counter += 1;
        }
        let echo = self.is_open();
        if echo {
            writeln!(self.sink, "<{qname}{attributes}>")?;
        }
        self.echoed.push(echo);
        Ok(())
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        if self.is_open() {
            self.sink.write_all(payload(buffer, offset, length).as_bytes())?;
        }
        Ok(())
    }

    fn end_element(&mut self, _namespace: &str, _local_name: &str, qname: &str) -> HandlerResult {
        let echoed = self.echoed.pop().unwrap_or(false);
        let echo = match self.policy {
            EchoPolicy::Observed => self.is_open(),
            EchoPolicy::Balanced => echoed,
        };
        if echo {
            writeln!(self.sink, "</{qname}>")?;
        }
        Ok(())
    }

    fn end_document(&mut self) -> HandlerResult {
        self.sink.flush()?;
        Ok(())
    }
}
