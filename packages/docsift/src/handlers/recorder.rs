//! Handler that records the raw event stream.
//!
//! Used to inspect what a parser emits and to check stream invariants.

use crate::error::HandlerError;
use crate::sax::{payload, Attributes, ContentHandler, HandlerResult};

/// One recorded document event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartElement {
        namespace: String,
        local_name: String,
        qname: String,
        attributes: Attributes,
    },
    Characters(String),
    EndElement {
        namespace: String,
        local_name: String,
        qname: String,
    },
}

/// Records every event it receives.
///
/// Optionally aborts with [`HandlerError::Aborted`] once a number of events
/// has been accepted, which simulates a handler cancelling the parse.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<Event>,
    abort_after: Option<usize>,
}

impl EventRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `accepted` events, then fail on the next one.
    #[must_use]
    pub fn abort_after(accepted: usize) -> Self {
        Self {
            events: Vec::new(),
            abort_after: Some(accepted),
        }
    }

    /// The events received so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Qualified names of start elements, in order.
    #[must_use]
    pub fn start_qnames(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::StartElement { qname, .. } => Some(qname.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Concatenated character data.
    #[must_use]
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Characters(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether start and end elements pair up in LIFO order with
    /// character data only inside elements.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut stack: Vec<&str> = Vec::new();
        for event in &self.events {
            match event {
                Event::StartElement { qname, .. } => stack.push(qname),
                Event::EndElement { qname, .. } => {
                    if stack.pop() != Some(qname.as_str()) {
                        return false;
                    }
                }
                Event::Characters(_) if stack.is_empty() => return false,
                _ => {}
            }
        }
        stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn record(&mut self, event: Event) -> HandlerResult {
        if self.abort_after.is_some_and(|limit| self.events.len() >= limit) {
            return Err(HandlerError::Aborted(format!(
                "recorder stopped after {} events",
                self.events.len()
            )));
        }
        self.events.push(event);
        Ok(())
    }
}

impl ContentHandler for EventRecorder {
    fn start_document(&mut self) -> HandlerResult {
        self.record(Event::StartDocument)
    }

    fn end_document(&mut self) -> HandlerResult {
        self.record(Event::EndDocument)
    }

    fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        self.record(Event::StartElement {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
            attributes: attributes.clone(),
        })
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        self.record(Event::Characters(
            payload(buffer, offset, length).to_string(),
        ))
    }

    fn end_element(&mut self, namespace: &str, local_name: &str, qname: &str) -> HandlerResult {
        self.record(Event::EndElement {
            namespace: namespace.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(handler: &mut EventRecorder, name: &str) -> HandlerResult {
        handler.start_element("", name, name, &Attributes::new())
    }

    fn end(handler: &mut EventRecorder, name: &str) -> HandlerResult {
        handler.end_element("", name, name)
    }

    #[test]
    fn test_balanced_stream() {
        let mut recorder = EventRecorder::new();
        start(&mut recorder, "a").unwrap();
        start(&mut recorder, "b").unwrap();
        recorder.characters("xyz", 1, 1).unwrap();
        end(&mut recorder, "b").unwrap();
        end(&mut recorder, "a").unwrap();

        assert!(recorder.is_balanced());
        assert_eq!(recorder.start_qnames(), vec!["a", "b"]);
        assert_eq!(recorder.text(), "y");
    }

    #[test]
    fn test_crossed_nesting_is_unbalanced() {
        let mut recorder = EventRecorder::new();
        start(&mut recorder, "a").unwrap();
        start(&mut recorder, "b").unwrap();
        end(&mut recorder, "a").unwrap();
        end(&mut recorder, "b").unwrap();

        assert!(!recorder.is_balanced());
    }

    #[test]
    fn test_text_outside_element_is_unbalanced() {
        let mut recorder = EventRecorder::new();
        recorder.characters("loose", 0, 5).unwrap();
        assert!(!recorder.is_balanced());
    }

    #[test]
    fn test_abort_after() {
        let mut recorder = EventRecorder::abort_after(1);
        start(&mut recorder, "a").unwrap();
        let err = start(&mut recorder, "b").unwrap_err();

        assert!(matches!(err, HandlerError::Aborted(_)));
        assert_eq!(recorder.events().len(), 1);
    }
}
