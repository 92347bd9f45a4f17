//! Fan-out composition of content handlers.

use crate::sax::{Attributes, ContentHandler, HandlerResult};

/// Delivers every event to each downstream handler in construction order.
///
/// The downstream handlers are borrowed, so they remain available for
/// inspection once the tee is dropped. If a downstream handler fails, the
/// error is returned immediately and the remaining handlers do not see
/// that event.
#[derive(Default)]
pub struct TeeHandler<'a> {
    downstream: Vec<&'a mut dyn ContentHandler>,
}

impl<'a> TeeHandler<'a> {
    #[must_use]
    pub fn new(downstream: Vec<&'a mut dyn ContentHandler>) -> Self {
        Self { downstream }
    }

    /// Append a downstream handler.
    #[must_use]
    pub fn with(mut self, handler: &'a mut dyn ContentHandler) -> Self {
        self.downstream.push(handler);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.downstream.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.downstream.is_empty()
    }

    fn dispatch(
        &mut self,
        mut event: impl FnMut(&mut dyn ContentHandler) -> HandlerResult,
    ) -> HandlerResult {
        for handler in &mut self.downstream {
            event(&mut **handler)?;
        }
        Ok(())
    }
}

impl ContentHandler for TeeHandler<'_> {
    fn start_document(&mut self) -> HandlerResult {
        self.dispatch(|h| h.start_document())
    }

    fn end_document(&mut self) -> HandlerResult {
        self.dispatch(|h| h.end_document())
    }

    fn start_element(
        &mut self,
        namespace: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        self.dispatch(|h| h.start_element(namespace, local_name, qname, attributes))
    }

    fn characters(&mut self, buffer: &str, offset: usize, length: usize) -> HandlerResult {
        self.dispatch(|h| h.characters(buffer, offset, length))
    }

    fn end_element(&mut self, namespace: &str, local_name: &str, qname: &str) -> HandlerResult {
        self.dispatch(|h| h.end_element(namespace, local_name, qname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{BodyTextHandler, EventRecorder, LinkHandler};

    fn drive(handler: &mut dyn ContentHandler) -> HandlerResult {
        let attrs = Attributes::new().with("href", "http://example.com/");
        handler.start_document()?;
        handler.start_element("", "p", "p", &Attributes::new())?;
        handler.start_element("", "a", "a", &attrs)?;
        handler.characters("link", 0, 4)?;
        handler.end_element("", "a", "a")?;
        handler.end_element("", "p", "p")?;
        handler.end_document()
    }

    #[test]
    fn test_every_downstream_sees_the_stream() {
        let mut first = EventRecorder::new();
        let mut second = EventRecorder::new();
        {
            let mut tee = TeeHandler::new(vec![&mut first as &mut dyn ContentHandler, &mut second]);
            drive(&mut tee).unwrap();
        }

        assert_eq!(first.events().len(), 7);
        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn test_mixed_handlers() {
        let mut links = LinkHandler::new();
        let mut text = BodyTextHandler::unbounded();
        {
            let mut tee = TeeHandler::default().with(&mut links).with(&mut text);
            assert_eq!(tee.len(), 2);
            drive(&mut tee).unwrap();
        }

        assert_eq!(links.uris(), vec!["http://example.com/"]);
        assert_eq!(text.text(), "link\n");
    }

    #[test]
    fn test_error_stops_later_downstreams() {
        let mut failing = EventRecorder::abort_after(2);
        let mut after = EventRecorder::new();
        {
            let mut tee = TeeHandler::new(vec![&mut failing as &mut dyn ContentHandler, &mut after]);
            assert!(drive(&mut tee).is_err());
        }

        // The third event failed in the first handler and never reached the second.
        assert_eq!(failing.events().len(), 2);
        assert_eq!(after.events().len(), 2);
        assert_eq!(failing.events(), after.events());
    }

    #[test]
    fn test_empty_tee_accepts_events() {
        let mut tee = TeeHandler::default();
        assert!(tee.is_empty());
        drive(&mut tee).unwrap();
    }
}
