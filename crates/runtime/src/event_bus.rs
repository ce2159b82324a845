use foundation::RequestId;

/// Minimal event type for traceability of the load pipeline.
///
/// Front-ends drain these and forward them to whatever diagnostic channel the
/// platform has (browser console, `tracing`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub request: Option<RequestId>,
    pub kind: EventKind,
    pub message: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    Issued,
    Rejected,
    Painted,
    Failed,
    Stale,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Issued => "issued",
            EventKind::Rejected => "rejected",
            EventKind::Painted => "painted",
            EventKind::Failed => "failed",
            EventKind::Stale => "stale",
        }
    }

    /// Whether the event describes something the user should know went wrong.
    pub fn is_error(self) -> bool {
        matches!(self, EventKind::Rejected | EventKind::Failed)
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, request: Option<RequestId>, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            request,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventKind};
    use foundation::RequestId;

    #[test]
    fn records_events_with_request_id() {
        let mut bus = EventBus::new();
        bus.emit(Some(RequestId::new(2)), EventKind::Issued, "hello");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].request, Some(RequestId::new(2)));
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(None, EventKind::Rejected, "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(drained[0].kind.is_error());
        assert!(bus.events().is_empty());
    }
}
