//! In-process DOM event model
//!
//! A small stand-in for the page's document: elements carry the attributes
//! the recorder reads, and the document dispatches events to listeners
//! registered for the capture or bubble phase. Dispatch follows the DOM
//! ordering rules that matter to the recorder:
//!
//! - every capture listener on the document runs before any bubble listener,
//!   whatever the registration order;
//! - `stop_propagation` ends dispatch after the current phase on the current
//!   node, so it never hides an event from capture listeners that already ran;
//! - `stop_immediate_propagation` also skips the remaining listeners of the
//!   current phase.
//!
//! Everything is single-threaded and run-to-completion, like a page's event
//! loop.

use crate::recorder::selector::DomElement;
use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// A detached element snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag_name: String,
    id: Option<String>,
    class_name: Option<String>,
    value: Option<String>,
}

impl Element {
    /// Create an element with the given tag name
    pub fn new<S: Into<String>>(tag_name: S) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Default::default()
        }
    }

    /// Set the `id` attribute
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the `class` attribute
    pub fn with_class<S: Into<String>>(mut self, class_name: S) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set the form value
    pub fn with_value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Replace the form value, as typing into a field does
    pub fn set_value<S: Into<String>>(&mut self, value: S) {
        self.value = Some(value.into());
    }
}

impl DomElement for Element {
    fn tag_name(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.tag_name))
    }

    fn id(&self) -> Option<Cow<'_, str>> {
        self.id.as_deref().map(Cow::Borrowed)
    }

    fn class_name(&self) -> Option<Cow<'_, str>> {
        self.class_name.as_deref().map(Cow::Borrowed)
    }

    fn value(&self) -> Option<Cow<'_, str>> {
        self.value.as_deref().map(Cow::Borrowed)
    }
}

/// Event types the recorder listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `click`
    Click,
    /// `change`
    Change,
}

impl EventType {
    /// DOM event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Change => "change",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "click" => Ok(EventType::Click),
            "change" => Ok(EventType::Change),
            other => Err(format!("unsupported event type: {}", other)),
        }
    }
}

/// Dispatch phase a listener is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Runs on the way down to the target
    Capture,
    /// Runs on the way back up from the target
    Bubble,
}

/// An event being dispatched
#[derive(Debug)]
pub struct Event {
    event_type: EventType,
    target: Option<Element>,
    phase: Cell<Option<Phase>>,
    propagation_stopped: Cell<bool>,
    immediate_stopped: Cell<bool>,
}

impl Event {
    /// Create an event aimed at `target`
    pub fn new(event_type: EventType, target: Option<Element>) -> Self {
        Self {
            event_type,
            target,
            phase: Cell::new(None),
            propagation_stopped: Cell::new(false),
            immediate_stopped: Cell::new(false),
        }
    }

    /// A click on `target`
    pub fn click(target: Element) -> Self {
        Self::new(EventType::Click, Some(target))
    }

    /// A committed change on `target`
    pub fn change(target: Element) -> Self {
        Self::new(EventType::Change, Some(target))
    }

    /// Event type
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Element that raised the event
    pub fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    /// Phase currently being dispatched, `None` outside dispatch
    pub fn phase(&self) -> Option<Phase> {
        self.phase.get()
    }

    /// Stop the event after the current phase
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Stop the event before the next listener
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_stopped.set(true);
    }

    /// Whether propagation was stopped
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Event listener callback
pub type Listener = Rc<dyn Fn(&Event)>;

struct Registration {
    event_type: EventType,
    phase: Phase,
    listener: Listener,
}

/// Document-level listener registry and dispatcher
#[derive(Default)]
pub struct Document {
    listeners: Vec<Registration>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event_type` in `phase`
    pub fn add_event_listener<F>(&mut self, event_type: EventType, phase: Phase, listener: F)
    where
        F: Fn(&Event) + 'static,
    {
        self.add_listener(event_type, phase, Rc::new(listener));
    }

    /// Register an already shared listener
    pub fn add_listener(&mut self, event_type: EventType, phase: Phase, listener: Listener) {
        self.listeners.push(Registration {
            event_type,
            phase,
            listener,
        });
    }

    /// Remove a listener previously registered with [`Document::add_listener`]
    ///
    /// Matches on the same listener, type and phase, like `removeEventListener`.
    pub fn remove_listener(&mut self, event_type: EventType, phase: Phase, listener: &Listener) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| {
            !(r.event_type == event_type && r.phase == phase && Rc::ptr_eq(&r.listener, listener))
        });
        self.listeners.len() != before
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Dispatch `event`: capture listeners first, then bubble listeners
    pub fn dispatch(&self, event: &Event) {
        for phase in [Phase::Capture, Phase::Bubble] {
            if event.propagation_stopped() {
                break;
            }
            event.phase.set(Some(phase));
            self.run_phase(event, phase);
        }
        event.phase.set(None);
    }

    fn run_phase(&self, event: &Event, phase: Phase) {
        for registration in self
            .listeners
            .iter()
            .filter(|r| r.event_type == event.event_type && r.phase == phase)
        {
            if event.immediate_stopped.get() {
                return;
            }
            (registration.listener)(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn log_listener(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> impl Fn(&Event) {
        let log = Rc::clone(log);
        move |_| log.borrow_mut().push(name)
    }

    #[test]
    fn test_capture_runs_before_bubble_regardless_of_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut doc = Document::new();
        doc.add_event_listener(EventType::Click, Phase::Bubble, log_listener(&log, "bubble"));
        doc.add_event_listener(EventType::Click, Phase::Capture, log_listener(&log, "capture"));

        doc.dispatch(&Event::click(Element::new("a")));
        assert_eq!(*log.borrow(), vec!["capture", "bubble"]);
    }

    #[test]
    fn test_only_matching_type_runs() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut doc = Document::new();
        doc.add_event_listener(EventType::Change, Phase::Capture, log_listener(&log, "change"));

        doc.dispatch(&Event::click(Element::new("a")));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_stop_propagation_in_capture_skips_bubble() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut doc = Document::new();
        doc.add_event_listener(EventType::Click, Phase::Capture, |e: &Event| e.stop_propagation());
        doc.add_event_listener(EventType::Click, Phase::Capture, log_listener(&log, "capture"));
        doc.add_event_listener(EventType::Click, Phase::Bubble, log_listener(&log, "bubble"));

        doc.dispatch(&Event::click(Element::new("a")));
        assert_eq!(*log.borrow(), vec!["capture"]);
    }

    #[test]
    fn test_stop_immediate_propagation_skips_rest_of_phase() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut doc = Document::new();
        doc.add_event_listener(EventType::Click, Phase::Capture, |e: &Event| {
            e.stop_immediate_propagation()
        });
        doc.add_event_listener(EventType::Click, Phase::Capture, log_listener(&log, "capture"));

        doc.dispatch(&Event::click(Element::new("a")));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_listener() {
        let mut doc = Document::new();
        let listener: Listener = Rc::new(|_: &Event| {});
        doc.add_listener(EventType::Click, Phase::Capture, Rc::clone(&listener));
        assert!(!doc.remove_listener(EventType::Click, Phase::Bubble, &listener));
        assert!(doc.remove_listener(EventType::Click, Phase::Capture, &listener));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_phase_visible_to_listener() {
        let seen = Rc::new(Cell::new(None));
        let mut doc = Document::new();
        let s = Rc::clone(&seen);
        doc.add_event_listener(EventType::Change, Phase::Bubble, move |e: &Event| s.set(e.phase()));

        let event = Event::change(Element::new("input"));
        doc.dispatch(&event);
        assert_eq!(seen.get(), Some(Phase::Bubble));
        assert_eq!(event.phase(), None);
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!("click".parse::<EventType>(), Ok(EventType::Click));
        assert!("input".parse::<EventType>().is_err());
        assert_eq!(EventType::Change.to_string(), "change");
    }
}
