//! Event bridge
//!
//! Turns page events into action records. A click becomes
//! `ActionRecord::Click`, a change becomes `ActionRecord::Input` carrying the
//! target's current value. Each event is handled on its own: no ordering,
//! batching or deduplication across events.

use super::action::ActionRecord;
use super::selector::{synthesize, DomElement};
use super::sink::ActionSink;
use crate::dom::{Document, Event, EventType, Listener, Phase};
use std::rc::Rc;
use tracing::trace;

/// Relays observed events to a sink
pub struct EventBridge<S> {
    sink: S,
}

impl<S: ActionSink> EventBridge<S> {
    /// Create a bridge delivering to `sink`
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// The sink this bridge delivers to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Record a click on `target`
    pub fn on_click<E: DomElement + ?Sized>(&self, target: Option<&E>) {
        let action = ActionRecord::click(synthesize(target));
        trace!(selector = action.selector(), "click");
        self.sink.record(action);
    }

    /// Record a committed value change on `target`
    pub fn on_change<E: DomElement + ?Sized>(&self, target: Option<&E>) {
        let value = target
            .and_then(|t| t.value().map(|v| v.into_owned()))
            .unwrap_or_default();
        let action = ActionRecord::input(synthesize(target), value);
        trace!(selector = action.selector(), "input");
        self.sink.record(action);
    }

    /// Record whatever `event` represents
    pub fn handle(&self, event: &Event) {
        match event.event_type() {
            EventType::Click => self.on_click(event.target()),
            EventType::Change => self.on_change(event.target()),
        }
    }
}

impl<S: ActionSink + 'static> EventBridge<S> {
    /// Register the click and change observers on `document` in the capture
    /// phase
    ///
    /// The returned handle removes both observers again.
    pub fn install(self, document: &mut Document) -> Installation {
        let bridge = Rc::new(self);
        let mut listeners = Vec::with_capacity(2);

        for event_type in [EventType::Click, EventType::Change] {
            let bridge = Rc::clone(&bridge);
            let listener: Listener = Rc::new(move |event: &Event| bridge.handle(event));
            document.add_listener(event_type, Phase::Capture, Rc::clone(&listener));
            listeners.push((event_type, listener));
        }

        Installation { listeners }
    }
}

/// Observers registered by [`EventBridge::install`]
pub struct Installation {
    listeners: Vec<(EventType, Listener)>,
}

impl Installation {
    /// Remove the observers from `document`
    pub fn detach(self, document: &mut Document) {
        for (event_type, listener) in &self.listeners {
            document.remove_listener(*event_type, Phase::Capture, listener);
        }
    }
}
