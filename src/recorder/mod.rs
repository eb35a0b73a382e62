//! Interaction recorder
//!
//! Captures clicks and committed input changes and reports each one as an
//! [`ActionRecord`] to a sink supplied by the caller.

pub mod action;
pub mod bridge;
pub mod script;
pub mod selector;
pub mod sink;

pub use action::{ActionKind, ActionRecord};
pub use bridge::{EventBridge, Installation};
pub use script::{recorder_script, DEFAULT_BINDING};
pub use selector::{synthesize, DomElement};
pub use sink::{ActionSink, JsonLinesSink, MemorySink};
