//! Interaction Recorder - click and change capture for browser automation
//!
//! This crate records what a user does on a page as a stream of action
//! records that an automation controller can later replay.
//!
//! # Features
//!
//! - **Selector synthesis**: best-effort `tag#id` / `tag.class1.class2`
//!   selectors for the element that raised an event
//! - **Event bridge**: capture-phase click and change observers that emit
//!   exactly one action record per event to an injected sink
//! - **CDP recording**: inject the recorder into Chromium through
//!   ChromiumOxide and receive actions over a runtime binding
//! - **WASM**: install the same bridge directly in a page (`wasm` feature)
//!
//! # Architecture
//!
//! ```text
//!  page click/change ──▶ capture-phase observer ──▶ Selector Synthesizer
//!                                  │
//!                                  ▼
//!                            ActionRecord ──▶ ActionSink
//!                                             (closure, channel,
//!                                              JSON lines, CDP binding)
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use interaction_recorder::dom::{Document, Element, Event};
//! use interaction_recorder::recorder::{ActionRecord, EventBridge, MemorySink};
//!
//! let sink = MemorySink::new();
//! let mut document = Document::new();
//! EventBridge::new(sink.clone()).install(&mut document);
//!
//! document.dispatch(&Event::click(Element::new("BUTTON").with_id("submit")));
//! assert_eq!(sink.actions(), vec![ActionRecord::click("button#submit")]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

#[cfg(not(target_arch = "wasm32"))]
pub mod browser;
pub mod dom;
pub mod error;
pub mod recorder;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

// Re-exports for convenience
#[cfg(not(target_arch = "wasm32"))]
pub use browser::{BrowserController, RecorderConfig, RecordingSession};
pub use error::{Error, Result};
pub use recorder::{synthesize, ActionKind, ActionRecord, ActionSink, DomElement, EventBridge};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
