//! Action sinks
//!
//! The recorder has exactly one external effect: handing each action record
//! to the sink it was constructed with. Anything that can take an
//! [`ActionRecord`] can be a sink: a closure, a channel, a JSON-lines writer.
//!
//! Sinks are infallible from the recorder's point of view. A sink that cannot
//! deliver logs and drops the record; a sink that panics unwinds through the
//! event handler that called it.

use super::action::ActionRecord;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Receiver of recorded actions
pub trait ActionSink {
    /// Deliver one action record
    fn record(&self, action: ActionRecord);
}

impl<F> ActionSink for F
where
    F: Fn(ActionRecord),
{
    fn record(&self, action: ActionRecord) {
        self(action)
    }
}

impl<S: ActionSink + ?Sized> ActionSink for Arc<S> {
    fn record(&self, action: ActionRecord) {
        (**self).record(action)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ActionSink for tokio::sync::mpsc::UnboundedSender<ActionRecord> {
    fn record(&self, action: ActionRecord) {
        if let Err(e) = self.send(action) {
            debug!("Dropping action, receiver closed: {:?}", e.0);
        }
    }
}

/// Writes each record as one JSON line
pub struct JsonLinesSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink printing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ActionSink for JsonLinesSink<W> {
    fn record(&self, action: ActionRecord) {
        let line = match action.to_json() {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode action: {}", e);
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Failed to write action: {}", e);
        }
    }
}

/// Sink that keeps every record in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    actions: Arc<Mutex<Vec<ActionRecord>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn actions(&self) -> Vec<ActionRecord> {
        self.actions.lock().clone()
    }

    /// Number of recorded actions
    pub fn len(&self) -> usize {
        self.actions.lock().len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.actions.lock().is_empty()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<ActionRecord> {
        std::mem::take(&mut *self.actions.lock())
    }
}

impl ActionSink for MemorySink {
    fn record(&self, action: ActionRecord) {
        self.actions.lock().push(action);
    }
}
