//! Recording sessions over CDP
//!
//! A session wires the injected recorder into one page:
//!
//! 1. subscribe to `Runtime.bindingCalled` and register the binding, so the
//!    page gets a global function that forwards strings to the host;
//! 2. register the recorder script for every new document, so recording
//!    survives navigation, and run it once on the current document;
//! 3. forward each payload, decoded as an [`ActionRecord`], to the sink.
//!
//! Stopping undoes all three: the listeners are detached, the new-document
//! script and the binding are removed, and payloads already received are
//! delivered before forwarding ends.
//!
//! The sink is called from a tokio task, one record at a time, in the order
//! the page sent them.

use crate::browser::PageHandle;
use crate::browser::target::RecorderTarget;
use crate::error::{RecorderError, Result};
use crate::recorder::script::{self, DEFAULT_BINDING, DETACH_SCRIPT};
use crate::recorder::{ActionRecord, ActionSink};
use chromiumoxide::cdp::js_protocol::runtime::EventBindingCalled;
use futures::{FutureExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn, Instrument};
use uuid::Uuid;

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Name of the page-global binding (default: `__recordAction`)
    pub binding: String,
    /// Re-inject on every new document (default: true)
    pub persist_across_navigation: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            binding: DEFAULT_BINDING.to_string(),
            persist_across_navigation: true,
        }
    }
}

impl RecorderConfig {
    /// Use a different binding name
    pub fn with_binding<S: Into<String>>(mut self, binding: S) -> Self {
        self.binding = binding.into();
        self
    }

    /// Enable/disable re-injection on navigation
    pub fn persist_across_navigation(mut self, persist: bool) -> Self {
        self.persist_across_navigation = persist;
        self
    }
}

/// What a session registered on the page, so it can be undone
#[derive(Debug, Clone, PartialEq, Eq)]
struct Injection {
    binding: String,
    script_id: Option<String>,
}

/// Register the binding and the recorder script on `target`
///
/// Anything registered before a failing step is removed again.
async fn install<T: RecorderTarget + ?Sized>(
    target: &T,
    config: &RecorderConfig,
    source: &str,
) -> Result<Injection> {
    target
        .add_binding(&config.binding)
        .await
        .map_err(|e| RecorderError::BindingFailed {
            name: config.binding.clone(),
            reason: e.to_string(),
        })?;

    let mut injection = Injection {
        binding: config.binding.clone(),
        script_id: None,
    };

    let injected = async {
        if config.persist_across_navigation {
            injection.script_id = Some(target.add_document_script(source).await?);
        }
        target.evaluate(source).await
    }
    .await;

    if let Err(e) = injected {
        unregister(target, &injection).await;
        return Err(RecorderError::InjectionFailed(e.to_string()).into());
    }

    Ok(injection)
}

/// Detach the listeners in the current document and drop the registrations
async fn teardown<T: RecorderTarget + ?Sized>(target: &T, injection: &Injection) {
    if let Err(e) = target.evaluate(DETACH_SCRIPT).await {
        // The page may already be gone; the registrations still go.
        warn!("Failed to detach recorder: {}", e);
    }
    unregister(target, injection).await;
}

async fn unregister<T: RecorderTarget + ?Sized>(target: &T, injection: &Injection) {
    if let Some(ref script_id) = injection.script_id {
        if let Err(e) = target.remove_document_script(script_id).await {
            warn!("Failed to remove new-document script {}: {}", script_id, e);
        }
    }
    if let Err(e) = target.remove_binding(&injection.binding).await {
        warn!("Failed to remove binding {}: {}", injection.binding, e);
    }
}

/// An active recording on one page
pub struct RecordingSession {
    id: Uuid,
    page: PageHandle,
    injection: Injection,
    shutdown: watch::Sender<bool>,
    forwarder: JoinHandle<()>,
    recorded: Arc<AtomicU64>,
}

impl RecordingSession {
    /// Inject the recorder into `page` and forward its actions to `sink`
    #[instrument(skip(page, sink))]
    pub async fn start<S>(page: &PageHandle, config: RecorderConfig, sink: S) -> Result<Self>
    where
        S: ActionSink + Send + Sync + 'static,
    {
        let source = script::recorder_script(&config.binding)?;
        let id = Uuid::new_v4();

        // Subscribe before registering so no early call is missed
        let events = page.inner().event_listener::<EventBindingCalled>().await?;
        let injection = install(page.inner(), &config, &source).await?;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let recorded = Arc::new(AtomicU64::new(0));
        let forwarder = tokio::spawn(
            forward(events, config.binding, sink, shutdown_rx, Arc::clone(&recorded))
                .instrument(tracing::info_span!("recording", session = %id)),
        );

        info!(session = %id, "Recording started");

        Ok(Self {
            id,
            page: page.clone(),
            injection,
            shutdown,
            forwarder,
            recorded,
        })
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of actions forwarded so far
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Whether the forwarding task is still running
    pub fn is_active(&self) -> bool {
        !self.forwarder.is_finished()
    }

    /// Detach the recorder from the page and stop forwarding
    ///
    /// Later navigations no longer reinstall it. Actions the page sent before
    /// the stop are still delivered. Returns the number of actions forwarded.
    #[instrument(skip(self))]
    pub async fn stop(self) -> Result<u64> {
        teardown(self.page.inner(), &self.injection).await;

        let _ = self.shutdown.send(true);
        if let Err(e) = self.forwarder.await {
            warn!("Forwarding task ended abnormally: {}", e);
        }

        let count = self.recorded.load(Ordering::Relaxed);
        info!(session = %self.id, actions = count, "Recording stopped");
        Ok(count)
    }
}

async fn forward<St, S>(
    mut events: St,
    binding: String,
    sink: S,
    mut shutdown: watch::Receiver<bool>,
    recorded: Arc<AtomicU64>,
) where
    St: futures::Stream<Item = Arc<EventBindingCalled>> + Unpin,
    S: ActionSink,
{
    let deliver = |event: &EventBindingCalled| {
        if let Some(action) = decode(&binding, event) {
            sink.record(action);
            recorded.fetch_add(1, Ordering::Relaxed);
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                // Deliver what the page already sent before giving up the stream
                let mut drained = 0usize;
                while let Some(Some(event)) = events.next().now_or_never() {
                    deliver(&event);
                    drained += 1;
                }
                debug!(drained, "Forwarding cancelled");
                break;
            }
            event = events.next() => {
                let Some(event) = event else {
                    debug!("Binding event stream ended");
                    break;
                };
                deliver(&event);
            }
        }
    }
}

/// Decode a binding call into an action, skipping foreign bindings and
/// malformed payloads
fn decode(binding: &str, event: &EventBindingCalled) -> Option<ActionRecord> {
    if event.name != binding {
        return None;
    }
    match ActionRecord::from_payload(&event.payload) {
        Ok(action) => Some(action),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::recorder::MemorySink;
    use async_trait::async_trait;
    use chromiumoxide::cdp::js_protocol::runtime::ExecutionContextId;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    /// Records the commands it receives; can fail evaluation of the recorder
    #[derive(Default)]
    struct FakeTarget {
        calls: Mutex<Vec<String>>,
        fail_evaluate: bool,
    }

    impl FakeTarget {
        fn failing() -> Self {
            Self {
                fail_evaluate: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl RecorderTarget for FakeTarget {
        async fn add_binding(&self, name: &str) -> Result<()> {
            self.calls.lock().push(format!("add_binding {}", name));
            Ok(())
        }

        async fn remove_binding(&self, name: &str) -> Result<()> {
            self.calls.lock().push(format!("remove_binding {}", name));
            Ok(())
        }

        async fn add_document_script(&self, _source: &str) -> Result<String> {
            self.calls.lock().push("add_document_script".to_string());
            Ok("script-1".to_string())
        }

        async fn remove_document_script(&self, identifier: &str) -> Result<()> {
            self.calls.lock().push(format!("remove_document_script {}", identifier));
            Ok(())
        }

        async fn evaluate(&self, source: &str) -> Result<()> {
            let what = if source == DETACH_SCRIPT { "detach" } else { "recorder" };
            self.calls.lock().push(format!("evaluate {}", what));
            if self.fail_evaluate && what == "recorder" {
                return Err(Error::cdp("execution context destroyed"));
            }
            Ok(())
        }
    }

    fn click_payload(selector: &str) -> Arc<EventBindingCalled> {
        Arc::new(binding_event(
            DEFAULT_BINDING,
            &format!(r#"{{"type":"click","selector":"{}"}}"#, selector),
        ))
    }

    fn binding_event(name: &str, payload: &str) -> EventBindingCalled {
        EventBindingCalled {
            name: name.to_string(),
            payload: payload.to_string(),
            execution_context_id: ExecutionContextId::new(1),
        }
    }

    #[test]
    fn test_recorder_config_default() {
        let config = RecorderConfig::default();
        assert_eq!(config.binding, DEFAULT_BINDING);
        assert!(config.persist_across_navigation);
    }

    #[test]
    fn test_recorder_config_builder() {
        let config = RecorderConfig::default()
            .with_binding("__rec")
            .persist_across_navigation(false);
        assert_eq!(config.binding, "__rec");
        assert!(!config.persist_across_navigation);
    }

    #[test]
    fn test_decode_ignores_foreign_binding() {
        let event = binding_event("__other", r#"{"type":"click","selector":"a"}"#);
        assert_eq!(decode(DEFAULT_BINDING, &event), None);
    }

    #[test]
    fn test_decode_skips_malformed() {
        let event = binding_event(DEFAULT_BINDING, "not json");
        assert_eq!(decode(DEFAULT_BINDING, &event), None);
    }

    #[test]
    fn test_decode_action() {
        let event = binding_event(
            DEFAULT_BINDING,
            r#"{"type":"input","selector":"input.a.b","value":"hello"}"#,
        );
        assert_eq!(
            decode(DEFAULT_BINDING, &event),
            Some(ActionRecord::input("input.a.b", "hello"))
        );
    }

    #[tokio::test]
    async fn test_forward_delivers_in_order_until_stream_ends() {
        let events = futures::stream::iter(vec![
            Arc::new(binding_event(DEFAULT_BINDING, r#"{"type":"click","selector":"button#submit"}"#)),
            Arc::new(binding_event("__other", r#"{"type":"click","selector":"x"}"#)),
            Arc::new(binding_event(DEFAULT_BINDING, r#"{"type":"input","selector":"input","value":"v"}"#)),
        ]);
        let sink = crate::recorder::MemorySink::new();
        let (_shutdown, rx) = watch::channel(false);
        let recorded = Arc::new(AtomicU64::new(0));

        forward(events, DEFAULT_BINDING.to_string(), sink.clone(), rx, Arc::clone(&recorded)).await;

        assert_eq!(
            sink.actions(),
            vec![
                ActionRecord::click("button#submit"),
                ActionRecord::input("input", "v"),
            ]
        );
        assert_eq!(recorded.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_forward_stops_on_shutdown() {
        let events = futures::stream::pending::<Arc<EventBindingCalled>>();
        let sink = crate::recorder::MemorySink::new();
        let (shutdown, rx) = watch::channel(false);

        let task = tokio::spawn(forward(
            events,
            DEFAULT_BINDING.to_string(),
            sink.clone(),
            rx,
            Arc::new(AtomicU64::new(0)),
        ));
        shutdown.send(true).unwrap();
        task.await.unwrap();
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_forward_delivers_buffered_actions_after_shutdown() {
        for _ in 0..50 {
            let events = futures::stream::iter((0..5).map(|i| click_payload(&format!("li#item-{}", i))));
            let sink = MemorySink::new();
            let (shutdown, rx) = watch::channel(false);
            let recorded = Arc::new(AtomicU64::new(0));

            shutdown.send(true).unwrap();
            forward(events, DEFAULT_BINDING.to_string(), sink.clone(), rx, Arc::clone(&recorded)).await;

            assert_eq!(sink.len(), 5);
            assert_eq!(sink.actions()[4], ActionRecord::click("li#item-4"));
            assert_eq!(recorded.load(Ordering::Relaxed), 5);
        }
    }

    #[tokio::test]
    async fn test_install_registers_binding_then_script() {
        let target = FakeTarget::default();
        let source = script::recorder_script(DEFAULT_BINDING).unwrap();

        let injection = install(&target, &RecorderConfig::default(), &source).await.unwrap();

        assert_eq!(injection.script_id.as_deref(), Some("script-1"));
        assert_eq!(
            target.calls(),
            vec![
                "add_binding __recordAction",
                "add_document_script",
                "evaluate recorder",
            ]
        );
    }

    #[tokio::test]
    async fn test_install_without_persistence_skips_document_script() {
        let target = FakeTarget::default();
        let config = RecorderConfig::default().persist_across_navigation(false);
        let source = script::recorder_script(DEFAULT_BINDING).unwrap();

        let injection = install(&target, &config, &source).await.unwrap();

        assert_eq!(injection.script_id, None);
        assert_eq!(target.calls(), vec!["add_binding __recordAction", "evaluate recorder"]);
    }

    #[tokio::test]
    async fn test_failed_install_removes_registrations() {
        let target = FakeTarget::failing();
        let source = script::recorder_script(DEFAULT_BINDING).unwrap();

        let err = install(&target, &RecorderConfig::default(), &source).await.unwrap_err();

        assert!(matches!(err, Error::Recorder(RecorderError::InjectionFailed(_))));
        assert_eq!(
            target.calls(),
            vec![
                "add_binding __recordAction",
                "add_document_script",
                "evaluate recorder",
                "remove_document_script script-1",
                "remove_binding __recordAction",
            ]
        );
    }

    #[tokio::test]
    async fn test_teardown_stops_reinstall_on_navigation() {
        let target = FakeTarget::default();
        let injection = Injection {
            binding: "__rec".to_string(),
            script_id: Some("script-7".to_string()),
        };

        teardown(&target, &injection).await;

        assert_eq!(
            target.calls(),
            vec![
                "evaluate detach",
                "remove_document_script script-7",
                "remove_binding __rec",
            ]
        );
    }
}
