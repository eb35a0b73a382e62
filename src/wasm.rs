//! In-page recorder for WebAssembly builds
//!
//! `install_recorder(callback)` registers the capture-phase click and change
//! observers on the page's `document`. Every record is passed to `callback`
//! as a plain object `{type, selector[, value]}`; the callback is the only
//! thing the recorder talks to.

use crate::recorder::selector::DomElement;
use crate::recorder::{ActionRecord, ActionSink, EventBridge};
use js_sys::{Function, Object, Reflect};
use std::borrow::Cow;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget};

impl DomElement for Element {
    fn tag_name(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(Element::tag_name(self)))
    }

    fn id(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Owned(Element::id(self)))
    }

    fn class_name(&self) -> Option<Cow<'_, str>> {
        // `className` is not a string on SVG elements; the attribute always is.
        self.get_attribute("class").map(Cow::Owned)
    }

    fn value(&self) -> Option<Cow<'_, str>> {
        Reflect::get(AsRef::<JsValue>::as_ref(self), &JsValue::from_str("value"))
            .ok()
            .and_then(|v| v.as_string())
            .map(Cow::Owned)
    }
}

/// Sink that calls a JavaScript function with each record as an object
pub struct CallbackSink {
    callback: Function,
}

impl CallbackSink {
    /// Wrap a JavaScript function
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }

    fn to_object(action: &ActionRecord) -> Result<Object, JsValue> {
        let object = Object::new();
        Reflect::set(&object, &"type".into(), &action.kind().as_str().into())?;
        Reflect::set(&object, &"selector".into(), &action.selector().into())?;
        if let Some(value) = action.value() {
            Reflect::set(&object, &"value".into(), &value.into())?;
        }
        Ok(object)
    }
}

impl ActionSink for CallbackSink {
    fn record(&self, action: ActionRecord) {
        let result = Self::to_object(&action)
            .and_then(|object| self.callback.call1(&JsValue::NULL, &object));
        if let Err(e) = result {
            // Rethrow into the page, like an exception escaping the handler.
            wasm_bindgen::throw_val(e);
        }
    }
}

/// Handle returned to JavaScript; `detach()` removes both observers
#[wasm_bindgen]
pub struct RecorderHandle {
    target: EventTarget,
    on_click: Closure<dyn FnMut(Event)>,
    on_change: Closure<dyn FnMut(Event)>,
}

#[wasm_bindgen]
impl RecorderHandle {
    /// Remove the observers from `document`
    pub fn detach(self) -> Result<(), JsValue> {
        self.target.remove_event_listener_with_callback_and_bool(
            "click",
            self.on_click.as_ref().unchecked_ref(),
            true,
        )?;
        self.target.remove_event_listener_with_callback_and_bool(
            "change",
            self.on_change.as_ref().unchecked_ref(),
            true,
        )?;
        Ok(())
    }
}

fn target_element(event: &Event) -> Option<Element> {
    event.target().and_then(|t| t.dyn_into::<Element>().ok())
}

/// Install the recorder on the current document, reporting to `callback`
#[wasm_bindgen(js_name = installRecorder)]
pub fn install_recorder(callback: Function) -> Result<RecorderHandle, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let target: EventTarget = document.into();

    let bridge = Rc::new(EventBridge::new(CallbackSink::new(callback)));

    let click_bridge = Rc::clone(&bridge);
    let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        click_bridge.on_click(target_element(&event).as_ref());
    });

    let change_bridge = Rc::clone(&bridge);
    let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        change_bridge.on_change(target_element(&event).as_ref());
    });

    target.add_event_listener_with_callback_and_bool(
        "click",
        on_click.as_ref().unchecked_ref(),
        true,
    )?;
    target.add_event_listener_with_callback_and_bool(
        "change",
        on_change.as_ref().unchecked_ref(),
        true,
    )?;

    web_sys::console::log_1(&"Recorder installed and listening for actions.".into());

    Ok(RecorderHandle {
        target,
        on_click,
        on_change,
    })
}
