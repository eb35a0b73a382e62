//! Injected recorder script
//!
//! The JavaScript side of the recorder, for hosts that drive a real browser.
//! It carries the same selector heuristic as [`super::selector::synthesize`]
//! and registers capture-phase `click` and `change` listeners on `document`.
//! Each record is sent as a JSON string through a page-global function
//! (the binding) supplied by the host.
//!
//! Installing twice in one document is a no-op. `window.__interactionRecorder
//! .detach()` removes both listeners.

use crate::error::{RecorderError, Result};

/// Default name of the page-global binding
pub const DEFAULT_BINDING: &str = "__recordAction";

/// Placeholder replaced by the binding name
const BINDING_PLACEHOLDER: &str = "__BINDING__";

const RECORDER_TEMPLATE: &str = r#"
(() => {
    if (window.__interactionRecorder) {
        return false;
    }

    const send = (action) => {
        const binding = window['__BINDING__'];
        if (typeof binding === 'function') {
            binding(JSON.stringify(action));
        }
    };

    const classNameOf = (element) => {
        const className = element.className;
        if (typeof className === 'string') {
            return className;
        }
        return element.getAttribute ? (element.getAttribute('class') || '') : '';
    };

    const selectorFor = (element) => {
        if (!element || !element.tagName) {
            return '';
        }
        let selector = element.tagName.toLowerCase();
        if (element.id) {
            return selector + '#' + element.id;
        }
        const classes = classNameOf(element).trim();
        if (classes) {
            selector += '.' + classes.split(/\s+/).join('.');
        }
        return selector;
    };

    const onClick = (event) => {
        send({ type: 'click', selector: selectorFor(event.target) });
    };

    const onChange = (event) => {
        const target = event.target;
        const value = target && target.value != null ? String(target.value) : '';
        send({ type: 'input', selector: selectorFor(target), value: value });
    };

    document.addEventListener('click', onClick, true);
    document.addEventListener('change', onChange, true);

    window.__interactionRecorder = {
        detach() {
            document.removeEventListener('click', onClick, true);
            document.removeEventListener('change', onChange, true);
            delete window.__interactionRecorder;
        },
    };
    return true;
})()
"#;

/// Script that detaches an installed recorder, if any
pub const DETACH_SCRIPT: &str =
    "(() => { if (window.__interactionRecorder) { window.__interactionRecorder.detach(); return true; } return false; })()";

/// Check that `name` can be used as the page-global binding
pub fn validate_binding(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(RecorderError::InvalidBinding(name.to_string()).into())
    }
}

/// Render the recorder script for `binding`
pub fn recorder_script(binding: &str) -> Result<String> {
    validate_binding(binding)?;
    Ok(RECORDER_TEMPLATE.replace(BINDING_PLACEHOLDER, binding))
}
