//! Action records
//!
//! One record is produced per observed event and handed to the sink. The
//! serialized form is the wire shape the injected script sends over the
//! CDP binding: `{"type":"click","selector":..}` or
//! `{"type":"input","selector":..,"value":..}`.

use crate::error::{RecorderError, Result};
use serde::{Deserialize, Serialize};

/// Discriminant of an [`ActionRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// A click anywhere on the page
    Click,
    /// A committed value change on an input, textarea or select
    Input,
}

impl ActionKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Input => "input",
        }
    }
}

/// A single recorded user interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionRecord {
    /// Click on the element identified by `selector`
    Click {
        /// Best-effort CSS selector, possibly empty
        selector: String,
    },
    /// Value change on the element identified by `selector`
    Input {
        /// Best-effort CSS selector, possibly empty
        selector: String,
        /// Field content at the time of the change
        #[serde(default)]
        value: String,
    },
}

impl ActionRecord {
    /// Build a click record
    pub fn click<S: Into<String>>(selector: S) -> Self {
        ActionRecord::Click {
            selector: selector.into(),
        }
    }

    /// Build an input record
    pub fn input<S: Into<String>, V: Into<String>>(selector: S, value: V) -> Self {
        ActionRecord::Input {
            selector: selector.into(),
            value: value.into(),
        }
    }

    /// The record's discriminant
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRecord::Click { .. } => ActionKind::Click,
            ActionRecord::Input { .. } => ActionKind::Input,
        }
    }

    /// Selector of the target element
    pub fn selector(&self) -> &str {
        match self {
            ActionRecord::Click { selector } | ActionRecord::Input { selector, .. } => selector,
        }
    }

    /// Recorded value, only present for input records
    pub fn value(&self) -> Option<&str> {
        match self {
            ActionRecord::Click { .. } => None,
            ActionRecord::Input { value, .. } => Some(value),
        }
    }

    /// Decode a payload sent by the injected script
    pub fn from_payload(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| RecorderError::MalformedPayload(format!("{}: {}", e, payload)).into())
    }

    /// Encode the record in its wire shape
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
