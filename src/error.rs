//! Error types for the interaction recorder
//!
//! This module provides the error hierarchy using `thiserror`. The in-page
//! recorder itself never fails (an absent target just yields an empty
//! selector); these errors cover the host side: launching the browser,
//! injecting the recorder and decoding what it sends back.

use thiserror::Error;

/// The main error type for recorder operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Recorder injection and payload errors
    #[error("Recorder error: {0}")]
    Recorder(#[from] RecorderError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Errors raised while wiring the recorder into a page
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Binding name is not a usable JavaScript identifier
    #[error("Invalid binding name: {0:?}")]
    InvalidBinding(String),

    /// Registering the CDP binding failed
    #[error("Failed to register binding {name}: {reason}")]
    BindingFailed {
        /// Binding name
        name: String,
        /// Underlying failure
        reason: String,
    },

    /// Injecting the recorder script failed
    #[error("Script injection failed: {0}")]
    InjectionFailed(String),

    /// The page sent a payload that is not an action record
    #[error("Malformed action payload: {0}")]
    MalformedPayload(String),
}

/// Result type alias for recorder operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
#[cfg(not(target_arch = "wasm32"))]
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}
