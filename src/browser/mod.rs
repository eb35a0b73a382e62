//! Browser hosting for the recorder
//!
//! Launches Chromium through ChromiumOxide, opens and navigates pages, and
//! runs recording sessions that inject the recorder over CDP.

pub mod controller;
pub mod navigation;
pub mod session;
pub mod target;

pub use controller::{BrowserConfig, BrowserController, PageHandle};
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, UrlValidator};
pub use session::{RecorderConfig, RecordingSession};
pub use target::RecorderTarget;
