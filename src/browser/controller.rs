//! Browser launch and shutdown
//!
//! Recording wants a real window by default: the user has to see the page to
//! click on it. Headless launches are still available for scripted runs.

use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// How long `close` waits for the CDP handler task to wind down
const HANDLER_SHUTDOWN: Duration = Duration::from_secs(5);

/// Configuration for browser launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Launch without a window (default: false)
    pub headless: bool,
    /// Viewport width (default: 1280)
    pub width: u32,
    /// Viewport height (default: 800)
    pub height: u32,
    /// Chrome sandbox (default: true)
    pub sandbox: bool,
    /// Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            width: 1280,
            height: 800,
            sandbox: true,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Create a new config builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// Chrome arguments implied by this config, beyond what chromiumoxide sets
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 1);
        if !self.sandbox {
            args.push("--no-sandbox".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn to_cdp(&self) -> Result<CdpBrowserConfig> {
        let mut builder = CdpBrowserConfig::builder().viewport(Viewport {
            width: self.width,
            height: self.height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: self.width >= self.height,
            has_touch: false,
        });

        // chromiumoxide is headless unless asked for a window
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        for arg in self.chrome_args() {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()).into())
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// A page the recorder can navigate and record on
#[derive(Clone)]
pub struct PageHandle {
    page: Page,
}

impl PageHandle {
    /// Get the underlying chromiumoxide Page
    pub fn inner(&self) -> &Page {
        &self.page
    }
}

/// A launched browser and its CDP handler task
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserController {
    /// Launch Chromium with `config`
    #[instrument(skip(config), fields(headless = config.headless))]
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let (browser, mut handler) = Browser::launch(config.to_cdp()?)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser launched");
        Ok(Self { browser, handler })
    }

    /// Open a blank page
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<PageHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;
        Ok(PageHandle { page })
    }

    /// Close the browser and wait for the handler task
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        if tokio::time::timeout(HANDLER_SHUTDOWN, self.handler).await.is_err() {
            warn!("Browser handler did not stop within {:?}", HANDLER_SHUTDOWN);
        }

        info!("Browser closed");
        Ok(())
    }
}
