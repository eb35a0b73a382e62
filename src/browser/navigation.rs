//! Page navigation
//!
//! URL validation and `goto` with timeout and retry handling.

use crate::browser::PageHandle;
use crate::error::{Error, NavigationError, Result};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Number of retry attempts (default: 2)
    pub retries: u32,
    /// Delay between retries in ms (default: 1000)
    pub retry_delay_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

/// Result of a navigation operation
#[derive(Debug)]
pub struct NavigationResult {
    /// Final URL after any redirects
    pub final_url: String,
    /// Page title
    pub title: Option<String>,
    /// Navigation duration in milliseconds
    pub duration_ms: u64,
}

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Schemes the recorder will open
    pub const ALLOWED_SCHEMES: [&'static str; 3] = ["http", "https", "file"];

    /// Parse and validate a URL for navigation
    pub fn validate(url: &str) -> std::result::Result<Url, NavigationError> {
        if url.trim().is_empty() {
            return Err(NavigationError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let parsed = Url::parse(url).map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", url, e)))?;

        if !Self::ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(NavigationError::InvalidUrl(format!(
                "URL must start with http://, https://, or file://: {}",
                url
            )));
        }

        Ok(parsed)
    }

    /// Check if URL points to localhost
    pub fn is_localhost(url: &Url) -> bool {
        matches!(
            url.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("0.0.0.0")
        )
    }
}

/// Navigates pages
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL, retrying on failure
    #[instrument(skip(page, options))]
    pub async fn goto(
        page: &PageHandle,
        url: &str,
        options: Option<NavigationOptions>,
    ) -> Result<NavigationResult> {
        let opts = options.unwrap_or_default();
        let start = std::time::Instant::now();

        let url = UrlValidator::validate(url)?;
        if UrlValidator::is_localhost(&url) {
            debug!("Navigating to a local address");
        }
        info!("Navigating to: {}", url);

        let mut last_error = None;
        for attempt in 0..=opts.retries {
            if attempt > 0 {
                warn!("Navigation retry attempt {} of {}", attempt, opts.retries);
                tokio::time::sleep(Duration::from_millis(opts.retry_delay_ms)).await;
            }

            match Self::navigate_once(page.inner(), url.as_str(), &opts).await {
                Ok(mut result) => {
                    result.duration_ms = start.elapsed().as_millis() as u64;
                    return Ok(result);
                }
                Err(e) => {
                    warn!("Navigation attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            NavigationError::LoadFailed("Navigation failed after all retries".to_string()).into()
        }))
    }

    async fn navigate_once(
        page: &chromiumoxide::Page,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<NavigationResult> {
        let timeout = Duration::from_millis(opts.timeout_ms);

        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(opts.timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        let final_url = page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        let title = page
            .evaluate("document.title")
            .await
            .ok()
            .and_then(|v| v.into_value::<String>().ok());

        debug!("Navigation complete: {} -> {}", url, final_url);

        Ok(NavigationResult {
            final_url,
            title,
            duration_ms: 0,
        })
    }
}
