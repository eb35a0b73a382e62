//! CDP commands a recording session issues against a page
//!
//! Sessions only need a handful of commands: register and remove the
//! binding, register and remove the new-document script, and evaluate a
//! script in the current document. They go through [`RecorderTarget`] so
//! install and teardown ordering can be checked without a browser.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, RemoveScriptToEvaluateOnNewDocumentParams,
    ScriptIdentifier,
};
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, RemoveBindingParams};
use chromiumoxide::Page;

/// Page-level commands used to install and remove the recorder
#[async_trait]
pub trait RecorderTarget: Send + Sync {
    /// `Runtime.addBinding`
    async fn add_binding(&self, name: &str) -> Result<()>;

    /// `Runtime.removeBinding`
    async fn remove_binding(&self, name: &str) -> Result<()>;

    /// `Page.addScriptToEvaluateOnNewDocument`, returning the script identifier
    async fn add_document_script(&self, source: &str) -> Result<String>;

    /// `Page.removeScriptToEvaluateOnNewDocument`
    async fn remove_document_script(&self, identifier: &str) -> Result<()>;

    /// Evaluate `source` in the current document
    async fn evaluate(&self, source: &str) -> Result<()>;
}

#[async_trait]
impl RecorderTarget for Page {
    async fn add_binding(&self, name: &str) -> Result<()> {
        self.execute(AddBindingParams::new(name)).await?;
        Ok(())
    }

    async fn remove_binding(&self, name: &str) -> Result<()> {
        self.execute(RemoveBindingParams::new(name)).await?;
        Ok(())
    }

    async fn add_document_script(&self, source: &str) -> Result<String> {
        let params = AddScriptToEvaluateOnNewDocumentParams::builder()
            .source(source)
            .build()
            .map_err(|e| Error::cdp(format!("Failed to build script params: {}", e)))?;
        let response = self.execute(params).await?;
        Ok(response.result.identifier.inner().clone())
    }

    async fn remove_document_script(&self, identifier: &str) -> Result<()> {
        let params =
            RemoveScriptToEvaluateOnNewDocumentParams::new(ScriptIdentifier::new(identifier));
        self.execute(params).await?;
        Ok(())
    }

    async fn evaluate(&self, source: &str) -> Result<()> {
        Page::evaluate(self, source.to_string()).await?;
        Ok(())
    }
}
