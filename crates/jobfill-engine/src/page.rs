use async_trait::async_trait;
use jobfill_common::dom::{DomEvent, ElementInfo, FileUpload};
pub use jobfill_common::error::PageError;

/// DOM access and event dispatch for one live document.
///
/// Every call takes a CSS selector and resolves it afresh against the current
/// document, so a mutation made by one instruction is visible to the next.
/// Futures are not `Send`: the engine runs on a single cooperative thread.
#[async_trait(?Send)]
pub trait Page {
    /// Full URL of the current document.
    async fn url(&self) -> Result<String, PageError>;

    /// Host name of the current document.
    async fn hostname(&self) -> Result<String, PageError>;

    /// Serialized markup of the document element.
    async fn outer_html(&self) -> Result<String, PageError>;

    /// `src` of every iframe in the document.
    async fn iframe_sources(&self) -> Result<Vec<String>, PageError>;

    /// Describe the first element matching `selector`, `None` when nothing matches.
    async fn describe(&self, selector: &str) -> Result<Option<ElementInfo>, PageError>;

    async fn exists(&self, selector: &str) -> Result<bool, PageError> {
        Ok(self.describe(selector).await?.is_some())
    }

    async fn set_value(&mut self, selector: &str, value: &str) -> Result<(), PageError>;

    async fn set_checked(&mut self, selector: &str, checked: bool) -> Result<(), PageError>;

    /// Make the options at `indices` the exact selected set of a select element.
    async fn set_selected(&mut self, selector: &str, indices: &[usize]) -> Result<(), PageError>;

    /// Replace the file list of a file input with `file`.
    async fn set_files(&mut self, selector: &str, file: &FileUpload) -> Result<(), PageError>;

    /// Dispatch a bubbling `input`/`change` event.
    async fn dispatch(&mut self, selector: &str, event: DomEvent) -> Result<(), PageError>;

    /// Set a custom widget's bound value through the widget's own API, which
    /// also propagates the change to its overlay.
    async fn commit_widget_value(&mut self, selector: &str, value: &str) -> Result<(), PageError>;

    /// Add the trigger button to documents whose host name or an iframe `src`
    /// matches one of `site_patterns`, now and after later navigations.
    async fn install_trigger(
        &mut self,
        _label: &str,
        _site_patterns: &[String],
    ) -> Result<(), PageError> {
        Err(PageError::NotSupported("install_trigger".into()))
    }
}
