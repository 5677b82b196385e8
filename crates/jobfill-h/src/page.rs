use crate::bridge::{call, call_as};
use crate::cdp::{CdpClient, LaunchOptions};
use crate::trigger::{self, TriggerEvents};
use async_trait::async_trait;
use base64::Engine;
use jobfill_engine::dom::{DomEvent, ElementInfo, FileUpload};
use jobfill_engine::page::{Page, PageError};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Location {
    href: String,
    hostname: String,
}

/// `Page` over a Chromium tab driven through CDP.
pub struct HeadlessPage {
    client: Option<CdpClient>,
    visible: bool,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self {
            client: None,
            visible: false,
        }
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    pub async fn launch(&mut self) -> Result<(), PageError> {
        let client = CdpClient::launch(&LaunchOptions::from_env(self.visible)).await?;
        self.client = Some(client);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), PageError> {
        if let Some(client) = self.client.take() {
            client.close().await?;
        }
        Ok(())
    }

    /// Load `url` and wait for the navigation to finish. Returns the final URL.
    pub async fn navigate(&mut self, url: &str) -> Result<String, PageError> {
        let page = self.tab()?;
        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| PageError::Other(format!("Navigation failed: {}", e)))?;
        Ok(page
            .url()
            .await
            .map_err(|e| PageError::Other(e.to_string()))?
            .unwrap_or_else(|| url.to_string()))
    }

    /// Clicks on the trigger button, in the order they happen.
    pub async fn trigger_events(&self) -> Result<TriggerEvents, PageError> {
        trigger::subscribe(self.tab()?).await
    }

    fn tab(&self) -> Result<&chromiumoxide::Page, PageError> {
        self.client
            .as_ref()
            .map(|c| &c.page)
            .ok_or(PageError::NotReady)
    }

    async fn location(&self) -> Result<Location, PageError> {
        call_as(self.tab()?, "location", json!({})).await
    }
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Page for HeadlessPage {
    async fn url(&self) -> Result<String, PageError> {
        Ok(self.location().await?.href)
    }

    async fn hostname(&self) -> Result<String, PageError> {
        Ok(self.location().await?.hostname)
    }

    async fn outer_html(&self) -> Result<String, PageError> {
        call_as(self.tab()?, "outerHtml", json!({})).await
    }

    async fn iframe_sources(&self) -> Result<Vec<String>, PageError> {
        call_as(self.tab()?, "iframeSources", json!({})).await
    }

    async fn describe(&self, selector: &str) -> Result<Option<ElementInfo>, PageError> {
        call_as(self.tab()?, "describe", json!({ "selector": selector })).await
    }

    async fn set_value(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        call(
            self.tab()?,
            "setValue",
            json!({ "selector": selector, "value": value }),
        )
        .await?;
        Ok(())
    }

    async fn set_checked(&mut self, selector: &str, checked: bool) -> Result<(), PageError> {
        call(
            self.tab()?,
            "setChecked",
            json!({ "selector": selector, "checked": checked }),
        )
        .await?;
        Ok(())
    }

    async fn set_selected(&mut self, selector: &str, indices: &[usize]) -> Result<(), PageError> {
        call(
            self.tab()?,
            "setSelected",
            json!({ "selector": selector, "indices": indices }),
        )
        .await?;
        Ok(())
    }

    async fn set_files(&mut self, selector: &str, file: &FileUpload) -> Result<(), PageError> {
        let data = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
        call(
            self.tab()?,
            "setFiles",
            json!({
                "selector": selector,
                "name": file.name,
                "contentType": file.content_type,
                "data": data,
            }),
        )
        .await?;
        Ok(())
    }

    async fn dispatch(&mut self, selector: &str, event: DomEvent) -> Result<(), PageError> {
        call(
            self.tab()?,
            "dispatch",
            json!({ "selector": selector, "event": event.name() }),
        )
        .await?;
        Ok(())
    }

    async fn commit_widget_value(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        call(
            self.tab()?,
            "commitWidget",
            json!({ "selector": selector, "value": value }),
        )
        .await?;
        Ok(())
    }

    async fn install_trigger(
        &mut self,
        label: &str,
        site_patterns: &[String],
    ) -> Result<(), PageError> {
        trigger::install(self.tab()?, label, site_patterns).await
    }
}
