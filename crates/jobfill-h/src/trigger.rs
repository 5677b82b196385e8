//! The on-page "Auto-fill" button and the channel its clicks arrive on.
//!
//! Clicks reach us through a CDP runtime binding: the button calls
//! `window.__jobfillTrigger(payload)` and Chromium turns that into a
//! `Runtime.bindingCalled` event.

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::listeners::EventStream;
use futures::StreamExt;
use jobfill_engine::page::PageError;
use serde::Deserialize;
use serde_json::json;

use crate::bridge::{self, BRIDGE_JS};

pub const TRIGGER_BINDING: &str = "__jobfillTrigger";

/// One press of the button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TriggerClick {
    /// Document the button was pressed on.
    #[serde(default)]
    pub url: String,
}

impl TriggerClick {
    fn from_payload(payload: &str) -> Self {
        serde_json::from_str(payload).unwrap_or_default()
    }
}

pub struct TriggerEvents {
    events: EventStream<EventBindingCalled>,
}

impl TriggerEvents {
    /// Wait for the next click. `None` once the browser is gone.
    pub async fn next(&mut self) -> Option<TriggerClick> {
        while let Some(event) = self.events.next().await {
            if event.name == TRIGGER_BINDING {
                return Some(TriggerClick::from_payload(&event.payload));
            }
        }
        None
    }
}

/// Expose the binding and register the button for this and every later
/// document. The page script mounts it only where a site pattern matches.
pub async fn install(page: &Page, label: &str, site_patterns: &[String]) -> Result<(), PageError> {
    page.execute(AddBindingParams::new(TRIGGER_BINDING))
        .await
        .map_err(|e| PageError::Other(format!("Failed to add trigger binding: {}", e)))?;

    let args = json!({
        "label": label,
        "binding": TRIGGER_BINDING,
        "patterns": site_patterns,
    });
    let on_load = format!(
        "{}\nwindow.__jobfill.call(\"installTrigger\", {});",
        BRIDGE_JS, args
    );
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(on_load))
        .await
        .map_err(|e| PageError::Other(format!("Failed to register trigger script: {}", e)))?;

    bridge::call(page, "installTrigger", args).await?;
    tracing::info!("Trigger button '{}' installed", label);
    Ok(())
}

pub async fn subscribe(page: &Page) -> Result<TriggerEvents, PageError> {
    let events = page
        .event_listener::<EventBindingCalled>()
        .await
        .map_err(|e| PageError::Other(format!("Failed to subscribe to binding events: {}", e)))?;
    Ok(TriggerEvents { events })
}
