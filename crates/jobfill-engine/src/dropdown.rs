//! Custom dropdown widgets: styled overlays backed by a hidden select or input.
//!
//! Static widgets keep their options in markup and are resolved by visible
//! text. Remote widgets carry a `data-url` pointing at a paginated option API;
//! the whole list is paged in before matching, the way the widget itself
//! populates when a user types into its search box. The chosen id is committed
//! through the widget's own API so its overlay stays in sync.

use crate::applier::classify::WidgetKind;
use crate::applier::report::FieldStatus;
use crate::config::DropdownConfig;
use crate::options::{OptionSource, fetch_all_options};
use crate::page::{Page, PageError};
use jobfill_common::dom::{DomEvent, ElementInfo};
use tracing::{debug, info, warn};
use url::Url;

pub struct DropdownResolver<'a> {
    source: &'a dyn OptionSource,
    config: &'a DropdownConfig,
}

impl<'a> DropdownResolver<'a> {
    pub fn new(source: &'a dyn OptionSource, config: &'a DropdownConfig) -> Self {
        Self { source, config }
    }

    /// Select the option whose trimmed text equals the trimmed `wanted` text.
    pub async fn resolve_static<P: Page + ?Sized>(
        &self,
        page: &mut P,
        selector: &str,
        info: &ElementInfo,
        wanted: &str,
    ) -> Result<FieldStatus, PageError> {
        let target = wanted.trim();
        let Some(option) = info.options.iter().find(|o| o.text.trim() == target) else {
            warn!(
                "No option with text '{}' in custom dropdown {}",
                target, selector
            );
            return Ok(FieldStatus::Unmatched {
                widget: WidgetKind::StaticCustomDropdown,
                wanted: wanted.to_string(),
            });
        };

        page.set_value(selector, &option.value).await?;
        page.dispatch(selector, DomEvent::Change).await?;
        Ok(FieldStatus::Applied {
            widget: WidgetKind::StaticCustomDropdown,
        })
    }

    /// Page in the widget's option list, match `wanted` case-insensitively and
    /// commit the option's id.
    pub async fn resolve_remote<P: Page + ?Sized>(
        &self,
        page: &mut P,
        selector: &str,
        info: &ElementInfo,
        wanted: &str,
    ) -> Result<FieldStatus, PageError> {
        let Some(data_url) = info.attribute("data-url") else {
            return Ok(FieldStatus::Unhandled {
                tag: info.tag.clone(),
            });
        };

        let base = page.url().await?;
        let url = match resolve_data_url(&base, data_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot resolve data-url '{}' of {}: {}", data_url, selector, e);
                return Ok(FieldStatus::Failed {
                    reason: format!("invalid data-url '{}': {}", data_url, e),
                });
            }
        };

        let fetched = fetch_all_options(self.source, url.as_str(), self.config.page_size).await;
        debug!(
            "Loaded {} options for {} (total {:?}, complete: {})",
            fetched.items.len(),
            selector,
            fetched.total,
            fetched.is_complete()
        );

        let Some(option) = fetched.find_by_text(wanted) else {
            warn!(
                "No remote option '{}' for {} among {} loaded",
                wanted,
                selector,
                fetched.items.len()
            );
            return Ok(FieldStatus::Unmatched {
                widget: WidgetKind::RemoteCustomDropdown,
                wanted: wanted.to_string(),
            });
        };

        let id = option.id.to_string();
        info!("Selecting '{}' (id {}) in {}", option.text, id, selector);
        page.commit_widget_value(selector, &id).await?;
        Ok(FieldStatus::Applied {
            widget: WidgetKind::RemoteCustomDropdown,
        })
    }
}

/// Absolute `data-url`s are used as-is; relative ones resolve against the page.
pub fn resolve_data_url(page_url: &str, data_url: &str) -> Result<Url, url::ParseError> {
    match Url::parse(data_url) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(page_url)?.join(data_url),
        Err(e) => Err(e),
    }
}
