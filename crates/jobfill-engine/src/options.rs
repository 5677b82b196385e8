//! Paginated option lists behind remote-backed dropdowns.

use crate::remote::SourceError;
use async_trait::async_trait;
use jobfill_common::protocol::{RemoteOption, RemoteOptionPage};
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetch one 1-indexed page of `per_page` options from `url`.
    async fn fetch_page(
        &self,
        url: &str,
        page: u32,
        per_page: u32,
    ) -> Result<RemoteOptionPage, SourceError>;
}

pub struct HttpOptionSource {
    client: reqwest::Client,
}

impl HttpOptionSource {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpOptionSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Append `page` and `per_page` to whatever query string `url` already has.
pub fn page_url(url: &str, page: u32, per_page: u32) -> Result<Url, SourceError> {
    let mut url = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("per_page", &per_page.to_string());
    Ok(url)
}

#[async_trait]
impl OptionSource for HttpOptionSource {
    async fn fetch_page(
        &self,
        url: &str,
        page: u32,
        per_page: u32,
    ) -> Result<RemoteOptionPage, SourceError> {
        let target = page_url(url, page, per_page)?;
        let response = self.client.get(target.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Everything a pagination run managed to collect.
#[derive(Debug, Clone, Default)]
pub struct FetchedOptions {
    pub items: Vec<RemoteOption>,
    /// `meta.total_count` of the first page.
    pub total: Option<u64>,
    /// Set when a request failed and the list is truncated.
    pub error: Option<String>,
}

impl FetchedOptions {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn find_by_text(&self, wanted: &str) -> Option<&RemoteOption> {
        self.items.iter().find(|o| o.matches_text(wanted))
    }
}

/// Walk pages 1..N until the first page's `total_count` is reached.
///
/// Never fails: a request error ends the walk and the items gathered so far are
/// returned with `error` set. A page with no items also ends it, and a first
/// page without `total_count` is taken to be the whole list.
pub async fn fetch_all_options<S: OptionSource + ?Sized>(
    source: &S,
    url: &str,
    per_page: u32,
) -> FetchedOptions {
    let mut fetched = FetchedOptions::default();
    let mut page = 1;

    loop {
        match source.fetch_page(url, page, per_page).await {
            Ok(resp) => {
                if page == 1 {
                    fetched.total = resp.meta.total_count;
                }
                let received = resp.items.len();
                fetched.items.extend(resp.items);
                debug!(
                    "Fetched page {} of {} ({} items, {} so far)",
                    page,
                    url,
                    received,
                    fetched.items.len()
                );

                let Some(total) = fetched.total else {
                    break;
                };
                if received == 0 || fetched.items.len() as u64 >= total {
                    break;
                }
                page += 1;
            }
            Err(e) => {
                warn!(
                    "Fetching page {} of {} failed, keeping {} items: {}",
                    page,
                    url,
                    fetched.items.len(),
                    e
                );
                fetched.error = Some(e.to_string());
                break;
            }
        }
    }

    fetched
}
