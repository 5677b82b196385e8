//! In-memory `Page` over an HTML snapshot.
//!
//! Markup is parsed once with `scraper`; selector queries run against that tree
//! and writes land in a side table keyed by element, so reads reflect every
//! mutation made so far. Dispatched events and widget commits are recorded.
//! `outer_html` returns the original snapshot.

use crate::page::{Page, PageError};
use async_trait::async_trait;
use jobfill_common::dom::{DomEvent, ElementInfo, FileUpload, OptionInfo};
use jobfill_common::site::SiteClassifier;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static ALL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());
static OPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());
static IFRAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("iframe[src]").unwrap());

#[derive(Debug, Clone, Default)]
struct ControlState {
    value: Option<String>,
    checked: Option<bool>,
    selected: Option<Vec<bool>>,
    files: Vec<FileUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub selector: String,
    pub event: DomEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCommit {
    pub selector: String,
    pub value: String,
}

pub struct MemoryPage {
    url: String,
    html: Html,
    controls: HashMap<usize, ControlState>,
    events: Vec<RecordedEvent>,
    widget_commits: Vec<WidgetCommit>,
    widget_api: bool,
    trigger: Option<String>,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            html: Html::parse_document(html),
            controls: HashMap::new(),
            events: Vec::new(),
            widget_commits: Vec::new(),
            widget_api: true,
            trigger: None,
        }
    }

    /// Behave like a page where the dropdown widget library never loaded.
    pub fn without_widget_api(mut self) -> Self {
        self.widget_api = false;
        self
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn events_for(&self, selector: &str) -> Vec<DomEvent> {
        self.events
            .iter()
            .filter(|e| e.selector == selector)
            .map(|e| e.event)
            .collect()
    }

    pub fn widget_commits(&self) -> &[WidgetCommit] {
        &self.widget_commits
    }

    pub fn trigger_label(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    pub fn element(&self, selector: &str) -> Option<ElementInfo> {
        self.lookup(selector).ok().flatten().map(|(_, info)| info)
    }

    pub fn value(&self, selector: &str) -> Option<String> {
        self.element(selector).and_then(|info| info.value)
    }

    pub fn is_checked(&self, selector: &str) -> Option<bool> {
        self.element(selector).and_then(|info| info.checked)
    }

    pub fn selected_values(&self, selector: &str) -> Vec<String> {
        self.element(selector)
            .map(|info| {
                info.selected_values()
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn files(&self, selector: &str) -> Vec<FileUpload> {
        self.lookup(selector)
            .ok()
            .flatten()
            .and_then(|(key, _)| self.controls.get(&key))
            .map(|state| state.files.clone())
            .unwrap_or_default()
    }

    fn resolve(&self, selector: &str) -> Result<Option<ElementRef<'_>>, PageError> {
        let parsed = Selector::parse(selector).map_err(|e| PageError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.html.select(&parsed).next())
    }

    /// Document-order position, stable for the life of the snapshot.
    fn key_of(&self, el: ElementRef<'_>) -> usize {
        self.html
            .select(&ALL)
            .position(|e| e.id() == el.id())
            .unwrap_or(usize::MAX)
    }

    fn lookup(&self, selector: &str) -> Result<Option<(usize, ElementInfo)>, PageError> {
        Ok(self.resolve(selector)?.map(|el| {
            let key = self.key_of(el);
            (key, self.info_of(key, el))
        }))
    }

    fn require(&self, selector: &str) -> Result<(usize, ElementInfo), PageError> {
        self.lookup(selector)?
            .ok_or_else(|| PageError::ElementNotFound(selector.to_string()))
    }

    fn info_of(&self, key: usize, el: ElementRef<'_>) -> ElementInfo {
        let state = self.controls.get(&key);
        let node = el.value();
        let tag = node.name().to_ascii_lowercase();
        let multiple = node.attr("multiple").is_some();

        let mut options = Vec::new();
        if tag == "select" {
            options = el
                .select(&OPTION)
                .map(|o| {
                    let text = collapse_whitespace(&o.text().collect::<String>());
                    OptionInfo {
                        value: o
                            .value()
                            .attr("value")
                            .map(String::from)
                            .unwrap_or_else(|| text.clone()),
                        text,
                        selected: o.value().attr("selected").is_some(),
                    }
                })
                .collect::<Vec<_>>();

            if let Some(selected) = state.and_then(|s| s.selected.as_ref()) {
                for (option, flag) in options.iter_mut().zip(selected) {
                    option.selected = *flag;
                }
            } else if !multiple
                && !options.iter().any(|o| o.selected)
                && let Some(first) = options.first_mut()
            {
                first.selected = true;
            }
        }

        let stored = state.and_then(|s| s.value.clone());
        let value = match tag.as_str() {
            "select" => Some(
                options
                    .iter()
                    .find(|o| o.selected)
                    .map(|o| o.value.clone())
                    .unwrap_or_default(),
            ),
            "textarea" => Some(stored.unwrap_or_else(|| el.text().collect())),
            "input" => Some(
                stored
                    .or_else(|| node.attr("value").map(String::from))
                    .unwrap_or_default(),
            ),
            _ => stored,
        };

        let checked = (tag == "input").then(|| {
            state
                .and_then(|s| s.checked)
                .unwrap_or_else(|| node.attr("checked").is_some())
        });

        ElementInfo {
            input_type: node.attr("type").map(|t| t.to_ascii_lowercase()),
            classes: node.classes().map(String::from).collect(),
            attributes: node
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            multiple,
            value,
            checked,
            options,
            tag,
        }
    }

    /// Keys of the other radios sharing `name` with the radio at `key`.
    fn radio_group(&self, key: usize, name: &str) -> Vec<usize> {
        self.html
            .select(&ALL)
            .enumerate()
            .filter(|(i, el)| {
                let node = el.value();
                *i != key
                    && node.name().eq_ignore_ascii_case("input")
                    && node
                        .attr("type")
                        .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
                    && node.attr("name") == Some(name)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn unsupported(selector: &str, operation: &str) -> PageError {
        PageError::UnsupportedElement {
            selector: selector.to_string(),
            operation: operation.to_string(),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait(?Send)]
impl Page for MemoryPage {
    async fn url(&self) -> Result<String, PageError> {
        Ok(self.url.clone())
    }

    async fn hostname(&self) -> Result<String, PageError> {
        let url = Url::parse(&self.url).map_err(|e| PageError::Other(e.to_string()))?;
        Ok(url.host_str().unwrap_or_default().to_string())
    }

    async fn outer_html(&self) -> Result<String, PageError> {
        Ok(self.html.root_element().html())
    }

    async fn iframe_sources(&self) -> Result<Vec<String>, PageError> {
        Ok(self
            .html
            .select(&IFRAME)
            .filter_map(|el| el.value().attr("src").map(String::from))
            .collect())
    }

    async fn describe(&self, selector: &str) -> Result<Option<ElementInfo>, PageError> {
        Ok(self.lookup(selector)?.map(|(_, info)| info))
    }

    async fn set_value(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        let (key, info) = self.require(selector)?;
        let state = self.controls.entry(key).or_default();
        if info.is_tag("select") {
            // Like HTMLSelectElement.value: first option with that value, or none.
            let mut found = false;
            state.selected = Some(
                info.options
                    .iter()
                    .map(|o| {
                        let hit = !found && o.value == value;
                        found |= hit;
                        hit
                    })
                    .collect(),
            );
        } else {
            state.value = Some(value.to_string());
        }
        Ok(())
    }

    async fn set_checked(&mut self, selector: &str, checked: bool) -> Result<(), PageError> {
        let (key, info) = self.require(selector)?;
        if !info.is_tag("input") {
            return Err(Self::unsupported(selector, "checked"));
        }

        if checked
            && info.input_type.as_deref() == Some("radio")
            && let Some(name) = info.attribute("name")
        {
            for other in self.radio_group(key, name) {
                self.controls.entry(other).or_default().checked = Some(false);
            }
        }
        self.controls.entry(key).or_default().checked = Some(checked);
        Ok(())
    }

    async fn set_selected(&mut self, selector: &str, indices: &[usize]) -> Result<(), PageError> {
        let (key, info) = self.require(selector)?;
        if !info.is_tag("select") {
            return Err(Self::unsupported(selector, "option selection"));
        }
        if let Some(bad) = indices.iter().find(|i| **i >= info.options.len()) {
            return Err(PageError::Other(format!(
                "option index {} out of range for {}",
                bad, selector
            )));
        }

        let flags = (0..info.options.len())
            .map(|i| indices.contains(&i))
            .collect();
        self.controls.entry(key).or_default().selected = Some(flags);
        Ok(())
    }

    async fn set_files(&mut self, selector: &str, file: &FileUpload) -> Result<(), PageError> {
        let (key, info) = self.require(selector)?;
        if !info.is_tag("input") || info.input_type.as_deref() != Some("file") {
            return Err(Self::unsupported(selector, "files"));
        }
        self.controls.entry(key).or_default().files = vec![file.clone()];
        Ok(())
    }

    async fn dispatch(&mut self, selector: &str, event: DomEvent) -> Result<(), PageError> {
        self.require(selector)?;
        self.events.push(RecordedEvent {
            selector: selector.to_string(),
            event,
        });
        Ok(())
    }

    async fn commit_widget_value(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        if !self.widget_api {
            return Err(PageError::WidgetUnavailable(selector.to_string()));
        }
        let (key, _) = self.require(selector)?;
        self.controls.entry(key).or_default().value = Some(value.to_string());
        self.widget_commits.push(WidgetCommit {
            selector: selector.to_string(),
            value: value.to_string(),
        });
        self.events.push(RecordedEvent {
            selector: selector.to_string(),
            event: DomEvent::Change,
        });
        Ok(())
    }

    async fn install_trigger(
        &mut self,
        label: &str,
        site_patterns: &[String],
    ) -> Result<(), PageError> {
        let classifier = SiteClassifier::new(site_patterns)
            .map_err(|e| PageError::Other(format!("Invalid site pattern: {}", e)))?;
        let hostname = self.hostname().await?;
        let iframes = self.iframe_sources().await?;
        if classifier.is_recruiting_site(&hostname, &iframes) {
            self.trigger = Some(label.to_string());
        }
        Ok(())
    }
}
