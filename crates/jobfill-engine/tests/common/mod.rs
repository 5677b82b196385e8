#![allow(dead_code)]

use async_trait::async_trait;
use jobfill_engine::options::OptionSource;
use jobfill_engine::protocol::{
    FieldInstructionSet, OptionId, PageMeta, RemoteOption, RemoteOptionPage,
};
use jobfill_engine::remote::{FieldSource, SourceError};
use std::collections::HashSet;
use std::sync::Mutex;

/// Field source returning canned responses and counting calls.
#[derive(Default)]
pub struct MockFieldSource {
    pub instructions: Option<FieldInstructionSet>,
    pub resume: Option<Vec<u8>>,
    pub submitted: Mutex<Vec<String>>,
    pub resume_calls: Mutex<usize>,
}

impl MockFieldSource {
    pub fn with_resume(bytes: &[u8]) -> Self {
        Self {
            resume: Some(bytes.to_vec()),
            ..Default::default()
        }
    }

    pub fn resume_calls(&self) -> usize {
        *self.resume_calls.lock().unwrap()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FieldSource for MockFieldSource {
    async fn submit_page(&self, html: &str) -> Result<FieldInstructionSet, SourceError> {
        self.submitted.lock().unwrap().push(html.to_string());
        self.instructions
            .clone()
            .ok_or_else(|| SourceError::Other("connection refused".into()))
    }

    async fn fetch_resume(&self) -> Result<Vec<u8>, SourceError> {
        *self.resume_calls.lock().unwrap() += 1;
        self.resume
            .clone()
            .ok_or_else(|| SourceError::Other("resume store offline".into()))
    }
}

/// Paginated option list held in memory, with pages that can be made to fail.
pub struct MockOptionSource {
    pub items: Vec<RemoteOption>,
    pub failing_pages: HashSet<u32>,
    pub requests: Mutex<Vec<(String, u32, u32)>>,
}

impl MockOptionSource {
    pub fn new(items: Vec<RemoteOption>) -> Self {
        Self {
            items,
            failing_pages: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `count` options named "Option 1".."Option N" with ids 1..N.
    pub fn numbered(count: usize) -> Self {
        Self::new(
            (1..=count)
                .map(|i| RemoteOption {
                    id: OptionId::Int(i as i64),
                    text: format!("Option {}", i),
                })
                .collect(),
        )
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|r| r.1).collect()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.0.clone())
            .collect()
    }
}

#[async_trait]
impl OptionSource for MockOptionSource {
    async fn fetch_page(
        &self,
        url: &str,
        page: u32,
        per_page: u32,
    ) -> Result<RemoteOptionPage, SourceError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), page, per_page));

        if self.failing_pages.contains(&page) {
            return Err(SourceError::Status {
                status: 502,
                url: url.to_string(),
            });
        }

        let start = ((page - 1) * per_page) as usize;
        let items = self
            .items
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(RemoteOptionPage {
            items,
            meta: PageMeta {
                total_count: Some(self.items.len() as u64),
            },
        })
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}
