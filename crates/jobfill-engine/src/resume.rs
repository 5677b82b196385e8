use crate::applier::report::ResumeOutcome;
use crate::config::ResumeConfig;
use crate::page::Page;
use crate::remote::FieldSource;
use jobfill_common::dom::{DomEvent, FileUpload};
use tracing::{error, info};

pub const FILE_INPUT_SELECTOR: &str = "input[type=\"file\"]";

/// Downloads the resume and hands it to a file input as a selected file.
pub struct ResumeInjector<'a> {
    source: &'a dyn FieldSource,
    config: &'a ResumeConfig,
}

impl<'a> ResumeInjector<'a> {
    pub fn new(source: &'a dyn FieldSource, config: &'a ResumeConfig) -> Self {
        Self { source, config }
    }

    /// The input is only touched once the download has fully succeeded.
    pub async fn inject<P: Page + ?Sized>(&self, page: &mut P, selector: &str) -> ResumeOutcome {
        let bytes = match self.source.fetch_resume().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Error downloading resume: {}", e);
                return ResumeOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let file = FileUpload::new(&self.config.file_name, &self.config.content_type, bytes);
        let size = file.len();

        if let Err(e) = page.set_files(selector, &file).await {
            error!("Error attaching resume to {}: {}", selector, e);
            return ResumeOutcome::Failed {
                reason: e.to_string(),
            };
        }
        if let Err(e) = page.dispatch(selector, DomEvent::Change).await {
            error!("Error notifying {} of the upload: {}", selector, e);
            return ResumeOutcome::Failed {
                reason: e.to_string(),
            };
        }

        info!("Attached {} ({} bytes) to {}", file.name, size, selector);
        ResumeOutcome::Attached { bytes: size }
    }
}
