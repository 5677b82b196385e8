//! End-to-end flow for one page:
//! classify site -> capture HTML -> extract fields -> apply -> attach resume.

use crate::applier::FieldApplier;
use crate::applier::report::ApplyReport;
use crate::config::JobfillConfig;
use crate::options::{HttpOptionSource, OptionSource};
use crate::page::{Page, PageError};
use crate::remote::{FieldSource, HttpFieldSource};
use jobfill_common::protocol::FieldInstructionSet;
use jobfill_common::site::SiteClassifier;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AutofillError {
    #[error("Invalid site pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Page error: {0}")]
    Page(#[from] PageError),
}

/// Result of the site check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCheck {
    pub hostname: String,
    /// Pattern that accepted the page.
    pub matched: Option<String>,
}

impl SiteCheck {
    pub fn is_recruiting(&self) -> bool {
        self.matched.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    NotRecruitingSite { hostname: String },
    /// The service returned an error, or could not be reached. Nothing was written.
    ExtractionFailed { reason: String },
    Applied { report: ApplyReport },
}

pub struct Autofill<F, O> {
    config: JobfillConfig,
    classifier: SiteClassifier,
    fields: F,
    options: O,
}

impl Autofill<HttpFieldSource, HttpOptionSource> {
    /// HTTP-backed sources pointed at `config.backend`.
    pub fn from_config(config: JobfillConfig) -> Result<Self, AutofillError> {
        let client = reqwest::Client::new();
        let fields = HttpFieldSource::with_client(client.clone(), &config.backend);
        let options = HttpOptionSource::with_client(client);
        Self::new(config, fields, options)
    }
}

impl<F: FieldSource, O: OptionSource> Autofill<F, O> {
    pub fn new(config: JobfillConfig, fields: F, options: O) -> Result<Self, AutofillError> {
        let classifier = SiteClassifier::new(&config.sites.patterns)?;
        Ok(Self {
            config,
            classifier,
            fields,
            options,
        })
    }

    pub fn config(&self) -> &JobfillConfig {
        &self.config
    }

    pub fn classifier(&self) -> &SiteClassifier {
        &self.classifier
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub async fn check<P: Page + ?Sized>(&self, page: &P) -> Result<SiteCheck, PageError> {
        let hostname = page.hostname().await?;
        let iframes = page.iframe_sources().await?;
        let matched = self
            .classifier
            .matching_pattern(&hostname, &iframes)
            .map(String::from);
        Ok(SiteCheck { hostname, matched })
    }

    /// Offer the trigger button on every page of this tab the classifier accepts.
    pub async fn install_trigger<P: Page + ?Sized>(&self, page: &mut P) -> Result<(), PageError> {
        let patterns: Vec<String> = self.classifier.patterns().map(String::from).collect();
        page.install_trigger(&self.config.trigger.label, &patterns).await
    }

    /// Run the whole flow. Only page read failures are errors; an unreachable
    /// or failing backend yields `ExtractionFailed` and leaves the page alone.
    pub async fn run<P: Page + ?Sized>(&self, page: &mut P) -> Result<RunOutcome, AutofillError> {
        if self.config.sites.require_match {
            let site = self.check(page).await?;
            if !site.is_recruiting() {
                info!("{} is not a recognised recruiting site", site.hostname);
                return Ok(RunOutcome::NotRecruitingSite {
                    hostname: site.hostname,
                });
            }
        }

        let html = page.outer_html().await?;
        let instructions = match self.fields.submit_page(&html).await {
            Ok(set) => set,
            Err(e) => {
                error!("Error communicating with backend: {}", e);
                return Ok(RunOutcome::ExtractionFailed {
                    reason: e.to_string(),
                });
            }
        };

        if instructions.is_empty()
            && let Some(reason) = &instructions.error
        {
            error!("Error in response: {}", reason);
            return Ok(RunOutcome::ExtractionFailed {
                reason: reason.clone(),
            });
        }

        info!("Received {} fields to fill", instructions.len());
        let report = self.apply(page, &instructions).await;
        Ok(RunOutcome::Applied { report })
    }

    /// Apply an instruction set that was obtained elsewhere.
    pub async fn apply<P: Page + ?Sized>(
        &self,
        page: &mut P,
        instructions: &FieldInstructionSet,
    ) -> ApplyReport {
        FieldApplier::new(&self.options, &self.fields, &self.config)
            .apply_fields(page, instructions)
            .await
    }
}
