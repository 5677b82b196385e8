//! Writes extraction results into the live form.
//!
//! Instructions run strictly in order, one at a time: a later field may target
//! something an earlier one caused to appear (a dependent dropdown, say). Each
//! selector is looked up fresh. Failures are recorded per field and never stop
//! the batch.

pub mod classify;
pub mod report;

use crate::config::{DropdownConfig, JobfillConfig, ResumeConfig};
use crate::dropdown::DropdownResolver;
use crate::options::OptionSource;
use crate::page::{Page, PageError};
use crate::remote::FieldSource;
use crate::resume::{FILE_INPUT_SELECTOR, ResumeInjector};
use classify::{WidgetKind, classify};
use jobfill_common::dom::{DomEvent, ElementInfo};
use jobfill_common::protocol::{FieldInstruction, FieldInstructionSet, FieldValue};
use report::{ApplyReport, FieldOutcome, FieldStatus, ResumeOutcome};
use tracing::{debug, info, warn};

pub struct FieldApplier<'a> {
    options: &'a dyn OptionSource,
    resumes: &'a dyn FieldSource,
    dropdown: &'a DropdownConfig,
    resume: &'a ResumeConfig,
}

impl<'a> FieldApplier<'a> {
    pub fn new(
        options: &'a dyn OptionSource,
        resumes: &'a dyn FieldSource,
        config: &'a JobfillConfig,
    ) -> Self {
        Self {
            options,
            resumes,
            dropdown: &config.dropdown,
            resume: &config.resume,
        }
    }

    /// Apply every instruction, then attach the resume if the page has a file input.
    pub async fn apply_fields<P: Page + ?Sized>(
        &self,
        page: &mut P,
        instructions: &FieldInstructionSet,
    ) -> ApplyReport {
        let mut outcomes = Vec::with_capacity(instructions.len());
        for instruction in &instructions.fields {
            outcomes.push(self.apply_one(page, instruction).await);
        }

        let resume = self.attach_resume(page).await;
        let report = ApplyReport { outcomes, resume };
        info!(
            "Applied {}/{} fields ({} missing, {} unmatched, {} unhandled, {} failed)",
            report.applied(),
            report.outcomes.len(),
            report.missing(),
            report.unmatched(),
            report.unhandled(),
            report.failed()
        );
        report
    }

    async fn apply_one<P: Page + ?Sized>(
        &self,
        page: &mut P,
        instruction: &FieldInstruction,
    ) -> FieldOutcome {
        let selector = instruction.selector.as_str();
        let status = match page.describe(selector).await {
            Ok(None) => {
                warn!("Element not found for selector: {}", selector);
                FieldStatus::Missing
            }
            Ok(Some(info)) => {
                let kind = classify(&info, &self.dropdown.marker_class);
                debug!("{} classified as {}", selector, kind);
                match self.write(page, selector, &info, kind, &instruction.value).await {
                    Ok(status) => status,
                    Err(e) => {
                        warn!("Failed to fill {}: {}", selector, e);
                        FieldStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Failed to resolve {}: {}", selector, e);
                FieldStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        FieldOutcome {
            selector: instruction.selector.clone(),
            status,
        }
    }

    async fn write<P: Page + ?Sized>(
        &self,
        page: &mut P,
        selector: &str,
        info: &ElementInfo,
        kind: WidgetKind,
        value: &FieldValue,
    ) -> Result<FieldStatus, PageError> {
        match kind {
            WidgetKind::TextLike | WidgetKind::TextArea => {
                write_text(page, selector, kind, value).await
            }
            WidgetKind::Boolean => write_checked(page, selector, value).await,
            WidgetKind::NativeSelect => write_single_select(page, selector, info, value).await,
            WidgetKind::NativeMultiSelect => {
                write_multi_select(page, selector, info, value).await
            }
            WidgetKind::StaticCustomDropdown => {
                DropdownResolver::new(self.options, self.dropdown)
                    .resolve_static(page, selector, info, &value.as_text())
                    .await
            }
            WidgetKind::RemoteCustomDropdown => {
                DropdownResolver::new(self.options, self.dropdown)
                    .resolve_remote(page, selector, info, &value.as_text())
                    .await
            }
            WidgetKind::Unhandled => {
                warn!("Unhandled element type: {} ({})", info.tag, selector);
                Ok(FieldStatus::Unhandled {
                    tag: info.tag.clone(),
                })
            }
        }
    }

    async fn attach_resume<P: Page + ?Sized>(&self, page: &mut P) -> ResumeOutcome {
        if !self.resume.enabled {
            return ResumeOutcome::Disabled;
        }
        match page.exists(FILE_INPUT_SELECTOR).await {
            Ok(true) => {
                ResumeInjector::new(self.resumes, self.resume)
                    .inject(page, FILE_INPUT_SELECTOR)
                    .await
            }
            Ok(false) => ResumeOutcome::NotPresent,
            Err(e) => {
                warn!("Could not look for a file input: {}", e);
                ResumeOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

async fn write_text<P: Page + ?Sized>(
    page: &mut P,
    selector: &str,
    kind: WidgetKind,
    value: &FieldValue,
) -> Result<FieldStatus, PageError> {
    page.set_value(selector, &value.as_text()).await?;
    page.dispatch(selector, DomEvent::Input).await?;
    Ok(FieldStatus::Applied { widget: kind })
}

async fn write_checked<P: Page + ?Sized>(
    page: &mut P,
    selector: &str,
    value: &FieldValue,
) -> Result<FieldStatus, PageError> {
    page.set_checked(selector, value.is_truthy()).await?;
    page.dispatch(selector, DomEvent::Change).await?;
    Ok(FieldStatus::Applied {
        widget: WidgetKind::Boolean,
    })
}

/// First option, in document order, whose value or text equals the target exactly.
async fn write_single_select<P: Page + ?Sized>(
    page: &mut P,
    selector: &str,
    info: &ElementInfo,
    value: &FieldValue,
) -> Result<FieldStatus, PageError> {
    let wanted = value.as_text();
    let Some(index) = info
        .options
        .iter()
        .position(|o| o.value == wanted || o.text == wanted)
    else {
        warn!("No option matching '{}' in {}", wanted, selector);
        return Ok(FieldStatus::Unmatched {
            widget: WidgetKind::NativeSelect,
            wanted,
        });
    };

    page.set_selected(selector, &[index]).await?;
    page.dispatch(selector, DomEvent::Change).await?;
    Ok(FieldStatus::Applied {
        widget: WidgetKind::NativeSelect,
    })
}

/// Comma-separated tokens; an option is selected when its value or its text
/// equals any token.
async fn write_multi_select<P: Page + ?Sized>(
    page: &mut P,
    selector: &str,
    info: &ElementInfo,
    value: &FieldValue,
) -> Result<FieldStatus, PageError> {
    let wanted = value.as_text();
    let tokens = split_tokens(&wanted);
    let indices: Vec<usize> = info
        .options
        .iter()
        .enumerate()
        .filter(|(_, o)| tokens.iter().any(|t| *t == o.value || *t == o.text))
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        warn!("No options matching '{}' in {}", wanted, selector);
        return Ok(FieldStatus::Unmatched {
            widget: WidgetKind::NativeMultiSelect,
            wanted,
        });
    }

    page.set_selected(selector, &indices).await?;
    page.dispatch(selector, DomEvent::Change).await?;
    Ok(FieldStatus::Applied {
        widget: WidgetKind::NativeMultiSelect,
    })
}

fn split_tokens(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_trimmed_and_blank_ones_dropped() {
        assert_eq!(split_tokens("Alpha, b"), vec!["Alpha", "b"]);
        assert_eq!(split_tokens(" a ,, ,c,"), vec!["a", "c"]);
        assert!(split_tokens("").is_empty());
    }
}
