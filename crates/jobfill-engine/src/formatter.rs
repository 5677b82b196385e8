use crate::applier::report::{ApplyReport, FieldStatus, ResumeOutcome};
use crate::autofill::{RunOutcome, SiteCheck};

pub fn format_site_check(check: &SiteCheck) -> String {
    match &check.matched {
        Some(pattern) => format!(
            "{}: recruiting site (matched /{}/)",
            check.hostname, pattern
        ),
        None => format!("{}: not a recruiting site", check.hostname),
    }
}

pub fn format_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::NotRecruitingSite { hostname } => {
            format!("Skipped: {} is not a recruiting site", hostname)
        }
        RunOutcome::ExtractionFailed { reason } => format!("Extraction failed: {}", reason),
        RunOutcome::Applied { report } => format_report(report),
    }
}

pub fn format_report(report: &ApplyReport) -> String {
    let mut output = format!(
        "Filled {} of {} fields.",
        report.applied(),
        report.outcomes.len()
    );

    for outcome in &report.outcomes {
        let line = match &outcome.status {
            FieldStatus::Applied { widget } => format!("ok        {} ({})", outcome.selector, widget),
            FieldStatus::Missing => format!("missing   {}", outcome.selector),
            FieldStatus::Unmatched { widget, wanted } => format!(
                "unmatched {} ({}): no option '{}'",
                outcome.selector, widget, wanted
            ),
            FieldStatus::Unhandled { tag } => {
                format!("unhandled {} (<{}>)", outcome.selector, tag)
            }
            FieldStatus::Failed { reason } => format!("failed    {}: {}", outcome.selector, reason),
        };
        output.push_str("\n- ");
        output.push_str(&line);
    }

    let resume = match &report.resume {
        ResumeOutcome::NotPresent => "no file input on page".to_string(),
        ResumeOutcome::Disabled => "disabled".to_string(),
        ResumeOutcome::Attached { bytes } => format!("attached ({} bytes)", bytes),
        ResumeOutcome::Failed { reason } => format!("failed: {}", reason),
    };
    output.push_str(&format!("\nResume: {}", resume));
    output
}
