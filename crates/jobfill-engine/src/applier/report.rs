use super::classify::WidgetKind;
use serde::Serialize;

/// What happened to a single instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStatus {
    Applied { widget: WidgetKind },
    /// Selector matched nothing.
    Missing,
    /// No option corresponds to the requested value; the control was left as it was.
    Unmatched { widget: WidgetKind, wanted: String },
    Unhandled { tag: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOutcome {
    pub selector: String,
    #[serde(flatten)]
    pub status: FieldStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResumeOutcome {
    /// The page has no file input.
    NotPresent,
    Disabled,
    Attached { bytes: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<FieldOutcome>,
    pub resume: ResumeOutcome,
}

impl ApplyReport {
    fn count(&self, pred: impl Fn(&FieldStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Applied { .. }))
    }

    pub fn missing(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Missing))
    }

    pub fn unmatched(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Unmatched { .. }))
    }

    pub fn unhandled(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Unhandled { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Failed { .. }))
    }

    /// Instructions that did not end in `Applied`.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    pub fn status_of(&self, selector: &str) -> Option<&FieldStatus> {
        self.outcomes
            .iter()
            .find(|o| o.selector == selector)
            .map(|o| &o.status)
    }
}
