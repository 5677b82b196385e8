use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used when the extraction service answers without fields or an error.
pub const UNKNOWN_EXTRACTION_ERROR: &str = "Unknown error";

/// Value to write into a control. The extraction service sends strings or booleans;
/// numbers and `null` are accepted so a sloppy response does not sink the whole batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// String form written into value-carrying controls.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Truthiness as a browser would coerce it when assigned to `checked`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            FieldValue::Text(s) => !s.is_empty(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One `(selector, value)` pair telling the applier what to write where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInstruction {
    pub selector: String,
    #[serde(default)]
    pub value: FieldValue,
}

impl FieldInstruction {
    pub fn new(selector: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            selector: selector.into(),
            value: value.into(),
        }
    }
}

/// Ordered instructions plus the service's logical error, if it reported one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldInstructionSet {
    pub fields: Vec<FieldInstruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldInstructionSet {
    pub fn new(fields: Vec<FieldInstruction>) -> Self {
        Self {
            fields,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            fields: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Body of `POST {backend}/process_html`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessHtmlRequest {
    pub html: String,
}

/// Raw response of `POST {backend}/process_html`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessHtmlResponse {
    #[serde(default)]
    pub fields: Option<Vec<FieldInstruction>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessHtmlResponse {
    /// A response without `fields` is a logical failure. Any `fields` list, even
    /// an empty one, wins over an accompanying `error`.
    pub fn into_instruction_set(self) -> FieldInstructionSet {
        match self.fields {
            Some(fields) => FieldInstructionSet::new(fields),
            None => FieldInstructionSet::failed(
                self.error
                    .unwrap_or_else(|| UNKNOWN_EXTRACTION_ERROR.to_string()),
            ),
        }
    }
}

/// Identifier of a remote option. Opaque: numeric or string ids both occur in the wild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    Int(i64),
    Text(String),
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionId::Int(i) => write!(f, "{}", i),
            OptionId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Element of a paginated remote option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOption {
    pub id: OptionId,
    pub text: String,
}

impl RemoteOption {
    pub fn matches_text(&self, wanted: &str) -> bool {
        self.text.to_lowercase() == wanted.to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Response of `GET {data-url}?page=N&per_page=M`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOptionPage {
    #[serde(default)]
    pub items: Vec<RemoteOption>,
    #[serde(default)]
    pub meta: PageMeta,
}
