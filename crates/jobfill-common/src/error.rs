use thiserror::Error;

/// Errors surfaced by a `Page` implementation.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element '{selector}' does not support {operation}")]
    UnsupportedElement { selector: String, operation: String },

    #[error("Widget API unavailable for '{0}'")]
    WidgetUnavailable(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not ready")]
    NotReady,

    #[error("Script error: {0}")]
    Script(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other: {0}")]
    Other(String),
}
