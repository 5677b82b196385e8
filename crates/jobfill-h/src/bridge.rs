//! Calls into `bridge.js`, the page-side half of `HeadlessPage`.

use chromiumoxide::Page;
use jobfill_engine::page::PageError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const BRIDGE_JS: &str = include_str!("bridge.js");

/// Bounds every evaluation; a modal dialog blocks the JS thread.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries while the page is navigating and has no execution context.
const MAX_CONTEXT_RETRIES: u32 = 10;

const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

/// What every bridge op returns.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl Envelope {
    fn into_result(self, op: &str, selector: &str) -> Result<Value, PageError> {
        if self.ok {
            return Ok(self.data);
        }
        let message = self.message.unwrap_or_default();
        Err(match self.reason.as_deref() {
            Some("not_found") => PageError::ElementNotFound(selector.to_string()),
            Some("invalid_selector") => PageError::InvalidSelector {
                selector: selector.to_string(),
                reason: message,
            },
            Some("unsupported") => PageError::UnsupportedElement {
                selector: selector.to_string(),
                operation: message,
            },
            Some("widget_unavailable") => PageError::WidgetUnavailable(selector.to_string()),
            Some("unknown_op") => PageError::NotSupported(message),
            _ => PageError::Script(format!("{}: {}", op, message)),
        })
    }
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_with_timeout(page: &Page, expression: &str) -> Result<Value, EvalError> {
    match tokio::time::timeout(EVAL_TIMEOUT, page.evaluate_expression(expression)).await {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        Ok(Ok(result)) => Ok(result.into_value::<Value>().unwrap_or(Value::Null)),
    }
}

/// Evaluate `expression`, waiting out navigations.
async fn evaluate(page: &Page, expression: &str) -> Result<Value, PageError> {
    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_with_timeout(page, expression).await {
            Ok(value) => return Ok(value),
            Err(EvalError::Timeout) => {
                return Err(PageError::Script(
                    "evaluation timed out, possibly blocked by a dialog".into(),
                ));
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => return Err(PageError::Script(err_str)),
        }
    }

    Err(PageError::Script(last_error.unwrap_or_else(|| {
        "evaluation failed after retries".to_string()
    })))
}

/// Load the bridge into the current document unless it is already there.
pub async fn inject_bridge(page: &Page) -> Result<(), PageError> {
    let loaded = evaluate(page, "typeof window.__jobfill !== 'undefined'").await?;
    if loaded != Value::Bool(true) {
        evaluate(page, BRIDGE_JS).await?;
    }
    Ok(())
}

/// Run one bridge op and return its payload.
pub async fn call(page: &Page, op: &str, args: Value) -> Result<Value, PageError> {
    let expression = format!(
        "window.__jobfill.call({}, {})",
        serde_json::to_string(op)?,
        serde_json::to_string(&args)?
    );
    tracing::trace!("Bridge call: {}", op);

    // The bridge disappears on navigation, so check for it on every call.
    inject_bridge(page).await?;
    let raw = evaluate(page, &expression).await?;
    let envelope: Envelope = serde_json::from_value(raw)?;
    let selector = args.get("selector").and_then(Value::as_str).unwrap_or(op);
    envelope.into_result(op, selector)
}

pub async fn call_as<T: DeserializeOwned>(
    page: &Page,
    op: &str,
    args: Value,
) -> Result<T, PageError> {
    Ok(serde_json::from_value(call(page, op, args).await?)?)
}
