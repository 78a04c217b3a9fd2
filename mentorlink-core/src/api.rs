//! JSON envelope shared by the HTTP service and its clients.
//!
//! Success bodies are `{"success": true, ...payload}`; failures are
//! `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::page::{EmptyState, PageState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the caller's user id.
pub const USER_HEADER: &str = "x-user-id";

/// Merge `payload` into a success envelope. Non-object payloads land under
/// `data`.
pub fn ok(payload: Value) -> Value {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    match payload {
        Value::Object(fields) => body.extend(fields),
        Value::Null => {}
        other => {
            body.insert("data".to_string(), other);
        }
    }
    Value::Object(body)
}

pub fn err(msg: impl Into<String>) -> Value {
    json!({ "error": msg.into() })
}

/// Success body for an empty page: the key the page expects, set to an empty
/// list, plus the placeholder to render.
pub fn empty(key: &str, state: &EmptyState) -> Value {
    let mut payload = Map::new();
    payload.insert(key.to_string(), Value::Array(Vec::new()));
    payload.insert("emptyState".to_string(), json!(state));
    ok(Value::Object(payload))
}

/// Render a settled page into its body. `Loading` never reaches the wire.
pub fn page_body<T: Serialize>(key: &str, page: &PageState<T>) -> Value {
    match page {
        PageState::Ready(value) => ok(json!({ key: value })),
        PageState::Empty(state) => empty(key, state),
        PageState::Failed(e) => json!({ "error": e.message, "retryLabel": e.retry_label }),
        PageState::Loading => err("page is still loading"),
    }
}

/// Client-side view of any envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    pub fn into_result(self) -> Result<Map<String, Value>, String> {
        match self.error {
            Some(e) => Err(e),
            None if self.success => Ok(self.payload),
            None => Err("response carried neither success nor error".to_string()),
        }
    }
}
