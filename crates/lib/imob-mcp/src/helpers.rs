use imob_core::fields::Record;
use serde_json::{Value, json};

/// Canned reply for every tool while the backend URL or key is missing.
pub const NOT_CONFIGURED: &str =
    "Backend não configurado (BACKEND_API_URL e BACKEND_INTERNAL_KEY).";

pub const DEFAULT_TENANT_ID: i64 = 1;
pub const DEFAULT_LIST_LIMIT: i64 = 15;
pub const MAX_LIST_LIMIT: i64 = 30;

pub const fn default_tenant_id() -> i64 {
    DEFAULT_TENANT_ID
}

pub const fn default_list_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

/// Requested page size, kept within `1..=MAX_LIST_LIMIT`.
pub fn list_limit(requested: i64) -> i64 {
    requested.clamp(1, MAX_LIST_LIMIT)
}

/// Base parameter map shared by every backend call.
pub fn tenant_params(tenant_id: i64) -> Record {
    let mut params = Record::new();
    params.insert("tenant_id".to_string(), json!(tenant_id));
    params
}

/// Trimmed, non-empty text input.
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Object entries of a backend list; anything else is skipped.
pub fn records(items: &[Value]) -> Vec<&Record> {
    items.iter().filter_map(Value::as_object).collect()
}

/// `{heading} ({n}):` followed by one line per entry.
pub fn counted_list(heading: &str, lines: &[String]) -> String {
    format!("{heading} ({}):\n{}", lines.len(), lines.join("\n"))
}
