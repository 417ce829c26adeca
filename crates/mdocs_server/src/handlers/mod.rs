//! HTTP request handlers.

/// Document tree endpoints.
pub mod doc;
/// Settings endpoints.
pub mod settings;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe reporting the server version.
pub async fn check() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}
