//! Liveness probe.

use axum::Json;
use serde_json::{json, Value};

/// GET /health - returns 200 as soon as the server accepts connections.
///
/// Neither the cache nor the storage backend is consulted.
#[axum::debug_handler]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
