use axum::Json;
use serde_json::{json, Value};

/// GET /health: liveness probe with the server version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
