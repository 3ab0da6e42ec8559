//! Terminal handlers behind the gate.
//!
//! The business layer is out of scope for this crate; these handlers
//! exist so the pipeline has routes to protect.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Liveness probe, reachable anonymously.
pub async fn healthcheck() -> Json<Value> {
    Json(json!({
        "status": "available",
        "system_info": {
            "version": env!("CARGO_PKG_VERSION"),
        },
    }))
}

/// Placeholder listing endpoint, gated on `movies:read`.
pub async fn list_movies() -> Json<Value> {
    Json(json!({ "movies": [] }))
}

/// Placeholder create endpoint, gated on `movies:write`.
pub async fn create_movie() -> (StatusCode, Json<Value>) {
    (StatusCode::ACCEPTED, Json(json!({ "message": "accepted" })))
}
