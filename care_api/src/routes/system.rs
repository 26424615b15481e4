//! Platform, health, and metrics endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};

use crate::state::AppState;
use crate::{PLATFORM_NAME, PLATFORM_VERSION};

pub async fn root() -> Json<JsonValue> {
    Json(json!({
        "name": PLATFORM_NAME,
        "version": PLATFORM_VERSION,
        "description": "End-to-end healthcare AI demonstration platform",
        "clinical_use_cases": [
            { "name": "Care Gap Detection", "endpoint": "/api/v1/care-gaps" },
            { "name": "Readmission Risk", "endpoint": "/api/v1/readmission" },
            { "name": "Clinical Summarization", "endpoint": "/api/v1/summarize" },
        ],
        "governance": {
            "hipaa_compliant": true,
            "phi_detection": true,
            "audit_logging": true,
            "cost_telemetry": true,
        },
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<JsonValue> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": PLATFORM_VERSION,
        "started_at": state.started_at,
        "components": {
            "api": "healthy",
            "audit_log": if state.audit.verify().map(|v| v.verified).unwrap_or(false) {
                "healthy"
            } else {
                "degraded"
            },
        },
    }))
}

pub async fn ready() -> Json<JsonValue> {
    Json(json!({ "status": "ready", "timestamp": Utc::now() }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
