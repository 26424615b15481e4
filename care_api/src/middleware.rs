//! Request telemetry middleware.
//!
//! Records request count and latency, charges the cost ledger for clinical
//! operations, and stamps tracing headers on every response.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use care_governance::cost::operation_cost;

use crate::state::AppState;

/// Map a request path to the clinical operation it bills as.
pub fn operation_for_path(path: &str) -> Option<&'static str> {
    if path.contains("/care-gaps") {
        Some("care_gap_detection")
    } else if path.contains("/readmission") {
        Some("readmission_prediction")
    } else if path.contains("/summarize") {
        Some("clinical_summarization")
    } else if path.contains("/batch") {
        Some("batch_prediction")
    } else {
        None
    }
}

pub async fn telemetry(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("care-{}", Uuid::new_v4().simple()));

    let mut response = next.run(req).await;
    let elapsed = started.elapsed().as_secs_f64();

    state
        .metrics
        .record(&method, &path, response.status().as_u16(), elapsed);

    let operation = operation_for_path(&path);
    if let Some(op) = operation {
        if let Err(err) = state.ledger.record(op, 0) {
            tracing::warn!(error = %err, operation = op, "cost_record_failed");
        }
    }

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert("x-request-id", value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.4}s")) {
        headers.insert("x-response-time", value);
    }
    let cost = operation.map(operation_cost).unwrap_or(0.001);
    if let Ok(value) = HeaderValue::from_str(&format!("{cost:.4}")) {
        headers.insert("x-cost-usd", value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_map_to_operations() {
        assert_eq!(
            operation_for_path("/api/v1/care-gaps/patient/P1"),
            Some("care_gap_detection")
        );
        assert_eq!(
            operation_for_path("/api/v1/readmission/predict/batch"),
            Some("readmission_prediction")
        );
        assert_eq!(
            operation_for_path("/api/v1/summarize/patient/P1"),
            Some("clinical_summarization")
        );
        assert_eq!(operation_for_path("/health"), None);
    }
}
