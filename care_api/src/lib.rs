//! CareBridge gateway.
//!
//! One axum service carrying the three clinical endpoints plus the system and
//! governance surface. Shared state (audit chain, phase gates, cost ledger,
//! request metrics) is injected through the router.

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

pub const PLATFORM_NAME: &str = "CareBridge Clinical AI Gateway";
pub const PLATFORM_VERSION: &str = "1.0.0";

/// Build the full gateway router over the given state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let care_gaps = Router::new()
        .route("/patient/{patient_id}", get(routes::care_gaps::detect))
        .route(
            "/patient/{patient_id}/close/{gap_id}",
            post(routes::care_gaps::close_gap),
        )
        .route("/cohort", post(routes::care_gaps::analyze_cohort))
        .route("/guidelines", get(routes::care_gaps::list_guidelines))
        .route("/metrics", get(routes::care_gaps::service_metrics));

    let readmission = Router::new()
        .route("/predict/{patient_id}", get(routes::readmission::predict))
        .route("/predict/batch", post(routes::readmission::predict_batch))
        .route("/model/info", get(routes::readmission::model_info))
        .route("/model/features", get(routes::readmission::model_features))
        .route("/interventions", get(routes::readmission::list_interventions))
        .route("/metrics", get(routes::readmission::service_metrics));

    let summarize = Router::new()
        .route("/patient/{patient_id}", get(routes::summarize::patient))
        .route("/custom", post(routes::summarize::custom))
        .route(
            "/problem/{patient_id}/{problem_code}",
            get(routes::summarize::problem),
        )
        .route(
            "/care-transition/{patient_id}/{encounter_id}",
            get(routes::summarize::transition),
        )
        .route("/rag/info", get(routes::summarize::rag_info))
        .route("/llm-controls", get(routes::summarize::llm_controls))
        .route("/metrics", get(routes::summarize::service_metrics));

    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .route("/ready", get(routes::system::ready))
        .route("/metrics", get(routes::system::metrics))
        .route(
            "/governance/phase-status",
            get(routes::governance::phase_status),
        )
        .route(
            "/governance/cost-telemetry",
            get(routes::governance::cost_telemetry),
        )
        .route(
            "/governance/audit-log",
            get(routes::governance::audit_log),
        )
        .route(
            "/governance/audit-summary",
            get(routes::governance::audit_summary),
        )
        .route(
            "/governance/audit/verify",
            get(routes::governance::audit_verify),
        )
        .nest("/api/v1/care-gaps", care_gaps)
        .nest("/api/v1/readmission", readmission)
        .nest("/api/v1/summarize", summarize)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::telemetry,
        ))
        .layer(cors)
        .with_state(state)
}
