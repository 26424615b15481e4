//! Shared gateway state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use care_governance::audit::AuditLog;
use care_governance::cost::CostLedger;
use care_governance::phase_gates::PhaseGateRegistry;

use crate::metrics::RequestMetrics;

#[derive(Clone)]
pub struct AppState {
    pub audit: Arc<AuditLog>,
    pub gates: Arc<PhaseGateRegistry>,
    pub ledger: Arc<CostLedger>,
    pub metrics: Arc<RequestMetrics>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            audit: Arc::new(AuditLog::new()),
            gates: Arc::new(PhaseGateRegistry::new()),
            ledger: Arc::new(CostLedger::new()),
            metrics: Arc::new(RequestMetrics::new()),
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
