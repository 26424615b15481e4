//! Summarization request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use care_governance::audit::AuditTrail;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    Comprehensive,
    ProblemFocused,
    Medication,
    LabTrend,
    CareTransition,
}

impl SummaryType {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryType::Comprehensive => "comprehensive",
            SummaryType::ProblemFocused => "problem_focused",
            SummaryType::Medication => "medication",
            SummaryType::LabTrend => "lab_trend",
            SummaryType::CareTransition => "care_transition",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    LastVisit,
    LastMonth,
    #[serde(rename = "last_3_months")]
    Last3Months,
    #[serde(rename = "last_6_months")]
    Last6Months,
    LastYear,
    AllTime,
}

impl TimeRange {
    /// Width of the retrieval window in days.
    pub fn days(self) -> i64 {
        match self {
            TimeRange::LastVisit => 1,
            TimeRange::LastMonth => 30,
            TimeRange::Last3Months => 90,
            TimeRange::Last6Months => 180,
            TimeRange::LastYear => 365,
            TimeRange::AllTime => 365 * 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::LastVisit => "last_visit",
            TimeRange::LastMonth => "last_month",
            TimeRange::Last3Months => "last_3_months",
            TimeRange::Last6Months => "last_6_months",
            TimeRange::LastYear => "last_year",
            TimeRange::AllTime => "all_time",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub source_id: String,
    pub source_type: String,
    pub source_date: DateTime<Utc>,
    pub relevance_score: f64,
    pub snippet: String,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFinding {
    pub finding: String,
    pub category: String,
    pub severity: Option<String>,
    /// improving, stable, or worsening.
    pub trend: Option<String>,
    pub citations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhiAudit {
    pub scan_performed: bool,
    pub phi_detected: bool,
    pub phi_types_found: Vec<String>,
    pub redaction_applied: bool,
    pub audit_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagMetrics {
    pub documents_retrieved: usize,
    pub documents_used: usize,
    pub average_relevance: f64,
    pub context_tokens: u64,
    pub generation_tokens: u64,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentLab {
    pub name: String,
    pub value: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalSummary {
    pub patient_id: String,
    pub summary_type: SummaryType,
    pub time_range: String,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub key_findings: Vec<KeyFinding>,
    pub active_problems: Vec<String>,
    pub current_medications: Vec<String>,
    pub recent_labs: Vec<RecentLab>,
    pub citations: Vec<Citation>,
    pub phi_audit: PhiAudit,
    pub rag_metrics: RagMetrics,
    pub model_info: serde_json::Value,
    pub audit_trail: AuditTrail,
}

/// Knobs for a summarization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub patient_id: String,
    pub summary_type: SummaryType,
    pub time_range: TimeRange,
    pub focus_areas: Vec<String>,
    pub document_types: Vec<String>,
    /// Target length in words; output is truncated to roughly four characters
    /// per word.
    pub max_length: usize,
}

impl SummaryOptions {
    pub fn new(patient_id: &str) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            summary_type: SummaryType::Comprehensive,
            time_range: TimeRange::Last6Months,
            focus_areas: Vec::new(),
            document_types: Vec::new(),
            max_length: 500,
        }
    }
}
