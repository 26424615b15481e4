//! Summarization workflow.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rand::Rng;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use care_governance::audit::{AuditError, AuditLog, AuditTrail};

use crate::docs::retrieve;
use crate::findings::{citations, key_findings};
use crate::phi::scan;
use crate::templates::{active_problems, current_medications, model_info, recent_labs, render};
use crate::types::{
    ClinicalSummary, PhiAudit, RagMetrics, SummaryOptions, SummaryType, TimeRange,
};

const COMPONENT: &str = "summarization";

/// Documents below this relevance are retrieved but not fed to generation.
const RELEVANCE_CUTOFF: f64 = 0.7;

/// Rough words-to-tokens expansion used for the reported token estimates.
const TOKENS_PER_WORD: f64 = 1.3;

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error(transparent)]
    Audit(#[from] AuditError),
}

pub struct SummarizationWorkflow {
    audit: Arc<AuditLog>,
}

impl SummarizationWorkflow {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self { audit }
    }

    /// Generate a clinical summary for one patient.
    pub fn summarize(
        &self,
        options: &SummaryOptions,
        rng: &mut impl Rng,
    ) -> Result<ClinicalSummary, SummarizationError> {
        let started = Instant::now();
        let mut trail = AuditTrail::default();

        trail.push(self.audit.append(
            COMPONENT,
            "summarization_started",
            "system",
            json!({
                "patient_id": options.patient_id,
                "summary_type": options.summary_type.as_str(),
                "time_range": options.time_range.as_str(),
            }),
        )?);

        let documents = retrieve(
            &options.patient_id,
            options.time_range,
            &options.document_types,
            rng,
        );
        let average_relevance = if documents.is_empty() {
            0.0
        } else {
            documents.iter().map(|d| d.relevance_score).sum::<f64>() / documents.len() as f64
        };
        trail.push(self.audit.append(
            COMPONENT,
            "documents_retrieved",
            "system",
            json!({
                "document_count": documents.len(),
                "avg_relevance": average_relevance,
            }),
        )?);

        let summary = render(options.summary_type, options.max_length);

        let phi = scan(&summary);
        let phi_audit = PhiAudit {
            scan_performed: true,
            phi_detected: phi.detected,
            phi_types_found: phi.types_found.clone(),
            redaction_applied: phi.detected,
            audit_id: Uuid::new_v4().to_string(),
        };
        trail.push(self.audit.append(
            COMPONENT,
            "phi_scan_completed",
            "system",
            json!({ "phi_detected": phi.detected, "phi_types": phi.types_found }),
        )?);

        let findings = key_findings(&documents);
        let cites = citations(&documents);

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let context_words: usize = documents
            .iter()
            .map(|d| d.content.split_whitespace().count())
            .sum();
        let rag_metrics = RagMetrics {
            documents_retrieved: documents.len(),
            documents_used: documents
                .iter()
                .filter(|d| d.relevance_score > RELEVANCE_CUTOFF)
                .count(),
            average_relevance,
            context_tokens: (context_words as f64 * TOKENS_PER_WORD) as u64,
            generation_tokens: (summary.split_whitespace().count() as f64 * TOKENS_PER_WORD)
                as u64,
            latency_ms,
        };

        trail.push(self.audit.append(
            COMPONENT,
            "summarization_completed",
            "system",
            json!({
                "summary_length": summary.len(),
                "citations_count": cites.len(),
                "latency_ms": latency_ms,
            }),
        )?);

        tracing::info!(
            patient_id = %options.patient_id,
            summary_type = options.summary_type.as_str(),
            latency_ms,
            "summarization_complete"
        );

        Ok(ClinicalSummary {
            patient_id: options.patient_id.clone(),
            summary_type: options.summary_type,
            time_range: options.time_range.as_str().to_string(),
            generated_at: Utc::now(),
            summary,
            key_findings: findings,
            active_problems: active_problems(),
            current_medications: current_medications(),
            recent_labs: recent_labs(),
            citations: cites,
            phi_audit,
            rag_metrics,
            model_info: model_info(),
            audit_trail: trail,
        })
    }

    /// Summary focused on one clinical problem.
    pub fn summarize_problem(
        &self,
        patient_id: &str,
        problem_code: &str,
        time_range: TimeRange,
        rng: &mut impl Rng,
    ) -> Result<ClinicalSummary, SummarizationError> {
        let options = SummaryOptions {
            summary_type: SummaryType::ProblemFocused,
            time_range,
            focus_areas: vec![problem_code.to_string()],
            ..SummaryOptions::new(patient_id)
        };
        self.summarize(&options, rng)
    }

    /// Summary for a care transition (discharge or transfer).
    pub fn summarize_transition(
        &self,
        patient_id: &str,
        encounter_id: &str,
        recipient_type: &str,
        rng: &mut impl Rng,
    ) -> Result<ClinicalSummary, SummarizationError> {
        let options = SummaryOptions {
            summary_type: SummaryType::CareTransition,
            time_range: TimeRange::LastMonth,
            focus_areas: vec![
                format!("encounter:{encounter_id}"),
                format!("recipient:{recipient_type}"),
            ],
            ..SummaryOptions::new(patient_id)
        };
        self.summarize(&options, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_governance::audit::verify_entries;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn workflow() -> SummarizationWorkflow {
        SummarizationWorkflow::new(Arc::new(AuditLog::new()))
    }

    #[test]
    fn summary_response_is_complete() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(31);
        let summary = workflow
            .summarize(&SummaryOptions::new("TEST-001"), &mut rng)
            .unwrap();

        assert_eq!(summary.patient_id, "TEST-001");
        assert!(!summary.summary.is_empty());
        assert_eq!(summary.key_findings.len(), 4);
        assert_eq!(summary.citations.len(), 5);
        assert_eq!(summary.active_problems.len(), 3);
        assert_eq!(summary.audit_trail.entries.len(), 4);
        assert!(verify_entries(&summary.audit_trail.entries).unwrap().verified);
    }

    #[test]
    fn canned_templates_contain_no_phi() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(31);
        for summary_type in [
            SummaryType::Comprehensive,
            SummaryType::Medication,
            SummaryType::LabTrend,
        ] {
            let options = SummaryOptions {
                summary_type,
                ..SummaryOptions::new("TEST-001")
            };
            let summary = workflow.summarize(&options, &mut rng).unwrap();
            assert!(summary.phi_audit.scan_performed);
            assert!(!summary.phi_audit.phi_detected, "{summary_type:?}");
            assert!(!summary.phi_audit.redaction_applied);
        }
    }

    #[test]
    fn rag_metrics_are_consistent() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(31);
        let summary = workflow
            .summarize(&SummaryOptions::new("TEST-001"), &mut rng)
            .unwrap();
        let rag = &summary.rag_metrics;

        assert_eq!(rag.documents_retrieved, 5);
        assert!(rag.documents_used <= rag.documents_retrieved);
        assert!((0.0..=1.0).contains(&rag.average_relevance));
        assert!(rag.context_tokens > 0);
        assert!(rag.generation_tokens > 0);
        assert!(rag.latency_ms >= 0.0);
    }

    #[test]
    fn problem_summary_carries_focus() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(31);
        let summary = workflow
            .summarize_problem("TEST-001", "E11.9", TimeRange::LastYear, &mut rng)
            .unwrap();
        assert_eq!(summary.summary_type, SummaryType::ProblemFocused);
        assert_eq!(summary.time_range, "last_year");
    }

    #[test]
    fn transition_summary_uses_last_month() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(31);
        let summary = workflow
            .summarize_transition("TEST-001", "ENC-9", "pcp", &mut rng)
            .unwrap();
        assert_eq!(summary.summary_type, SummaryType::CareTransition);
        assert_eq!(summary.time_range, "last_month");
    }
}
