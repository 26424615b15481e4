//! Readmission prediction workflow.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use care_governance::audit::{AuditError, AuditLog, AuditTrail};

use crate::explain::{contributing_factors, ContributingFactor};
use crate::features::{fetch_features, FeatureVector};
use crate::governance::{snapshot, ModelGovernance};
use crate::interventions::{recommend, Intervention};
use crate::model::{confidence_interval, score, tier, RiskTier, MODEL_VERSION};

const COMPONENT: &str = "readmission";

#[derive(Debug, Error)]
pub enum ReadmissionError {
    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub patient_id: String,
    pub encounter_id: String,
    pub prediction_timestamp: DateTime<Utc>,
    /// Probability of 30-day readmission, in [0, 1].
    pub risk_score: f64,
    pub risk_tier: RiskTier,
    pub confidence_interval: (f64, f64),
    pub contributing_factors: Vec<ContributingFactor>,
    pub recommended_interventions: Vec<Intervention>,
    pub model_governance: ModelGovernance,
    pub audit_trail: AuditTrail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub risk_tier_distribution: BTreeMap<String, usize>,
    pub high_risk_count: usize,
    pub average_risk_score: f64,
    pub model_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub total_patients: usize,
    pub predictions: Vec<RiskPrediction>,
    pub summary: BatchSummary,
    pub processing_time_ms: f64,
}

pub struct ReadmissionWorkflow {
    audit: Arc<AuditLog>,
}

impl ReadmissionWorkflow {
    pub fn new(audit: Arc<AuditLog>) -> Self {
        Self { audit }
    }

    /// Predict 30-day readmission risk for one patient.
    pub fn predict(
        &self,
        patient_id: &str,
        encounter_id: Option<&str>,
        rng: &mut impl Rng,
    ) -> Result<RiskPrediction, ReadmissionError> {
        let mut trail = AuditTrail::default();

        trail.push(self.audit.append(
            COMPONENT,
            "prediction_started",
            "system",
            json!({ "patient_id": patient_id, "encounter_id": encounter_id }),
        )?);

        let features = self.fetch(patient_id, encounter_id, rng, &mut trail)?;

        let risk_score = score(&features);
        let ci = confidence_interval(risk_score);
        trail.push(self.audit.append(
            COMPONENT,
            "inference_completed",
            "system",
            json!({ "risk_score": risk_score, "model_version": MODEL_VERSION }),
        )?);

        let risk_tier = tier(risk_score);
        let factors = contributing_factors(&features);
        let interventions = recommend(risk_tier, &factors);
        let governance = snapshot();

        trail.push(self.audit.append(
            COMPONENT,
            "prediction_completed",
            "system",
            json!({
                "risk_tier": risk_tier.as_str(),
                "interventions_count": interventions.len(),
            }),
        )?);

        tracing::info!(
            patient_id,
            risk_score,
            risk_tier = risk_tier.as_str(),
            "readmission_prediction_complete"
        );

        Ok(RiskPrediction {
            patient_id: patient_id.to_string(),
            encounter_id: features.encounter_id.clone(),
            prediction_timestamp: Utc::now(),
            risk_score,
            risk_tier,
            confidence_interval: ci,
            contributing_factors: factors,
            recommended_interventions: interventions,
            model_governance: governance,
            audit_trail: trail,
        })
    }

    fn fetch(
        &self,
        patient_id: &str,
        encounter_id: Option<&str>,
        rng: &mut impl Rng,
        trail: &mut AuditTrail,
    ) -> Result<FeatureVector, ReadmissionError> {
        let features = fetch_features(patient_id, encounter_id, rng);
        trail.push(self.audit.append(
            COMPONENT,
            "features_retrieved",
            "system",
            json!({ "feature_timestamp": features.feature_timestamp }),
        )?);
        Ok(features)
    }

    /// Batch prediction across a patient list.
    pub fn predict_batch(
        &self,
        patient_ids: &[String],
        rng: &mut impl Rng,
    ) -> Result<BatchPrediction, ReadmissionError> {
        let started = Instant::now();

        let mut predictions = Vec::with_capacity(patient_ids.len());
        let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
        for tier_name in ["low", "medium", "high", "critical"] {
            distribution.insert(tier_name.to_string(), 0);
        }

        for patient_id in patient_ids {
            let prediction = self.predict(patient_id, None, rng)?;
            *distribution
                .entry(prediction.risk_tier.as_str().to_string())
                .or_insert(0) += 1;
            predictions.push(prediction);
        }

        let high_risk_count = distribution["high"] + distribution["critical"];
        let average_risk_score = if predictions.is_empty() {
            0.0
        } else {
            predictions.iter().map(|p| p.risk_score).sum::<f64>() / predictions.len() as f64
        };

        Ok(BatchPrediction {
            total_patients: patient_ids.len(),
            predictions,
            summary: BatchSummary {
                risk_tier_distribution: distribution,
                high_risk_count,
                average_risk_score,
                model_version: MODEL_VERSION.to_string(),
            },
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use care_governance::audit::verify_entries;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn workflow() -> ReadmissionWorkflow {
        ReadmissionWorkflow::new(Arc::new(AuditLog::new()))
    }

    #[test]
    fn prediction_is_complete_and_bounded() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(9);
        let prediction = workflow.predict("TEST-001", None, &mut rng).unwrap();

        assert_eq!(prediction.patient_id, "TEST-001");
        assert!((0.02..=0.95).contains(&prediction.risk_score));
        let (lo, hi) = prediction.confidence_interval;
        assert!(lo <= prediction.risk_score && prediction.risk_score <= hi);
        assert!(prediction.contributing_factors.len() <= 5);
        assert_eq!(prediction.model_governance.model_version, "2.1.0");
        assert_eq!(prediction.audit_trail.entries.len(), 4);
        assert!(verify_entries(&prediction.audit_trail.entries).unwrap().verified);
    }

    #[test]
    fn explicit_encounter_id_round_trips() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(9);
        let prediction = workflow
            .predict("TEST-001", Some("ENC-42"), &mut rng)
            .unwrap();
        assert_eq!(prediction.encounter_id, "ENC-42");
    }

    #[test]
    fn batch_summary_is_consistent() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(17);
        let ids: Vec<String> = (0..20).map(|i| format!("P{i:03}")).collect();
        let batch = workflow.predict_batch(&ids, &mut rng).unwrap();

        assert_eq!(batch.total_patients, 20);
        assert_eq!(batch.predictions.len(), 20);
        let tier_total: usize = batch.summary.risk_tier_distribution.values().sum();
        assert_eq!(tier_total, 20);
        assert_eq!(
            batch.summary.high_risk_count,
            batch.summary.risk_tier_distribution["high"]
                + batch.summary.risk_tier_distribution["critical"]
        );
        assert!((0.0..=1.0).contains(&batch.summary.average_risk_score));
        assert!(batch.processing_time_ms >= 0.0);
    }

    #[test]
    fn interventions_follow_tier() {
        let workflow = workflow();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..20 {
            let p = workflow.predict("P", None, &mut rng).unwrap();
            match p.risk_tier {
                RiskTier::Low => assert!(p.recommended_interventions.is_empty()),
                RiskTier::Medium => assert!(p.recommended_interventions.len() <= 2),
                RiskTier::High => assert!(p.recommended_interventions.len() <= 3),
                RiskTier::Critical => assert!(p.recommended_interventions.len() <= 4),
            }
        }
    }
}
