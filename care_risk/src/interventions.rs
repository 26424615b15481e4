//! Intervention catalog and matching.

use serde::{Deserialize, Serialize};

use crate::explain::ContributingFactor;
use crate::model::RiskTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    pub intervention_id: String,
    pub name: String,
    pub description: String,
    pub target_factors: Vec<String>,
    pub estimated_risk_reduction: f64,
    /// A through D.
    pub evidence_level: String,
    /// easy, moderate, complex.
    pub implementation_difficulty: String,
}

fn intervention(
    id: &str,
    name: &str,
    description: &str,
    targets: &[&str],
    reduction: f64,
    evidence: &str,
    difficulty: &str,
) -> Intervention {
    Intervention {
        intervention_id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        target_factors: targets.iter().map(|t| t.to_string()).collect(),
        estimated_risk_reduction: reduction,
        evidence_level: evidence.to_string(),
        implementation_difficulty: difficulty.to_string(),
    }
}

pub fn catalog() -> Vec<Intervention> {
    vec![
        intervention(
            "int-001",
            "Transitional Care Management",
            "Post-discharge follow-up within 7 days with care coordinator",
            &["discharge_disposition", "prior_admissions_12m"],
            0.18,
            "A",
            "moderate",
        ),
        intervention(
            "int-002",
            "Medication Reconciliation",
            "Comprehensive medication review and reconciliation at discharge",
            &["polypharmacy_count"],
            0.12,
            "A",
            "easy",
        ),
        intervention(
            "int-003",
            "Home Health Services",
            "Post-discharge home health nursing visits",
            &["social_support_score", "age"],
            0.15,
            "B",
            "moderate",
        ),
        intervention(
            "int-004",
            "Care Coordination",
            "Dedicated care coordinator assignment for high-risk patients",
            &[
                "prior_admissions_12m",
                "ed_visits_6m",
                "charlson_comorbidity_index",
            ],
            0.10,
            "B",
            "complex",
        ),
        intervention(
            "int-005",
            "Telemedicine Follow-up",
            "Virtual check-in within 48 hours of discharge",
            &["discharge_disposition"],
            0.08,
            "B",
            "easy",
        ),
    ]
}

/// Match interventions to a prediction: score by overlap with the patient's
/// contributing factors, keep the strongest few by tier.
pub fn recommend(tier: RiskTier, factors: &[ContributingFactor]) -> Vec<Intervention> {
    if tier == RiskTier::Low {
        return Vec::new();
    }

    let factor_names: Vec<&str> = factors.iter().map(|f| f.factor_name.as_str()).collect();
    let elevated = matches!(tier, RiskTier::High | RiskTier::Critical);

    let mut scored: Vec<(f64, Intervention)> = catalog()
        .into_iter()
        .filter_map(|i| {
            let overlap = i
                .target_factors
                .iter()
                .filter(|t| factor_names.contains(&t.as_str()))
                .count();
            if overlap > 0 || elevated {
                Some((overlap as f64 * i.estimated_risk_reduction, i))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let keep = match tier {
        RiskTier::Critical => 4,
        RiskTier::High => 3,
        _ => 2,
    };
    scored.into_iter().take(keep).map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(name: &str) -> ContributingFactor {
        ContributingFactor {
            factor_name: name.to_string(),
            factor_category: "clinical".to_string(),
            weight: 0.1,
            value: "x".to_string(),
            reference_range: None,
            is_modifiable: true,
        }
    }

    #[test]
    fn catalog_is_complete() {
        let interventions = catalog();
        assert_eq!(interventions.len(), 5);
        for i in &interventions {
            assert!(!i.target_factors.is_empty());
            assert!((0.0..=1.0).contains(&i.estimated_risk_reduction));
            assert!(["A", "B", "C", "D"].contains(&i.evidence_level.as_str()));
        }
    }

    #[test]
    fn low_tier_gets_nothing() {
        assert!(recommend(RiskTier::Low, &[factor("polypharmacy_count")]).is_empty());
    }

    #[test]
    fn counts_scale_with_tier() {
        let factors = vec![
            factor("prior_admissions_12m"),
            factor("polypharmacy_count"),
            factor("social_support_score"),
        ];
        assert_eq!(recommend(RiskTier::Critical, &factors).len(), 4);
        assert_eq!(recommend(RiskTier::High, &factors).len(), 3);
        assert!(recommend(RiskTier::Medium, &factors).len() <= 2);
    }

    #[test]
    fn targeted_interventions_rank_first() {
        let factors = vec![factor("polypharmacy_count")];
        let recs = recommend(RiskTier::High, &factors);
        assert_eq!(recs[0].intervention_id, "int-002");
    }

    #[test]
    fn medium_tier_requires_factor_overlap() {
        let recs = recommend(RiskTier::Medium, &[factor("unrelated_factor")]);
        assert!(recs.is_empty());
    }
}
