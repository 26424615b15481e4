//! Per-prediction factor explanations.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub factor_name: String,
    pub factor_category: String,
    /// Contribution weight in [0, 1].
    pub weight: f64,
    pub value: String,
    pub reference_range: Option<String>,
    pub is_modifiable: bool,
}

fn factor(
    name: &str,
    category: &str,
    weight: f64,
    value: String,
    reference_range: &str,
    is_modifiable: bool,
) -> ContributingFactor {
    ContributingFactor {
        factor_name: name.to_string(),
        factor_category: category.to_string(),
        weight,
        value,
        reference_range: Some(reference_range.to_string()),
        is_modifiable,
    }
}

/// Threshold-based factor attribution, top five by weight.
pub fn contributing_factors(features: &FeatureVector) -> Vec<ContributingFactor> {
    let mut factors = Vec::new();

    if features.prior_admissions_12m > 0 {
        factors.push(factor(
            "prior_admissions_12m",
            "utilization",
            (features.prior_admissions_12m as f64 * 0.08).min(0.30),
            features.prior_admissions_12m.to_string(),
            "0",
            false,
        ));
    }

    if features.length_of_stay > 4 {
        factors.push(factor(
            "length_of_stay",
            "clinical",
            if features.length_of_stay > 7 { 0.10 } else { 0.05 },
            format!("{} days", features.length_of_stay),
            "<= 4 days",
            false,
        ));
    }

    if features.charlson_comorbidity_index > 2 {
        factors.push(factor(
            "charlson_comorbidity_index",
            "clinical",
            features.charlson_comorbidity_index as f64 * 0.03,
            features.charlson_comorbidity_index.to_string(),
            "0-2",
            false,
        ));
    }

    if features.polypharmacy_count > 5 {
        factors.push(factor(
            "polypharmacy_count",
            "clinical",
            if features.polypharmacy_count > 10 { 0.08 } else { 0.04 },
            format!("{} medications", features.polypharmacy_count),
            "<= 5",
            true,
        ));
    }

    if features.social_support_score < 0.6 {
        factors.push(factor(
            "social_support_score",
            "social",
            (1.0 - features.social_support_score) * 0.08,
            format!("{:.2}", features.social_support_score),
            ">= 0.6",
            true,
        ));
    }

    factors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    factors.truncate(5);
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{DiagnosisCategory, DischargeDisposition, InsuranceType};
    use chrono::Utc;

    fn loaded() -> FeatureVector {
        FeatureVector {
            patient_id: "P001".into(),
            encounter_id: "ENC-1".into(),
            prior_admissions_12m: 3,
            length_of_stay: 9,
            charlson_comorbidity_index: 4,
            ed_visits_6m: 2,
            polypharmacy_count: 12,
            discharge_disposition: DischargeDisposition::Snf,
            primary_diagnosis_category: DiagnosisCategory::HeartFailure,
            social_support_score: 0.4,
            age: 78,
            insurance_type: InsuranceType::Medicare,
            feature_timestamp: Utc::now(),
        }
    }

    #[test]
    fn factors_sorted_and_capped_at_five() {
        let factors = contributing_factors(&loaded());
        assert_eq!(factors.len(), 5);
        for pair in factors.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
        assert_eq!(factors[0].factor_name, "prior_admissions_12m");
    }

    #[test]
    fn weights_stay_in_unit_interval() {
        for f in contributing_factors(&loaded()) {
            assert!((0.0..=1.0).contains(&f.weight), "{}", f.factor_name);
        }
    }

    #[test]
    fn quiet_profile_yields_no_factors() {
        let features = FeatureVector {
            prior_admissions_12m: 0,
            length_of_stay: 3,
            charlson_comorbidity_index: 1,
            polypharmacy_count: 4,
            social_support_score: 0.9,
            ..loaded()
        };
        assert!(contributing_factors(&features).is_empty());
    }

    #[test]
    fn modifiable_flags_follow_factor_kind() {
        let factors = contributing_factors(&loaded());
        let by_name = |n: &str| factors.iter().find(|f| f.factor_name == n).unwrap();
        assert!(!by_name("prior_admissions_12m").is_modifiable);
        assert!(by_name("polypharmacy_count").is_modifiable);
        assert!(by_name("social_support_score").is_modifiable);
    }
}
