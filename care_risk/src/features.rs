//! Feature vector and simulated feature-store retrieval.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DischargeDisposition {
    Home,
    HomeHealth,
    Snf,
    Rehab,
}

impl DischargeDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            DischargeDisposition::Home => "home",
            DischargeDisposition::HomeHealth => "home_health",
            DischargeDisposition::Snf => "snf",
            DischargeDisposition::Rehab => "rehab",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisCategory {
    HeartFailure,
    Pneumonia,
    Copd,
    Diabetes,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Medicare,
    Medicaid,
    Commercial,
    SelfPay,
}

/// One patient's model inputs at prediction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub patient_id: String,
    pub encounter_id: String,
    pub prior_admissions_12m: u32,
    pub length_of_stay: u32,
    pub charlson_comorbidity_index: u32,
    pub ed_visits_6m: u32,
    pub polypharmacy_count: u32,
    pub discharge_disposition: DischargeDisposition,
    pub primary_diagnosis_category: DiagnosisCategory,
    pub social_support_score: f64,
    pub age: u32,
    pub insurance_type: InsuranceType,
    pub feature_timestamp: DateTime<Utc>,
}

/// Catalog entry describing one model feature for interpretability output.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureDefinition {
    pub name: &'static str,
    pub importance: f64,
    pub category: &'static str,
    pub description: &'static str,
}

/// Top model features by global importance.
pub const FEATURE_DEFINITIONS: [FeatureDefinition; 10] = [
    FeatureDefinition {
        name: "prior_admissions_12m",
        importance: 0.142,
        category: "utilization",
        description: "Number of hospital admissions in past 12 months",
    },
    FeatureDefinition {
        name: "length_of_stay",
        importance: 0.098,
        category: "clinical",
        description: "Length of current hospital stay in days",
    },
    FeatureDefinition {
        name: "charlson_comorbidity_index",
        importance: 0.087,
        category: "clinical",
        description: "Charlson Comorbidity Index score",
    },
    FeatureDefinition {
        name: "ed_visits_6m",
        importance: 0.076,
        category: "utilization",
        description: "Emergency department visits in past 6 months",
    },
    FeatureDefinition {
        name: "polypharmacy_count",
        importance: 0.065,
        category: "clinical",
        description: "Number of active medications",
    },
    FeatureDefinition {
        name: "discharge_disposition",
        importance: 0.058,
        category: "clinical",
        description: "Discharge destination (home, SNF, etc.)",
    },
    FeatureDefinition {
        name: "primary_diagnosis_category",
        importance: 0.054,
        category: "clinical",
        description: "Primary diagnosis CCS category",
    },
    FeatureDefinition {
        name: "social_support_score",
        importance: 0.048,
        category: "social",
        description: "Social determinants of health score",
    },
    FeatureDefinition {
        name: "age",
        importance: 0.042,
        category: "demographic",
        description: "Patient age in years",
    },
    FeatureDefinition {
        name: "insurance_type",
        importance: 0.035,
        category: "demographic",
        description: "Insurance payer type",
    },
];

fn pick<T: Copy>(rng: &mut impl Rng, pool: &[T]) -> T {
    pool[rng.gen_range(0..pool.len())]
}

/// Simulated point-in-time feature retrieval; a real deployment would query
/// the feature store here.
pub fn fetch_features(
    patient_id: &str,
    encounter_id: Option<&str>,
    rng: &mut impl Rng,
) -> FeatureVector {
    let encounter_id = encounter_id.map(|e| e.to_string()).unwrap_or_else(|| {
        format!("ENC-{}", &Uuid::new_v4().simple().to_string()[..8])
    });

    FeatureVector {
        patient_id: patient_id.to_string(),
        encounter_id,
        prior_admissions_12m: rng.gen_range(0..=4),
        length_of_stay: rng.gen_range(2..=14),
        charlson_comorbidity_index: rng.gen_range(0..=8),
        ed_visits_6m: rng.gen_range(0..=6),
        polypharmacy_count: rng.gen_range(3..=15),
        discharge_disposition: pick(
            rng,
            &[
                DischargeDisposition::Home,
                DischargeDisposition::Snf,
                DischargeDisposition::HomeHealth,
                DischargeDisposition::Rehab,
            ],
        ),
        primary_diagnosis_category: pick(
            rng,
            &[
                DiagnosisCategory::HeartFailure,
                DiagnosisCategory::Pneumonia,
                DiagnosisCategory::Copd,
                DiagnosisCategory::Diabetes,
            ],
        ),
        social_support_score: rng.gen_range(0.3..1.0),
        age: rng.gen_range(45..=85),
        insurance_type: pick(
            rng,
            &[
                InsuranceType::Medicare,
                InsuranceType::Medicaid,
                InsuranceType::Commercial,
                InsuranceType::SelfPay,
            ],
        ),
        feature_timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fetched_features_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let f = fetch_features("P001", None, &mut rng);
            assert!(f.prior_admissions_12m <= 4);
            assert!((2..=14).contains(&f.length_of_stay));
            assert!(f.charlson_comorbidity_index <= 8);
            assert!(f.ed_visits_6m <= 6);
            assert!((3..=15).contains(&f.polypharmacy_count));
            assert!((0.3..1.0).contains(&f.social_support_score));
            assert!((45..=85).contains(&f.age));
            assert!(f.encounter_id.starts_with("ENC-"));
        }
    }

    #[test]
    fn explicit_encounter_id_is_kept() {
        let mut rng = StdRng::seed_from_u64(1);
        let f = fetch_features("P001", Some("ENC-FIXED"), &mut rng);
        assert_eq!(f.encounter_id, "ENC-FIXED");
    }

    #[test]
    fn feature_catalog_importances_descend() {
        for pair in FEATURE_DEFINITIONS.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
    }
}
