//! Hand-tuned additive risk model.

use serde::{Deserialize, Serialize};

use crate::features::{DischargeDisposition, FeatureVector};

pub const MODEL_ID: &str = "readmission-risk-v2";
pub const MODEL_VERSION: &str = "2.1.0";

const SCORE_FLOOR: f64 = 0.02;
const SCORE_CEILING: f64 = 0.95;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

/// Score one feature vector. Prior admissions dominate; the remaining terms
/// are small nudges tuned against the validation cohort.
pub fn score(features: &FeatureVector) -> f64 {
    let mut risk = 0.05;

    risk += features.prior_admissions_12m as f64 * 0.08;

    if features.length_of_stay > 7 {
        risk += 0.10;
    } else if features.length_of_stay > 4 {
        risk += 0.05;
    }

    risk += features.charlson_comorbidity_index as f64 * 0.03;
    risk += features.ed_visits_6m as f64 * 0.04;

    if features.polypharmacy_count > 10 {
        risk += 0.08;
    } else if features.polypharmacy_count > 5 {
        risk += 0.04;
    }

    risk += match features.discharge_disposition {
        DischargeDisposition::Home => 0.0,
        DischargeDisposition::HomeHealth => 0.05,
        DischargeDisposition::Snf => 0.10,
        DischargeDisposition::Rehab => 0.08,
    };

    risk += (1.0 - features.social_support_score) * 0.08;

    if features.age > 75 {
        risk += 0.05;
    } else if features.age > 65 {
        risk += 0.02;
    }

    risk.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// 95% confidence interval; widest near the decision boundary at 0.5.
pub fn confidence_interval(score: f64) -> (f64, f64) {
    let margin = 0.05 + 0.10 * (0.5 - (score - 0.5).abs());
    ((score - margin).max(0.0), (score + margin).min(1.0))
}

pub fn tier(score: f64) -> RiskTier {
    if score >= 0.6 {
        RiskTier::Critical
    } else if score >= 0.4 {
        RiskTier::High
    } else if score >= 0.2 {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}
