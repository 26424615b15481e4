//! Gap rules evaluator.
//!
//! A sequence of guideline threshold checks over derived patient features.
//! The evaluator is pure: callers pass `today` so tests can pin the clock.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use care_data::PatientRecord;

use crate::guidelines::{
    COLORECTAL_AGE_RANGE, COLORECTAL_DUE_WINDOW_DAYS, COLORECTAL_INTERVAL_DAYS, FLU_INTERVAL_DAYS,
    HBA1C_DUE_WINDOW_DAYS, HBA1C_INTERVAL_DAYS, MAMMOGRAPHY_AGE_RANGE,
    MAMMOGRAPHY_DUE_WINDOW_DAYS, MAMMOGRAPHY_INTERVAL_DAYS, PNEUMOCOCCAL_MIN_AGE,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CareGapPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl CareGapPriority {
    pub fn weight(self) -> f64 {
        match self {
            CareGapPriority::Critical => 1.0,
            CareGapPriority::High => 0.8,
            CareGapPriority::Medium => 0.5,
            CareGapPriority::Low => 0.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CareGapPriority::Critical => "critical",
            CareGapPriority::High => "high",
            CareGapPriority::Medium => "medium",
            CareGapPriority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CareGapType {
    Screening,
    Vaccination,
    LabTest,
    Medication,
    FollowUp,
}

impl CareGapType {
    pub fn as_str(self) -> &'static str {
        match self {
            CareGapType::Screening => "screening",
            CareGapType::Vaccination => "vaccination",
            CareGapType::LabTest => "lab_test",
            CareGapType::Medication => "medication",
            CareGapType::FollowUp => "follow_up",
        }
    }
}

/// A preventive-care action that is due but not completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareGap {
    pub gap_id: String,
    #[serde(rename = "type")]
    pub gap_type: CareGapType,
    pub name: String,
    pub description: String,
    pub guideline_source: String,
    pub due_date: NaiveDate,
    pub priority: CareGapPriority,
    pub icd10_codes: Vec<String>,
    pub cpt_codes: Vec<String>,
    /// Estimated health impact in [0, 1].
    pub estimated_impact: f64,
}

/// Derived features the rules run against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GapFeatures {
    pub patient_id: String,
    pub age: u32,
    pub gender: String,
    pub has_diabetes: bool,
    pub has_hypertension: bool,
    pub last_colonoscopy: Option<NaiveDate>,
    pub last_mammogram: Option<NaiveDate>,
    pub last_hba1c: Option<NaiveDate>,
    pub last_flu_shot: Option<NaiveDate>,
    pub medication_count: usize,
    pub condition_count: usize,
}

/// Feature retrieval over a fetched record; stands in for the feature store.
pub fn derive_features(record: &PatientRecord) -> GapFeatures {
    GapFeatures {
        patient_id: record.patient_id.clone(),
        age: record.age,
        gender: record.gender.clone(),
        has_diabetes: record.has_condition_prefix(&["E10", "E11"]),
        has_hypertension: record.has_condition_prefix(&["I10", "I11"]),
        last_colonoscopy: record.last_procedure("45378"),
        last_mammogram: record.last_procedure("77067"),
        last_hba1c: record.last_lab("4548-4"),
        last_flu_shot: record.last_immunization("141"),
        medication_count: record.medications.len(),
        condition_count: record.conditions.len(),
    }
}

fn gap_id() -> String {
    format!("gap-{}", &Uuid::new_v4().simple().to_string()[..8])
}

fn gap(
    gap_type: CareGapType,
    name: &str,
    description: &str,
    source: &str,
    due_date: NaiveDate,
    priority: CareGapPriority,
    icd10: &[&str],
    cpt: &[&str],
    impact: f64,
) -> CareGap {
    CareGap {
        gap_id: gap_id(),
        gap_type,
        name: name.to_string(),
        description: description.to_string(),
        guideline_source: source.to_string(),
        due_date,
        priority,
        icd10_codes: icd10.iter().map(|c| c.to_string()).collect(),
        cpt_codes: cpt.iter().map(|c| c.to_string()).collect(),
        estimated_impact: impact,
    }
}

/// Apply the guideline rules to one patient's features.
pub fn evaluate(features: &GapFeatures, today: NaiveDate) -> Vec<CareGap> {
    let mut gaps = Vec::new();

    // Colorectal screening, every 10 years between 45 and 75.
    let (colo_min, colo_max) = COLORECTAL_AGE_RANGE;
    if (colo_min..=colo_max).contains(&features.age) {
        match features.last_colonoscopy {
            Some(last) => {
                let next_due = last + Duration::days(COLORECTAL_INTERVAL_DAYS);
                if next_due <= today + Duration::days(COLORECTAL_DUE_WINDOW_DAYS) {
                    gaps.push(gap(
                        CareGapType::Screening,
                        "Colorectal Cancer Screening",
                        "Due for colonoscopy based on 10-year screening interval",
                        "USPSTF 2021",
                        next_due,
                        CareGapPriority::High,
                        &["Z12.11"],
                        &["45378", "45380"],
                        0.85,
                    ));
                }
            }
            None => {
                gaps.push(gap(
                    CareGapType::Screening,
                    "Colorectal Cancer Screening",
                    "No colonoscopy on record; screening recommended for age 45+",
                    "USPSTF 2021",
                    today,
                    CareGapPriority::High,
                    &["Z12.11"],
                    &["45378", "45380"],
                    0.90,
                ));
            }
        }
    }

    // Mammography, every 2 years for women between 40 and 74.
    let (mammo_min, mammo_max) = MAMMOGRAPHY_AGE_RANGE;
    if features.gender == "female" && (mammo_min..=mammo_max).contains(&features.age) {
        if let Some(last) = features.last_mammogram {
            let next_due = last + Duration::days(MAMMOGRAPHY_INTERVAL_DAYS);
            if next_due <= today + Duration::days(MAMMOGRAPHY_DUE_WINDOW_DAYS) {
                gaps.push(gap(
                    CareGapType::Screening,
                    "Breast Cancer Screening",
                    "Due for mammography based on 2-year screening interval",
                    "USPSTF 2024",
                    next_due,
                    CareGapPriority::High,
                    &["Z12.31"],
                    &["77067"],
                    0.80,
                ));
            }
        }
    }

    if features.has_diabetes {
        // HbA1c every six months.
        if let Some(last) = features.last_hba1c {
            let next_due = last + Duration::days(HBA1C_INTERVAL_DAYS);
            if next_due <= today + Duration::days(HBA1C_DUE_WINDOW_DAYS) {
                gaps.push(gap(
                    CareGapType::LabTest,
                    "HbA1c Testing",
                    "Due for HbA1c monitoring per diabetes management guidelines",
                    "HEDIS 2024",
                    next_due,
                    CareGapPriority::High,
                    &["E11.9"],
                    &["83036"],
                    0.75,
                ));
            }
        }

        // Annual dilated eye exam is always surfaced for diabetics.
        gaps.push(gap(
            CareGapType::Screening,
            "Diabetic Eye Exam",
            "Annual dilated eye exam recommended for diabetes management",
            "ADA Standards 2024",
            today + Duration::days(60),
            CareGapPriority::Medium,
            &["E11.9", "Z13.5"],
            &["92004", "92014"],
            0.70,
        ));
    }

    // Annual flu shot.
    if let Some(last) = features.last_flu_shot {
        if (today - last).num_days() > FLU_INTERVAL_DAYS {
            gaps.push(gap(
                CareGapType::Vaccination,
                "Annual Influenza Vaccination",
                "Due for annual flu shot",
                "ACIP 2024",
                today,
                CareGapPriority::Medium,
                &["Z23"],
                &["90688"],
                0.60,
            ));
        }
    }

    // Pneumococcal vaccine at 65.
    if features.age >= PNEUMOCOCCAL_MIN_AGE {
        gaps.push(gap(
            CareGapType::Vaccination,
            "Pneumococcal Vaccination",
            "Pneumococcal vaccine recommended for adults 65+",
            "ACIP 2024",
            today + Duration::days(30),
            CareGapPriority::Medium,
            &["Z23"],
            &["90670", "90671"],
            0.55,
        ));
    }

    gaps
}

/// Priority-weighted impact sum, normalized against the worst case where
/// every gap is critical with full impact.
pub fn risk_score(gaps: &[CareGap]) -> f64 {
    if gaps.is_empty() {
        return 0.0;
    }
    let weighted: f64 = gaps
        .iter()
        .map(|g| g.priority.weight() * g.estimated_impact)
        .sum();
    (weighted / gaps.len() as f64).min(1.0)
}

/// Actionable next steps derived from the gap mix.
pub fn recommendations(gaps: &[CareGap]) -> Vec<String> {
    let mut out = Vec::new();

    let high_priority = gaps
        .iter()
        .filter(|g| matches!(g.priority, CareGapPriority::Critical | CareGapPriority::High))
        .count();
    if high_priority > 0 {
        out.push(format!(
            "Schedule appointments for {high_priority} high-priority care gaps within 30 days"
        ));
    }

    let screenings: Vec<&str> = gaps
        .iter()
        .filter(|g| g.gap_type == CareGapType::Screening)
        .map(|g| g.name.as_str())
        .collect();
    if !screenings.is_empty() {
        out.push(format!("Preventive screenings needed: {}", screenings.join(", ")));
    }

    let vaccinations: Vec<&str> = gaps
        .iter()
        .filter(|g| g.gap_type == CareGapType::Vaccination)
        .map(|g| g.name.as_str())
        .collect();
    if !vaccinations.is_empty() {
        out.push(format!("Vaccinations due: {}", vaccinations.join(", ")));
    }

    if gaps.iter().any(|g| g.gap_type == CareGapType::LabTest) {
        out.push("Order pending laboratory tests for chronic disease monitoring".to_string());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn diabetic_woman() -> GapFeatures {
        GapFeatures {
            patient_id: "TEST-001".into(),
            age: 55,
            gender: "female".into(),
            has_diabetes: true,
            has_hypertension: true,
            last_colonoscopy: None,
            last_mammogram: Some(date(2022, 1, 1)),
            last_hba1c: Some(date(2023, 6, 1)),
            last_flu_shot: Some(date(2022, 10, 1)),
            medication_count: 2,
            condition_count: 2,
        }
    }

    #[test]
    fn diabetic_woman_accumulates_expected_gaps() {
        let gaps = evaluate(&diabetic_woman(), date(2024, 6, 1));
        let names: Vec<&str> = gaps.iter().map(|g| g.name.as_str()).collect();

        assert!(names.contains(&"Colorectal Cancer Screening"));
        assert!(names.contains(&"Breast Cancer Screening"));
        assert!(names.contains(&"HbA1c Testing"));
        assert!(names.contains(&"Diabetic Eye Exam"));
        assert!(names.contains(&"Annual Influenza Vaccination"));
        // Aged 55: no pneumococcal gap yet.
        assert!(!names.contains(&"Pneumococcal Vaccination"));
    }

    #[test]
    fn recent_screenings_close_the_gaps() {
        let features = GapFeatures {
            last_colonoscopy: Some(date(2023, 1, 1)),
            last_mammogram: Some(date(2024, 1, 1)),
            last_hba1c: Some(date(2024, 5, 15)),
            last_flu_shot: Some(date(2024, 1, 15)),
            has_diabetes: false,
            ..diabetic_woman()
        };
        let gaps = evaluate(&features, date(2024, 6, 1));
        assert!(gaps.is_empty());
    }

    #[test]
    fn pneumococcal_gap_appears_at_sixty_five() {
        let features = GapFeatures {
            age: 66,
            ..diabetic_woman()
        };
        let gaps = evaluate(&features, date(2024, 6, 1));
        assert!(gaps.iter().any(|g| g.name == "Pneumococcal Vaccination"));
    }

    #[test]
    fn gaps_have_complete_fields() {
        let gaps = evaluate(&diabetic_woman(), date(2024, 6, 1));
        for g in &gaps {
            assert!(g.gap_id.starts_with("gap-"));
            assert!(!g.name.is_empty());
            assert!(!g.description.is_empty());
            assert!(!g.guideline_source.is_empty());
            assert!((0.0..=1.0).contains(&g.estimated_impact));
        }
    }

    #[test]
    fn risk_score_is_zero_for_no_gaps() {
        assert_eq!(risk_score(&[]), 0.0);
    }

    #[test]
    fn risk_score_stays_in_unit_interval() {
        let gaps = evaluate(&diabetic_woman(), date(2024, 6, 1));
        let score = risk_score(&gaps);
        assert!((0.0..=1.0).contains(&score));
        assert!(score > 0.0);
    }

    #[test]
    fn recommendations_cover_gap_mix() {
        let gaps = evaluate(&diabetic_woman(), date(2024, 6, 1));
        let recs = recommendations(&gaps);
        assert!(recs.iter().any(|r| r.contains("high-priority")));
        assert!(recs.iter().any(|r| r.contains("Preventive screenings")));
        assert!(recs.iter().any(|r| r.contains("Vaccinations due")));
        assert!(recs.iter().any(|r| r.contains("laboratory tests")));
    }

    #[test]
    fn features_derive_from_demo_record() {
        let record = care_data::demo_record("P001");
        let features = derive_features(&record);
        assert!(features.has_diabetes);
        assert!(features.has_hypertension);
        assert_eq!(features.last_colonoscopy, Some(date(2019, 6, 15)));
        assert_eq!(features.medication_count, 2);
    }
}
