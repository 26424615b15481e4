//! Simulated patient record.
//!
//! Stands in for the FHIR integration service: every lookup returns the same
//! demonstration record so the downstream workflows stay deterministic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedCondition {
    pub code: String,
    pub description: String,
    pub onset: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedProcedure {
    pub code: String,
    pub description: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedLab {
    pub code: String,
    pub name: String,
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedImmunization {
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedMedication {
    pub name: String,
    pub dose: String,
    pub frequency: String,
}

/// Everything the clinical workflows read about one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    pub patient_id: String,
    pub age: u32,
    pub gender: String,
    pub conditions: Vec<RecordedCondition>,
    pub procedures: Vec<RecordedProcedure>,
    pub labs: Vec<RecordedLab>,
    pub immunizations: Vec<RecordedImmunization>,
    pub medications: Vec<RecordedMedication>,
}

impl PatientRecord {
    /// True if any condition code starts with one of the given prefixes.
    pub fn has_condition_prefix(&self, prefixes: &[&str]) -> bool {
        self.conditions
            .iter()
            .any(|c| prefixes.iter().any(|p| c.code.starts_with(p)))
    }

    /// Most recent procedure date for a CPT code.
    pub fn last_procedure(&self, cpt_code: &str) -> Option<NaiveDate> {
        self.procedures
            .iter()
            .filter(|p| p.code == cpt_code)
            .map(|p| p.date)
            .max()
    }

    /// Most recent lab date for a LOINC code.
    pub fn last_lab(&self, loinc_code: &str) -> Option<NaiveDate> {
        self.labs
            .iter()
            .filter(|l| l.code == loinc_code)
            .map(|l| l.date)
            .max()
    }

    /// Most recent immunization date for a CVX code.
    pub fn last_immunization(&self, cvx_code: &str) -> Option<NaiveDate> {
        self.immunizations
            .iter()
            .filter(|i| i.code == cvx_code)
            .map(|i| i.date)
            .max()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("static date")
}

/// The demonstration record: a 58-year-old woman with well-controlled type 2
/// diabetes and hypertension, a ten-year-old colonoscopy, and a recent
/// mammogram.
pub fn demo_record(patient_id: &str) -> PatientRecord {
    PatientRecord {
        patient_id: patient_id.to_string(),
        age: 58,
        gender: "female".to_string(),
        conditions: vec![
            RecordedCondition {
                code: "E11.9".into(),
                description: "Type 2 diabetes".into(),
                onset: date(2019, 3, 15),
            },
            RecordedCondition {
                code: "I10".into(),
                description: "Hypertension".into(),
                onset: date(2018, 7, 22),
            },
        ],
        procedures: vec![
            RecordedProcedure {
                code: "45378".into(),
                description: "Colonoscopy".into(),
                date: date(2019, 6, 15),
            },
            RecordedProcedure {
                code: "77067".into(),
                description: "Mammography".into(),
                date: date(2023, 8, 20),
            },
        ],
        labs: vec![
            RecordedLab {
                code: "4548-4".into(),
                name: "HbA1c".into(),
                value: 7.2,
                date: date(2023, 10, 15),
            },
            RecordedLab {
                code: "2345-7".into(),
                name: "Glucose".into(),
                value: 142.0,
                date: date(2023, 12, 1),
            },
        ],
        immunizations: vec![
            RecordedImmunization {
                code: "141".into(),
                name: "Influenza".into(),
                date: date(2023, 10, 1),
            },
            RecordedImmunization {
                code: "208".into(),
                name: "COVID-19".into(),
                date: date(2023, 9, 15),
            },
        ],
        medications: vec![
            RecordedMedication {
                name: "Metformin".into(),
                dose: "1000mg".into(),
                frequency: "twice daily".into(),
            },
            RecordedMedication {
                name: "Lisinopril".into(),
                dose: "10mg".into(),
                frequency: "once daily".into(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn demo_record_is_deterministic() {
        assert_eq!(demo_record("P001"), demo_record("P001"));
        assert_eq!(demo_record("P002").patient_id, "P002");
    }

    #[test]
    fn lookups_find_latest_dates() {
        let record = demo_record("P001");
        assert!(record.has_condition_prefix(&["E11", "E10"]));
        assert!(record.has_condition_prefix(&["I10", "I11"]));
        assert!(!record.has_condition_prefix(&["J44"]));
        assert_eq!(record.last_procedure("45378"), Some(date(2019, 6, 15)));
        assert_eq!(record.last_lab("4548-4"), Some(date(2023, 10, 15)));
        assert_eq!(record.last_immunization("141"), Some(date(2023, 10, 1)));
        assert_eq!(record.last_procedure("99999"), None);
    }
}
