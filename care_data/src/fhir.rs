//! Flat FHIR-style resource types.
//!
//! These carry only the fields the gateway actually reads; they are not a
//! full FHIR R4 model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub trait FhirResource {
    fn resource_type(&self) -> &'static str;
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub family_name: String,
    pub given_name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub language: String,
}

impl FhirResource for Patient {
    fn resource_type(&self) -> &'static str {
        "Patient"
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub id: String,
    /// ICD-10-CM code.
    pub code: String,
    pub display: String,
    pub clinical_status: String,
    pub onset_date: NaiveDate,
    pub subject: String,
}

impl FhirResource for Condition {
    fn resource_type(&self) -> &'static str {
        "Condition"
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub id: String,
    /// LOINC code.
    pub code: String,
    pub display: String,
    pub value: f64,
    pub unit: String,
    pub effective_date: NaiveDate,
    pub subject: String,
}

impl FhirResource for Observation {
    fn resource_type(&self) -> &'static str {
        "Observation"
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRequest {
    pub id: String,
    /// RxNorm code.
    pub code: String,
    pub display: String,
    pub frequency_per_day: u8,
    pub authored_on: NaiveDate,
    pub subject: String,
}

impl FhirResource for MedicationRequest {
    fn resource_type(&self) -> &'static str {
        "MedicationRequest"
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Immunization {
    pub id: String,
    /// CVX code.
    pub code: String,
    pub display: String,
    pub occurrence_date: NaiveDate,
    pub subject: String,
}

impl FhirResource for Immunization {
    fn resource_type(&self) -> &'static str {
        "Immunization"
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Procedure {
    pub id: String,
    /// CPT code.
    pub code: String,
    pub display: String,
    pub performed_date: NaiveDate,
    pub subject: String,
}

impl FhirResource for Procedure {
    fn resource_type(&self) -> &'static str {
        "Procedure"
    }
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "resource_type")]
pub enum Resource {
    Patient(Patient),
    Condition(Condition),
    Observation(Observation),
    MedicationRequest(MedicationRequest),
    Immunization(Immunization),
    Procedure(Procedure),
}

impl Resource {
    pub fn type_name(&self) -> &'static str {
        match self {
            Resource::Patient(r) => r.resource_type(),
            Resource::Condition(r) => r.resource_type(),
            Resource::Observation(r) => r.resource_type(),
            Resource::MedicationRequest(r) => r.resource_type(),
            Resource::Immunization(r) => r.resource_type(),
            Resource::Procedure(r) => r.resource_type(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Collection,
    Searchset,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bundle {
    #[serde(rename = "type")]
    pub bundle_type: BundleType,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub entries: Vec<Resource>,
}

impl Bundle {
    pub fn new(bundle_type: BundleType) -> Self {
        Self {
            bundle_type,
            timestamp: chrono::Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, resource: Resource) {
        self.entries.push(resource);
    }

    /// Patients contained in this bundle.
    pub fn patients(&self) -> Vec<&Patient> {
        self.entries
            .iter()
            .filter_map(|r| match r {
                Resource::Patient(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Count of entries per resource type.
    pub fn resource_counts(&self) -> std::collections::BTreeMap<&'static str, usize> {
        let mut counts = std::collections::BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.type_name()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Patient {
        Patient {
            id: "P001".into(),
            family_name: "Doe".into(),
            given_name: "Jane".into(),
            gender: "female".into(),
            birth_date: NaiveDate::from_ymd_opt(1966, 3, 12).unwrap(),
            city: "Chicago".into(),
            state: "IL".into(),
            postal_code: "60601".into(),
            language: "en".into(),
        }
    }

    #[test]
    fn patient_serializes_with_iso_dates() {
        let json = serde_json::to_value(jane()).unwrap();
        assert_eq!(json["birth_date"], "1966-03-12");
        assert_eq!(json["gender"], "female");
    }

    #[test]
    fn resource_enum_is_tagged() {
        let resource = Resource::Patient(jane());
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["resource_type"], "Patient");

        let back: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn bundle_counts_resources() {
        let mut bundle = Bundle::new(BundleType::Collection);
        bundle.push(Resource::Patient(jane()));
        bundle.push(Resource::Condition(Condition {
            id: "c1".into(),
            code: "E11.9".into(),
            display: "Type 2 diabetes".into(),
            clinical_status: "active".into(),
            onset_date: NaiveDate::from_ymd_opt(2019, 3, 15).unwrap(),
            subject: "P001".into(),
        }));

        let counts = bundle.resource_counts();
        assert_eq!(counts["Patient"], 1);
        assert_eq!(counts["Condition"], 1);
        assert_eq!(bundle.patients().len(), 1);
    }
}
