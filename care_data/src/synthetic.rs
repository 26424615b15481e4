//! Synthetic FHIR bundle generator.
//!
//! Produces entirely synthetic patients with plausible conditions, labs,
//! medications, immunizations, and procedures. Generators take the RNG as a
//! parameter so callers can seed them.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fhir::{
    Bundle, BundleType, Condition, Immunization, MedicationRequest, Observation, Patient,
    Procedure, Resource,
};

const FIRST_NAMES_MALE: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Christopher", "Daniel", "Matthew", "Anthony", "Mark",
];

const FIRST_NAMES_FEMALE: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Barbara", "Elizabeth", "Susan", "Jessica", "Sarah",
    "Karen", "Nancy", "Lisa", "Betty", "Margaret", "Sandra",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson",
];

const CITIES: &[(&str, &str)] = &[
    ("New York", "NY"),
    ("Los Angeles", "CA"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
];

const LANGUAGES: &[&str] = &["en", "es", "zh"];

/// (ICD-10-CM code, display)
const CONDITIONS: &[(&str, &str)] = &[
    ("E11.9", "Type 2 diabetes mellitus without complications"),
    ("I10", "Essential (primary) hypertension"),
    ("J44.9", "Chronic obstructive pulmonary disease, unspecified"),
    ("I50.9", "Heart failure, unspecified"),
    ("E78.5", "Hyperlipidemia, unspecified"),
    ("J45.909", "Unspecified asthma, uncomplicated"),
    ("K21.0", "Gastro-esophageal reflux disease with esophagitis"),
    ("M54.5", "Low back pain"),
    ("F32.9", "Major depressive disorder, single episode, unspecified"),
    ("F41.1", "Generalized anxiety disorder"),
];

/// (RxNorm code, display)
const MEDICATIONS: &[(&str, &str)] = &[
    ("860975", "Metformin 1000 MG"),
    ("197884", "Lisinopril 10 MG"),
    ("617314", "Atorvastatin 20 MG"),
    ("860974", "Metformin 500 MG"),
    ("197885", "Lisinopril 20 MG"),
    ("312961", "Amlodipine 5 MG"),
    ("855332", "Omeprazole 20 MG"),
    ("198188", "Hydrochlorothiazide 25 MG"),
    ("749785", "Sertraline 50 MG"),
    ("866924", "Losartan 50 MG"),
];

/// (CPT code, display)
const PROCEDURES: &[(&str, &str)] = &[
    ("99213", "Office visit, established patient, level 3"),
    ("99214", "Office visit, established patient, level 4"),
    ("99215", "Office visit, established patient, level 5"),
    ("45378", "Colonoscopy, diagnostic"),
    ("77067", "Screening mammography, bilateral"),
    ("36415", "Collection of venous blood by venipuncture"),
    ("71046", "Chest X-ray, 2 views"),
    ("93000", "Electrocardiogram, routine, with interpretation"),
];

/// (LOINC code, display, unit, low, high)
const LAB_TESTS: &[(&str, &str, &str, f64, f64)] = &[
    ("4548-4", "Hemoglobin A1c", "%", 5.0, 12.0),
    ("2345-7", "Glucose [Mass/volume] in Serum or Plasma", "mg/dL", 70.0, 200.0),
    ("2160-0", "Creatinine [Mass/volume] in Serum or Plasma", "mg/dL", 0.6, 2.5),
    ("33914-3", "Glomerular filtration rate/1.73 sq M.predicted", "mL/min", 30.0, 120.0),
    ("2093-3", "Cholesterol [Mass/volume] in Serum or Plasma", "mg/dL", 120.0, 280.0),
    ("13457-7", "LDL Cholesterol", "mg/dL", 50.0, 200.0),
    ("2085-9", "HDL Cholesterol", "mg/dL", 30.0, 90.0),
    ("2571-8", "Triglycerides", "mg/dL", 50.0, 400.0),
];

/// (CVX code, display)
const IMMUNIZATIONS: &[(&str, &str)] = &[
    ("141", "Influenza, seasonal, injectable"),
    ("208", "COVID-19, mRNA, LNP-S"),
    ("33", "Pneumococcal polysaccharide PPV23"),
    ("121", "Zoster vaccine, live"),
    ("113", "Td (adult), adsorbed"),
];

fn patient_id() -> String {
    format!("P{}", &Uuid::new_v4().simple().to_string()[..8].to_uppercase())
}

fn pick<'a, T>(rng: &mut impl Rng, pool: &'a [T]) -> &'a T {
    &pool[rng.gen_range(0..pool.len())]
}

fn random_date(rng: &mut impl Rng, start_year: i32, end_year: i32) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(start_year, 1, 1).expect("static date");
    let end = NaiveDate::from_ymd_opt(end_year, 12, 31).expect("static date");
    let span = (end - start).num_days();
    start + chrono::Duration::days(rng.gen_range(0..=span))
}

pub fn synth_patient(rng: &mut impl Rng) -> Patient {
    let gender = if rng.gen_bool(0.5) { "male" } else { "female" };
    let first_names = if gender == "male" {
        FIRST_NAMES_MALE
    } else {
        FIRST_NAMES_FEMALE
    };
    let (city, state) = *pick(rng, CITIES);

    let birth_year = rng.gen_range(1940..=2000);
    let birth_date = NaiveDate::from_ymd_opt(birth_year, rng.gen_range(1..=12), rng.gen_range(1..=28))
        .expect("day <= 28 is valid in every month");

    Patient {
        id: patient_id(),
        family_name: pick(rng, LAST_NAMES).to_string(),
        given_name: pick(rng, first_names).to_string(),
        gender: gender.to_string(),
        birth_date,
        city: city.to_string(),
        state: state.to_string(),
        postal_code: format!("{}", rng.gen_range(10000..=99999)),
        language: pick(rng, LANGUAGES).to_string(),
    }
}

pub fn synth_condition(rng: &mut impl Rng, subject: &str) -> Condition {
    let (code, display) = *pick(rng, CONDITIONS);
    Condition {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        display: display.to_string(),
        clinical_status: "active".to_string(),
        onset_date: random_date(rng, 2015, 2023),
        subject: subject.to_string(),
    }
}

pub fn synth_observation(rng: &mut impl Rng, subject: &str) -> Observation {
    let (code, display, unit, low, high) = *pick(rng, LAB_TESTS);
    Observation {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        display: display.to_string(),
        value: (rng.gen_range(low..=high) * 10.0).round() / 10.0,
        unit: unit.to_string(),
        effective_date: random_date(rng, 2023, 2024),
        subject: subject.to_string(),
    }
}

pub fn synth_medication_request(rng: &mut impl Rng, subject: &str) -> MedicationRequest {
    let (code, display) = *pick(rng, MEDICATIONS);
    MedicationRequest {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        display: display.to_string(),
        frequency_per_day: if rng.gen_bool(0.5) { 1 } else { 2 },
        authored_on: random_date(rng, 2023, 2024),
        subject: subject.to_string(),
    }
}

pub fn synth_immunization(rng: &mut impl Rng, subject: &str) -> Immunization {
    let (code, display) = *pick(rng, IMMUNIZATIONS);
    Immunization {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        display: display.to_string(),
        occurrence_date: random_date(rng, 2022, 2024),
        subject: subject.to_string(),
    }
}

pub fn synth_procedure(rng: &mut impl Rng, subject: &str) -> Procedure {
    let (code, display) = *pick(rng, PROCEDURES);
    Procedure {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        display: display.to_string(),
        performed_date: random_date(rng, 2022, 2024),
        subject: subject.to_string(),
    }
}

/// Generate a collection bundle for `num_patients` patients with a realistic
/// spread of supporting resources per patient.
pub fn synthetic_bundle(num_patients: usize, rng: &mut impl Rng) -> Bundle {
    let mut bundle = Bundle::new(BundleType::Collection);

    for _ in 0..num_patients {
        let patient = synth_patient(rng);
        let subject = patient.id.clone();
        bundle.push(Resource::Patient(patient));

        for _ in 0..rng.gen_range(2..=5) {
            bundle.push(Resource::Condition(synth_condition(rng, &subject)));
        }
        for _ in 0..rng.gen_range(5..=15) {
            bundle.push(Resource::Observation(synth_observation(rng, &subject)));
        }
        for _ in 0..rng.gen_range(2..=8) {
            bundle.push(Resource::MedicationRequest(synth_medication_request(
                rng, &subject,
            )));
        }
        for _ in 0..rng.gen_range(1..=4) {
            bundle.push(Resource::Immunization(synth_immunization(rng, &subject)));
        }
        for _ in 0..rng.gen_range(2..=6) {
            bundle.push(Resource::Procedure(synth_procedure(rng, &subject)));
        }
    }

    bundle
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generated_at: DateTime<Utc>,
    pub total_patients: usize,
    pub total_resources: usize,
    pub resource_counts: BTreeMap<String, usize>,
}

impl GenerationSummary {
    pub fn for_bundle(bundle: &Bundle) -> Self {
        let resource_counts = bundle
            .resource_counts()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self {
            generated_at: Utc::now(),
            total_patients: bundle.patients().len(),
            total_resources: bundle.entries.len(),
            resource_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bundle_has_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let bundle = synthetic_bundle(10, &mut rng);
        let counts = bundle.resource_counts();

        assert_eq!(counts["Patient"], 10);
        // Per-patient minimums: 2 conditions, 5 observations, 2 medications,
        // 1 immunization, 2 procedures.
        assert!(counts["Condition"] >= 20);
        assert!(counts["Observation"] >= 50);
        assert!(counts["MedicationRequest"] >= 20);
        assert!(counts["Immunization"] >= 10);
        assert!(counts["Procedure"] >= 20);
    }

    #[test]
    fn supporting_resources_reference_their_patient() {
        let mut rng = StdRng::seed_from_u64(7);
        let bundle = synthetic_bundle(1, &mut rng);
        let patient_id = bundle.patients()[0].id.clone();

        for entry in &bundle.entries {
            let subject = match entry {
                Resource::Patient(_) => continue,
                Resource::Condition(c) => &c.subject,
                Resource::Observation(o) => &o.subject,
                Resource::MedicationRequest(m) => &m.subject,
                Resource::Immunization(i) => &i.subject,
                Resource::Procedure(p) => &p.subject,
            };
            assert_eq!(subject, &patient_id);
        }
    }

    #[test]
    fn lab_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let obs = synth_observation(&mut rng, "P1");
            let (_, _, _, low, high) = *LAB_TESTS
                .iter()
                .find(|(code, ..)| *code == obs.code)
                .unwrap();
            assert!(obs.value >= low && obs.value <= high + 0.05, "{}", obs.code);
        }
    }

    #[test]
    fn summary_matches_bundle() {
        let mut rng = StdRng::seed_from_u64(3);
        let bundle = synthetic_bundle(4, &mut rng);
        let summary = GenerationSummary::for_bundle(&bundle);
        assert_eq!(summary.total_patients, 4);
        assert_eq!(summary.total_resources, bundle.entries.len());
        assert_eq!(summary.resource_counts["Patient"], 4);
    }
}
