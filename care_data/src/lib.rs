//! Patient data layer for the CareBridge gateway.
//!
//! Simplified FHIR resource types, the simulated patient record the clinical
//! workflows operate on, and a synthetic bundle generator. All data here is
//! synthetic; nothing resembles real PHI.

pub mod fhir;
pub mod record;
pub mod synthetic;

pub use fhir::{Bundle, BundleType, FhirResource, Patient, Resource};
pub use record::{demo_record, PatientRecord};
pub use synthetic::{synthetic_bundle, GenerationSummary};
