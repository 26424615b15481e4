//! 30-day readmission risk prediction.
//!
//! The "model" is a hand-tuned additive score over utilization, clinical,
//! social, and demographic features, clamped to [0.02, 0.95]. It stands in
//! for a served ensemble; the surrounding plumbing (feature retrieval, tier
//! assignment, factor explanations, intervention matching, governance
//! reporting) mirrors the production shape.

pub mod explain;
pub mod features;
pub mod governance;
pub mod interventions;
pub mod model;
pub mod workflow;

pub use explain::ContributingFactor;
pub use features::FeatureVector;
pub use governance::ModelGovernance;
pub use interventions::Intervention;
pub use model::RiskTier;
pub use workflow::{BatchPrediction, ReadmissionError, ReadmissionWorkflow, RiskPrediction};
