//! Care-gap detection.
//!
//! Applies preventive-care guidelines (USPSTF screening intervals, ACIP
//! immunization schedules, HEDIS chronic-disease measures) to a patient's
//! record and reports the care actions that are due.

pub mod guidelines;
pub mod rules;
pub mod workflow;

pub use rules::{CareGap, CareGapPriority, CareGapType, GapFeatures};
pub use workflow::{CareGapError, CareGapReport, CareGapWorkflow, CohortSummary, GapClosure};
