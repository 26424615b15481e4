//! Clinical summarization.
//!
//! Simulates a retrieval-augmented pipeline: canned document retrieval, one
//! pre-written summary per summary type, a PHI scan over the output, and
//! citation grounding. No retrieval index or language model is involved.

pub mod docs;
pub mod findings;
pub mod phi;
pub mod templates;
pub mod types;
pub mod workflow;

pub use types::{
    Citation, ClinicalSummary, KeyFinding, PhiAudit, RagMetrics, SummaryOptions, SummaryType,
    TimeRange,
};
pub use workflow::{SummarizationError, SummarizationWorkflow};
