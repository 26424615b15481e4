//! Simulated document retrieval.
//!
//! Stands in for a vector-search service: the same five clinical documents
//! come back for every patient, dated inside the requested window.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TimeRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub doc_type: String,
    pub date: DateTime<Utc>,
    pub author: String,
    pub content: String,
    pub relevance_score: f64,
}

fn doc_id() -> String {
    format!("doc-{}", &Uuid::new_v4().simple().to_string()[..8])
}

fn document(
    doc_type: &str,
    days_ago: i64,
    author: &str,
    content: &str,
    relevance_score: f64,
) -> RetrievedDocument {
    RetrievedDocument {
        id: doc_id(),
        doc_type: doc_type.to_string(),
        date: Utc::now() - Duration::days(days_ago),
        author: author.to_string(),
        content: content.to_string(),
        relevance_score,
    }
}

/// Retrieve the canned document set, optionally filtered by type.
pub fn retrieve(
    _patient_id: &str,
    time_range: TimeRange,
    document_types: &[String],
    rng: &mut impl Rng,
) -> Vec<RetrievedDocument> {
    // Dates are jittered inside each document's natural recency band, capped
    // at the requested window.
    let window = time_range.days();
    let mut draw = |lo: i64, hi: i64| {
        let hi = hi.min(window).max(1);
        let lo = lo.min(hi);
        rng.gen_range(lo..=hi)
    };

    let mut documents = vec![
        document(
            "progress_note",
            draw(1, 30),
            "Dr. Smith, MD",
            "Patient presents with well-controlled Type 2 diabetes. HbA1c 7.2% (down from 7.8%). \
             Blood pressure 128/82. Continue current medications. Follow up in 3 months.",
            0.94,
        ),
        document(
            "lab_result",
            draw(5, 45),
            "Lab System",
            "Comprehensive Metabolic Panel: Glucose 142 mg/dL (H), Creatinine 1.1 mg/dL, \
             eGFR 72 mL/min. Lipid Panel: Total Cholesterol 185, LDL 98, HDL 52, Triglycerides 175.",
            0.91,
        ),
        document(
            "progress_note",
            draw(60, 120),
            "Dr. Johnson, MD",
            "Hypertension management visit. Patient reports good compliance with Lisinopril. \
             BP today 134/84. Discussed lifestyle modifications including reduced sodium intake.",
            0.87,
        ),
        document(
            "medication_order",
            draw(1, 60),
            "Dr. Smith, MD",
            "Metformin 1000mg twice daily. Lisinopril 10mg once daily. Atorvastatin 20mg once daily.",
            0.85,
        ),
        document(
            "imaging_report",
            draw(30, 90),
            "Dr. Lee, Radiologist",
            "Chest X-ray: No acute cardiopulmonary process. Heart size normal. \
             Lungs are clear without focal consolidation or pleural effusion.",
            0.72,
        ),
    ];

    if !document_types.is_empty() {
        documents.retain(|d| document_types.contains(&d.doc_type));
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn retrieves_five_documents_by_default() {
        let mut rng = StdRng::seed_from_u64(5);
        let docs = retrieve("P001", TimeRange::Last6Months, &[], &mut rng);
        assert_eq!(docs.len(), 5);
        for doc in &docs {
            assert!(doc.id.starts_with("doc-"));
            assert!((0.0..=1.0).contains(&doc.relevance_score));
            assert!(doc.date <= Utc::now());
        }
    }

    #[test]
    fn type_filter_narrows_results() {
        let mut rng = StdRng::seed_from_u64(5);
        let docs = retrieve(
            "P001",
            TimeRange::LastYear,
            &["progress_note".to_string()],
            &mut rng,
        );
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.doc_type == "progress_note"));
    }

    #[test]
    fn narrow_window_still_yields_documents() {
        let mut rng = StdRng::seed_from_u64(5);
        let docs = retrieve("P001", TimeRange::LastVisit, &[], &mut rng);
        assert_eq!(docs.len(), 5);
    }
}
