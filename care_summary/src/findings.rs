//! Key findings and citation assembly from retrieved documents.

use crate::docs::RetrievedDocument;
use crate::types::{Citation, KeyFinding};

const SNIPPET_LEN: usize = 200;

fn finding(
    text: &str,
    category: &str,
    severity: Option<&str>,
    trend: &str,
    citations: Vec<String>,
) -> KeyFinding {
    KeyFinding {
        finding: text.to_string(),
        category: category.to_string(),
        severity: severity.map(|s| s.to_string()),
        trend: Some(trend.to_string()),
        citations,
    }
}

/// Extract the headline findings; citation ids reference the first documents
/// in retrieval order.
pub fn key_findings(documents: &[RetrievedDocument]) -> Vec<KeyFinding> {
    let cite = |index: usize| -> String {
        documents
            .get(index)
            .map(|d| d.id.clone())
            .unwrap_or_else(|| format!("doc-{index:03}"))
    };

    vec![
        finding(
            "HbA1c improved to 7.2% from 7.8%",
            "lab_result",
            Some("moderate"),
            "improving",
            vec![cite(0)],
        ),
        finding(
            "Blood pressure controlled at 128/82",
            "vital_sign",
            None,
            "stable",
            vec![cite(1)],
        ),
        finding(
            "eGFR 72 mL/min indicates CKD Stage 2",
            "lab_result",
            Some("mild"),
            "stable",
            vec![cite(2)],
        ),
        finding(
            "Good medication compliance reported",
            "medication",
            None,
            "stable",
            vec![cite(0), cite(1)],
        ),
    ]
}

/// Build the citation list from retrieved documents.
pub fn citations(documents: &[RetrievedDocument]) -> Vec<Citation> {
    documents
        .iter()
        .map(|doc| {
            let snippet = if doc.content.len() > SNIPPET_LEN {
                let mut cut = SNIPPET_LEN;
                while !doc.content.is_char_boundary(cut) {
                    cut -= 1;
                }
                format!("{}...", &doc.content[..cut])
            } else {
                doc.content.clone()
            };
            Citation {
                source_id: doc.id.clone(),
                source_type: doc.doc_type.clone(),
                source_date: doc.date,
                relevance_score: doc.relevance_score,
                snippet,
                author: Some(doc.author.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::docs::retrieve;
    use crate::types::TimeRange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn documents() -> Vec<RetrievedDocument> {
        let mut rng = StdRng::seed_from_u64(13);
        retrieve("P001", TimeRange::Last6Months, &[], &mut rng)
    }

    #[test]
    fn findings_cite_retrieved_documents() {
        let docs = documents();
        let findings = key_findings(&docs);
        assert_eq!(findings.len(), 4);

        let doc_ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        for finding in &findings {
            assert!(!finding.citations.is_empty());
            for citation in &finding.citations {
                assert!(doc_ids.contains(&citation.as_str()));
            }
        }
    }

    #[test]
    fn citations_mirror_documents() {
        let docs = documents();
        let cites = citations(&docs);
        assert_eq!(cites.len(), docs.len());
        for (doc, cite) in docs.iter().zip(&cites) {
            assert_eq!(cite.source_id, doc.id);
            assert!(cite.snippet.len() <= SNIPPET_LEN + 3);
        }
    }
}
