//! Hash-chained audit log.
//!
//! Every clinical operation appends an entry whose SHA-256 hash commits to the
//! entry's own fields plus the hash of the previous entry, so any edit to a
//! recorded entry breaks the chain from that point on. The log is an injected
//! store shared behind an `Arc`, not a process-global.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

/// Hash seed for the first entry in a chain.
pub const GENESIS_HASH: &str = "genesis_0000000000000000";

/// Detail values longer than this are truncated before hashing.
const MAX_DETAIL_LEN: usize = 1000;

/// Detail keys containing any of these fragments are redacted. PHI must not
/// appear in audit records in clear text.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "ssn",
    "social_security",
    "dob",
    "date_of_birth",
    "address",
    "phone",
    "email",
    "mrn",
    "insurance_id",
];

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log lock poisoned")]
    LockPoisoned,
    #[error("failed to serialize audit entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Single audit record. `hash` covers every other field, including
/// `previous_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub entry_id: String,
    pub timestamp: DateTime<Utc>,
    pub component: String,
    pub operation: String,
    pub actor: String,
    pub details: JsonValue,
    pub previous_hash: String,
    pub hash: String,
}

impl AuditEntry {
    /// Recompute this entry's hash from its fields.
    pub fn compute_hash(&self) -> Result<String, AuditError> {
        hash_fields(
            &self.entry_id,
            &self.timestamp,
            &self.component,
            &self.operation,
            &self.actor,
            &self.details,
            &self.previous_hash,
        )
    }
}

#[derive(Serialize)]
struct HashView<'a> {
    entry_id: &'a str,
    timestamp: &'a DateTime<Utc>,
    component: &'a str,
    operation: &'a str,
    actor: &'a str,
    details: &'a JsonValue,
    previous_hash: &'a str,
}

fn hash_fields(
    entry_id: &str,
    timestamp: &DateTime<Utc>,
    component: &str,
    operation: &str,
    actor: &str,
    details: &JsonValue,
    previous_hash: &str,
) -> Result<String, AuditError> {
    let view = HashView {
        entry_id,
        timestamp,
        component,
        operation,
        actor,
        details,
        previous_hash,
    };
    // serde_json's default map is ordered by key, so the encoding is canonical.
    let encoded = serde_json::to_string(&view)?;
    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Redact sensitive keys and truncate oversized values before an entry is
/// hashed and stored.
pub fn sanitize_details(details: JsonValue) -> JsonValue {
    match details {
        JsonValue::Object(map) => {
            let sanitized = map
                .into_iter()
                .map(|(key, value)| {
                    let lower = key.to_lowercase();
                    if SENSITIVE_KEY_FRAGMENTS.iter().any(|s| lower.contains(s)) {
                        (key, JsonValue::String("[REDACTED]".to_string()))
                    } else if let JsonValue::String(s) = &value {
                        if s.len() > MAX_DETAIL_LEN {
                            let tag = format!("[TRUNCATED:{} chars]", s.len());
                            (key, JsonValue::String(tag))
                        } else {
                            (key, value)
                        }
                    } else {
                        (key, value)
                    }
                })
                .collect();
            JsonValue::Object(sanitized)
        }
        other => other,
    }
}

/// Chain verification outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainVerification {
    pub verified: bool,
    pub entries_checked: usize,
    pub failures: Vec<ChainFailure>,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainFailure {
    pub entry_id: String,
    pub error: ChainFailureKind,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChainFailureKind {
    HashMismatch,
    ChainBreak,
}

/// Verify an entry slice independently of any particular log instance.
pub fn verify_entries(entries: &[AuditEntry]) -> Result<ChainVerification, AuditError> {
    let mut failures = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        if entry.hash != entry.compute_hash()? {
            failures.push(ChainFailure {
                entry_id: entry.entry_id.clone(),
                error: ChainFailureKind::HashMismatch,
                position: i,
            });
        }
        if i > 0 && entry.previous_hash != entries[i - 1].hash {
            failures.push(ChainFailure {
                entry_id: entry.entry_id.clone(),
                error: ChainFailureKind::ChainBreak,
                position: i,
            });
        }
    }

    Ok(ChainVerification {
        verified: failures.is_empty(),
        entries_checked: entries.len(),
        failures,
        verified_at: Utc::now(),
    })
}

/// The slice of a chain produced by one request, embedded in responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditTrail {
    pub entries: Vec<AuditEntry>,
    pub head: Option<String>,
}

impl AuditTrail {
    pub fn push(&mut self, entry: AuditEntry) {
        self.head = Some(entry.hash.clone());
        self.entries.push(entry);
    }
}

/// Filters for querying recorded entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilter {
    pub component: Option<String>,
    pub operation: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Aggregate counts over the whole chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_entries: usize,
    pub first_entry: Option<DateTime<Utc>>,
    pub last_entry: Option<DateTime<Utc>>,
    pub components: BTreeMap<String, usize>,
    pub operations: BTreeMap<String, usize>,
    pub chain_verified: bool,
}

/// Append-only audit log. Appends lock the store so the previous-hash lookup
/// and the push are one atomic step.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an auditable operation and return the stored entry.
    pub fn append(
        &self,
        component: &str,
        operation: &str,
        actor: &str,
        details: JsonValue,
    ) -> Result<AuditEntry, AuditError> {
        let details = sanitize_details(details);
        let mut entries = self.entries.lock().map_err(|_| AuditError::LockPoisoned)?;

        let previous_hash = entries
            .last()
            .map(|e| e.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let entry_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now();
        let hash = hash_fields(
            &entry_id,
            &timestamp,
            component,
            operation,
            actor,
            &details,
            &previous_hash,
        )?;

        let entry = AuditEntry {
            entry_id,
            timestamp,
            component: component.to_string(),
            operation: operation.to_string(),
            actor: actor.to_string(),
            details,
            previous_hash,
            hash,
        };

        tracing::info!(
            component = %entry.component,
            operation = %entry.operation,
            actor = %entry.actor,
            hash = &entry.hash[..16],
            "audit_entry"
        );

        entries.push(entry.clone());
        Ok(entry)
    }

    /// Record access to protected health information.
    pub fn log_phi_access(
        &self,
        component: &str,
        actor: &str,
        patient_id: &str,
        data_type: &str,
        purpose: &str,
    ) -> Result<AuditEntry, AuditError> {
        self.append(
            component,
            "phi_access",
            actor,
            serde_json::json!({
                "patient_id": patient_id,
                "data_type": data_type,
                "purpose": purpose,
                "hipaa_category": "access_control",
            }),
        )
    }

    /// Record a model inference with its cost and latency.
    pub fn log_model_inference(
        &self,
        component: &str,
        model_id: &str,
        model_version: &str,
        latency_ms: f64,
        cost_usd: f64,
    ) -> Result<AuditEntry, AuditError> {
        self.append(
            component,
            "model_inference",
            "system",
            serde_json::json!({
                "model_id": model_id,
                "model_version": model_version,
                "latency_ms": latency_ms,
                "cost_usd": cost_usd,
            }),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify the whole chain.
    pub fn verify(&self) -> Result<ChainVerification, AuditError> {
        let entries = self.entries.lock().map_err(|_| AuditError::LockPoisoned)?;
        verify_entries(&entries)
    }

    /// Query entries, newest last, capped at `limit`.
    pub fn entries(&self, filter: &EntryFilter, limit: usize) -> Result<Vec<AuditEntry>, AuditError> {
        let entries = self.entries.lock().map_err(|_| AuditError::LockPoisoned)?;
        let matching: Vec<AuditEntry> = entries
            .iter()
            .filter(|e| {
                filter
                    .component
                    .as_ref()
                    .map_or(true, |c| &e.component == c)
                    && filter.operation.as_ref().map_or(true, |o| &e.operation == o)
                    && filter.since.map_or(true, |t| e.timestamp >= t)
                    && filter.until.map_or(true, |t| e.timestamp <= t)
            })
            .cloned()
            .collect();
        let start = matching.len().saturating_sub(limit);
        Ok(matching[start..].to_vec())
    }

    pub fn summary(&self) -> Result<AuditSummary, AuditError> {
        let entries = self.entries.lock().map_err(|_| AuditError::LockPoisoned)?;

        let mut components = BTreeMap::new();
        let mut operations = BTreeMap::new();
        for entry in entries.iter() {
            *components.entry(entry.component.clone()).or_insert(0) += 1;
            *operations.entry(entry.operation.clone()).or_insert(0) += 1;
        }

        let verification = verify_entries(&entries)?;
        Ok(AuditSummary {
            total_entries: entries.len(),
            first_entry: entries.first().map(|e| e.timestamp),
            last_entry: entries.last().map(|e| e.timestamp),
            components,
            operations,
            chain_verified: verification.verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn append_links_entries() {
        let log = AuditLog::new();
        let first = log
            .append("care-gaps", "detect_gaps_started", "system", json!({"n": 1}))
            .unwrap();
        let second = log
            .append("care-gaps", "gaps_evaluated", "system", json!({"n": 2}))
            .unwrap();

        assert_eq!(first.previous_hash, GENESIS_HASH);
        assert_eq!(second.previous_hash, first.hash);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn chain_verifies_clean_and_detects_tampering() {
        let log = AuditLog::new();
        for i in 0..5 {
            log.append("readmission", "prediction", "system", json!({"i": i}))
                .unwrap();
        }
        let verification = log.verify().unwrap();
        assert!(verification.verified);
        assert_eq!(verification.entries_checked, 5);

        let mut entries = log.entries(&EntryFilter::default(), 100).unwrap();
        entries[2].details = json!({"i": 999});
        let tampered = verify_entries(&entries).unwrap();
        assert!(!tampered.verified);
        assert!(tampered
            .failures
            .iter()
            .any(|f| f.error == ChainFailureKind::HashMismatch && f.position == 2));
    }

    #[test]
    fn broken_linkage_is_reported() {
        let log = AuditLog::new();
        log.append("a", "op", "system", json!({})).unwrap();
        log.append("a", "op", "system", json!({})).unwrap();

        let mut entries = log.entries(&EntryFilter::default(), 100).unwrap();
        entries[1].previous_hash = "bogus".to_string();
        // Rehash so only the linkage is wrong, not the entry itself.
        entries[1].hash = entries[1].compute_hash().unwrap();

        let result = verify_entries(&entries).unwrap();
        assert!(!result.verified);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].error, ChainFailureKind::ChainBreak);
    }

    #[test]
    fn details_are_sanitized() {
        let log = AuditLog::new();
        let entry = log
            .append(
                "summarization",
                "phi_scan",
                "system",
                json!({
                    "patient_ssn": "123-45-6789",
                    "note": "x".repeat(2000),
                    "count": 3,
                }),
            )
            .unwrap();

        assert_eq!(entry.details["patient_ssn"], "[REDACTED]");
        assert_eq!(entry.details["note"], "[TRUNCATED:2000 chars]");
        assert_eq!(entry.details["count"], 3);
    }

    #[test]
    fn filters_and_limit() {
        let log = AuditLog::new();
        log.append("care-gaps", "detect", "system", json!({})).unwrap();
        log.append("readmission", "predict", "system", json!({}))
            .unwrap();
        log.append("readmission", "predict", "system", json!({}))
            .unwrap();

        let filter = EntryFilter {
            component: Some("readmission".to_string()),
            ..Default::default()
        };
        assert_eq!(log.entries(&filter, 100).unwrap().len(), 2);
        assert_eq!(log.entries(&filter, 1).unwrap().len(), 1);
    }

    #[test]
    fn summary_counts_by_component_and_operation() {
        let log = AuditLog::new();
        log.log_phi_access("care-gaps", "system", "P001", "conditions", "gap detection")
            .unwrap();
        log.log_model_inference("readmission", "readmission-risk-v2", "2.1.0", 12.0, 0.0031)
            .unwrap();

        let summary = log.summary().unwrap();
        assert_eq!(summary.total_entries, 2);
        assert_eq!(summary.components.get("care-gaps"), Some(&1));
        assert_eq!(summary.operations.get("model_inference"), Some(&1));
        assert!(summary.chain_verified);
    }
}
