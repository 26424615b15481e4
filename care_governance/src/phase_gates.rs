//! Twelve-phase delivery gate registry.
//!
//! Phases 1-3 (Q1) cover diagnostics, 4-6 (Q2) architecture, 7-9 (Q3)
//! engineering, and 10-12 (Q4) enablement. Each gate carries explicit exit
//! contracts and the registry tracks five standing kill criteria.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("phase {0} not found")]
    UnknownPhase(u8),
    #[error("phase gate registry lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateType {
    HumanJudgmentGate,
    EconomicGate,
    IrreversibilityFlag,
    CostTelemetry,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    PendingReview,
    Approved,
    Blocked,
}

/// Exit contract with four components; a phase may exit only when all four
/// are satisfied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExitContract {
    pub truth_satisfied: bool,
    pub economic_satisfied: bool,
    pub risk_satisfied: bool,
    pub ownership_satisfied: bool,
}

impl ExitContract {
    pub fn is_complete(&self) -> bool {
        self.truth_satisfied
            && self.economic_satisfied
            && self.risk_satisfied
            && self.ownership_satisfied
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseGate {
    pub phase_number: u8,
    pub phase_name: String,
    pub quarter: String,
    pub description: String,
    pub gate_types: Vec<GateType>,
    pub status: PhaseStatus,
    pub exit_contract: ExitContract,
    pub evidence_pack_id: String,
    pub required_artifacts: Vec<String>,
    pub reviewers: Vec<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
}

/// Standing condition that forces a halt or sunset review when breached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillCriterion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub threshold: String,
    pub action: String,
    pub owner: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseExitCheck {
    pub phase: u8,
    pub phase_name: String,
    pub can_exit: bool,
    pub contract: ExitContract,
    pub required_artifacts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalReceipt {
    pub phase: u8,
    pub approved_at: DateTime<Utc>,
    pub approved_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterSummary {
    pub phases: Vec<u8>,
    pub human_aim: String,
    pub gate: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookSummary {
    pub playbook_version: String,
    pub quarters: BTreeMap<String, QuarterSummary>,
    pub current_phase: u8,
    pub phases_completed: usize,
    pub total_phases: usize,
}

fn gate(
    number: u8,
    name: &str,
    quarter: &str,
    description: &str,
    gate_types: Vec<GateType>,
    status: PhaseStatus,
    artifacts: &[&str],
    reviewers: &[&str],
) -> PhaseGate {
    PhaseGate {
        phase_number: number,
        phase_name: name.to_string(),
        quarter: quarter.to_string(),
        description: description.to_string(),
        gate_types,
        status,
        exit_contract: ExitContract::default(),
        evidence_pack_id: format!("PH{number}-EVID-1"),
        required_artifacts: artifacts.iter().map(|a| a.to_string()).collect(),
        reviewers: reviewers.iter().map(|r| r.to_string()).collect(),
        approved_at: None,
        approved_by: None,
    }
}

fn seed_gates() -> BTreeMap<u8, PhaseGate> {
    use GateType::*;
    use PhaseStatus::*;

    [
        gate(
            1,
            "Ontology",
            "Q1",
            "Define conceptual foundation - entities, relationships, boundaries",
            vec![HumanJudgmentGate],
            Approved,
            &[
                "Expert stakeholder map",
                "Concept glossary",
                "Relationship diagram",
                "Contested concept log",
            ],
            &["Domain Lead", "Product"],
        ),
        gate(
            2,
            "Problem Space",
            "Q1",
            "Define boundaries, validate assumptions, stress-test problem definition",
            vec![HumanJudgmentGate, IrreversibilityFlag],
            Approved,
            &[
                "Boundary stress tests",
                "Edge case matrix",
                "Scope validation results",
            ],
            &["Tech Lead", "Product"],
        ),
        gate(
            3,
            "Discovery",
            "Q1",
            "Gather requirements from multiple perspectives",
            vec![HumanJudgmentGate],
            Approved,
            &[
                "Stakeholder interview notes",
                "Data inventory",
                "Regulatory constraint map",
            ],
            &["Product", "Compliance"],
        ),
        gate(
            4,
            "Alignment & Design",
            "Q2",
            "Lock stakeholder alignment, design end-to-end architecture",
            vec![HumanJudgmentGate, EconomicGate, IrreversibilityFlag],
            Approved,
            &[
                "Architecture ROI pack",
                "Stakeholder sign-off matrix",
                "Risk acceptance docs",
            ],
            &["Exec Sponsor", "Finance"],
        ),
        gate(
            5,
            "Integration",
            "Q2",
            "Connect ML system to infrastructure, APIs, data sources",
            vec![HumanJudgmentGate],
            Approved,
            &[
                "IaC validation logs",
                "Schema version registry",
                "Security scan results",
            ],
            &["Platform Lead", "Security"],
        ),
        gate(
            6,
            "Build",
            "Q2",
            "Construct model, pipelines, infrastructure with reproducibility",
            vec![HumanJudgmentGate, CostTelemetry],
            Approved,
            &[
                "Baseline model metrics",
                "Telemetry contract",
                "Reproducibility proof",
            ],
            &["ML Lead", "SRE"],
        ),
        gate(
            7,
            "Validation",
            "Q3",
            "Rigorous testing - functional, performance, fairness, security",
            vec![HumanJudgmentGate],
            Approved,
            &[
                "Test suite results",
                "Bias audit",
                "Red team report",
                "Pen test findings",
            ],
            &["QA Lead", "Security"],
        ),
        gate(
            8,
            "Pre-Production",
            "Q3",
            "Staging environment, load testing, final sign-off",
            vec![HumanJudgmentGate, EconomicGate, CostTelemetry],
            Approved,
            &[
                "Load test results",
                "Canary metrics",
                "Rollback verification",
                "Kill drill results",
            ],
            &["SRE Lead", "Ops"],
        ),
        gate(
            9,
            "Hypercare",
            "Q3",
            "Intensive post-launch support, high-touch monitoring",
            vec![HumanJudgmentGate],
            Approved,
            &[
                "Launch checklist",
                "Escalation log",
                "Rapid iteration tracking",
            ],
            &["Product", "Support Lead"],
        ),
        gate(
            10,
            "Production",
            "Q4",
            "Full production rollout with monitoring and scaling",
            vec![HumanJudgmentGate],
            Approved,
            &[
                "Deployment verification",
                "Autoscaling proof",
                "Rollback test results",
            ],
            &["SRE", "Platform Lead"],
        ),
        gate(
            11,
            "Reliability",
            "Q4",
            "Establish operational excellence - observability, incident response",
            vec![HumanJudgmentGate],
            InProgress,
            &[
                "Observability dashboard",
                "On-call rotation",
                "Decay detection baseline",
            ],
            &["SRE Lead", "ML Lead"],
        ),
        gate(
            12,
            "Continuous Improvement",
            "Q4",
            "Automation, documentation, architecture reviews, ROI validation",
            vec![HumanJudgmentGate, EconomicGate],
            NotStarted,
            &[
                "Automation inventory",
                "Knowledge transfer docs",
                "Next iteration brief",
            ],
            &["Tech Lead", "Product"],
        ),
    ]
    .into_iter()
    .map(|g| (g.phase_number, g))
    .collect()
}

fn seed_kill_criteria() -> Vec<KillCriterion> {
    let criterion = |id: &str, name: &str, description: &str, threshold: &str, action: &str, owner: &str| {
        KillCriterion {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            threshold: threshold.to_string(),
            action: action.to_string(),
            owner: owner.to_string(),
            status: "not_triggered".to_string(),
        }
    };

    vec![
        criterion(
            "KILL-001",
            "ROI Collapse",
            "Cost per inference exceeds value for 2 consecutive months",
            "cost_value_ratio > 1.0 for 60 days",
            "Initiate sunset review",
            "CTO + CFO",
        ),
        criterion(
            "KILL-002",
            "Consequential Error Spike",
            "Weighted error cost exceeds $50K in any month",
            "error_cost_monthly > 50000",
            "Convene incident review within 48 hours",
            "CTO",
        ),
        criterion(
            "KILL-003",
            "Compliance Gap",
            "Any material compliance gap",
            "compliance_gap = true",
            "Halt new feature deployment",
            "General Counsel",
        ),
        criterion(
            "KILL-004",
            "Model Performance Decay",
            "Accuracy drift exceeds 15% from baseline",
            "accuracy_decay > 0.15",
            "Trigger retraining or rollback",
            "ML Lead",
        ),
        criterion(
            "KILL-005",
            "PHI Exposure",
            "Any confirmed PHI exposure incident",
            "phi_exposure = true",
            "Immediate system halt and incident response",
            "CISO + Compliance",
        ),
    ]
}

/// Thread-safe registry over all twelve gates.
pub struct PhaseGateRegistry {
    gates: RwLock<BTreeMap<u8, PhaseGate>>,
    kill_criteria: Vec<KillCriterion>,
}

impl Default for PhaseGateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseGateRegistry {
    pub fn new() -> Self {
        Self {
            gates: RwLock::new(seed_gates()),
            kill_criteria: seed_kill_criteria(),
        }
    }

    pub fn gate(&self, phase: u8) -> Result<PhaseGate, GateError> {
        let gates = self.gates.read().map_err(|_| GateError::LockPoisoned)?;
        gates
            .get(&phase)
            .cloned()
            .ok_or(GateError::UnknownPhase(phase))
    }

    /// First in-progress or pending-review phase; production (10) when every
    /// gate is settled.
    pub fn current_phase(&self) -> Result<PhaseGate, GateError> {
        let gates = self.gates.read().map_err(|_| GateError::LockPoisoned)?;
        let active = gates.values().find(|g| {
            matches!(g.status, PhaseStatus::InProgress | PhaseStatus::PendingReview)
        });
        match active {
            Some(g) => Ok(g.clone()),
            None => gates
                .get(&10)
                .cloned()
                .ok_or(GateError::UnknownPhase(10)),
        }
    }

    pub fn all_gates(&self) -> Result<Vec<PhaseGate>, GateError> {
        let gates = self.gates.read().map_err(|_| GateError::LockPoisoned)?;
        Ok(gates.values().cloned().collect())
    }

    pub fn kill_criteria(&self) -> &[KillCriterion] {
        &self.kill_criteria
    }

    pub fn check_phase_exit(&self, phase: u8) -> Result<PhaseExitCheck, GateError> {
        let gate = self.gate(phase)?;
        Ok(PhaseExitCheck {
            phase,
            phase_name: gate.phase_name,
            can_exit: gate.exit_contract.is_complete(),
            contract: gate.exit_contract,
            required_artifacts: gate.required_artifacts,
        })
    }

    pub fn approve_phase(&self, phase: u8, approver: &str) -> Result<ApprovalReceipt, GateError> {
        let mut gates = self.gates.write().map_err(|_| GateError::LockPoisoned)?;
        let gate = gates.get_mut(&phase).ok_or(GateError::UnknownPhase(phase))?;

        let now = Utc::now();
        gate.status = PhaseStatus::Approved;
        gate.approved_at = Some(now);
        gate.approved_by = Some(approver.to_string());

        tracing::info!(phase, phase_name = %gate.phase_name, approver, "phase_gate_approved");

        Ok(ApprovalReceipt {
            phase,
            approved_at: now,
            approved_by: approver.to_string(),
        })
    }

    pub fn playbook_summary(&self) -> Result<PlaybookSummary, GateError> {
        let gates = self.gates.read().map_err(|_| GateError::LockPoisoned)?;

        let quarter = |phases: &[u8], aim: &str, gate_desc: &str| {
            let status = if phases.iter().all(|p| {
                gates
                    .get(p)
                    .map(|g| g.status == PhaseStatus::Approved)
                    .unwrap_or(false)
            }) {
                "complete"
            } else {
                "in_progress"
            };
            QuarterSummary {
                phases: phases.to_vec(),
                human_aim: aim.to_string(),
                gate: gate_desc.to_string(),
                status: status.to_string(),
            }
        };

        let mut quarters = BTreeMap::new();
        quarters.insert(
            "Q1_Diagnostics".to_string(),
            quarter(
                &[1, 2, 3],
                "Align people on reality before building anything expensive",
                "Problem & success definition locked; baseline approved",
            ),
        );
        quarters.insert(
            "Q2_Architect".to_string(),
            quarter(
                &[4, 5, 6],
                "Reduce ambiguity so teams stop arguing and start shipping",
                "Architecture review passed; security/compliance accepted",
            ),
        );
        quarters.insert(
            "Q3_Engineer".to_string(),
            quarter(
                &[7, 8, 9],
                "Build with guardrails so operators don't carry risk",
                "Validation suite green; risk controls implemented",
            ),
        );
        quarters.insert(
            "Q4_Enable".to_string(),
            quarter(
                &[10, 11, 12],
                "Make the system survivable after handoff",
                "Production readiness met; monitoring live; owner assigned",
            ),
        );

        let phases_completed = gates
            .values()
            .filter(|g| g.status == PhaseStatus::Approved)
            .count();
        let current = gates
            .values()
            .find(|g| {
                matches!(g.status, PhaseStatus::InProgress | PhaseStatus::PendingReview)
            })
            .map(|g| g.phase_number)
            .unwrap_or(10);

        Ok(PlaybookSummary {
            playbook_version: "7.5".to_string(),
            quarters,
            current_phase: current,
            phases_completed,
            total_phases: gates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_twelve_sequential_phases() {
        let registry = PhaseGateRegistry::new();
        let gates = registry.all_gates().unwrap();
        assert_eq!(gates.len(), 12);
        for (i, gate) in gates.iter().enumerate() {
            assert_eq!(gate.phase_number as usize, i + 1);
        }
    }

    #[test]
    fn phases_map_to_quarters() {
        let registry = PhaseGateRegistry::new();
        for (phases, quarter) in [
            (1..=3, "Q1"),
            (4..=6, "Q2"),
            (7..=9, "Q3"),
            (10..=12, "Q4"),
        ] {
            for phase in phases {
                assert_eq!(registry.gate(phase).unwrap().quarter, quarter);
            }
        }
    }

    #[test]
    fn phase_four_carries_all_heavyweight_gate_types() {
        let registry = PhaseGateRegistry::new();
        let phase4 = registry.gate(4).unwrap();
        assert!(phase4.gate_types.contains(&GateType::HumanJudgmentGate));
        assert!(phase4.gate_types.contains(&GateType::EconomicGate));
        assert!(phase4.gate_types.contains(&GateType::IrreversibilityFlag));
    }

    #[test]
    fn every_phase_has_artifacts_and_reviewers() {
        let registry = PhaseGateRegistry::new();
        for gate in registry.all_gates().unwrap() {
            assert!(!gate.required_artifacts.is_empty(), "phase {}", gate.phase_number);
            assert!(!gate.reviewers.is_empty(), "phase {}", gate.phase_number);
        }
    }

    #[test]
    fn current_phase_is_reliability() {
        let registry = PhaseGateRegistry::new();
        let current = registry.current_phase().unwrap();
        assert_eq!(current.phase_number, 11);
        assert_eq!(current.status, PhaseStatus::InProgress);
    }

    #[test]
    fn kill_criteria_are_owned_and_actionable() {
        let registry = PhaseGateRegistry::new();
        let criteria = registry.kill_criteria();
        assert!(criteria.len() >= 5);
        for criterion in criteria {
            assert!(!criterion.owner.is_empty());
            assert!(!criterion.threshold.is_empty());
            assert!(!criterion.action.is_empty());
        }
    }

    #[test]
    fn approval_updates_gate_and_summary() {
        let registry = PhaseGateRegistry::new();
        let receipt = registry.approve_phase(11, "SRE Lead").unwrap();
        assert_eq!(receipt.approved_by, "SRE Lead");

        let gate = registry.gate(11).unwrap();
        assert_eq!(gate.status, PhaseStatus::Approved);
        assert!(gate.approved_at.is_some());

        let summary = registry.playbook_summary().unwrap();
        assert_eq!(summary.phases_completed, 11);
    }

    #[test]
    fn playbook_summary_shape() {
        let registry = PhaseGateRegistry::new();
        let summary = registry.playbook_summary().unwrap();
        assert_eq!(summary.total_phases, 12);
        assert_eq!(summary.quarters.len(), 4);
        assert_eq!(summary.current_phase, 11);
        for quarter in summary.quarters.values() {
            assert!(!quarter.human_aim.is_empty());
            assert!(!quarter.gate.is_empty());
        }
    }

    #[test]
    fn exit_check_requires_all_contracts() {
        let registry = PhaseGateRegistry::new();
        let check = registry.check_phase_exit(12).unwrap();
        assert!(!check.can_exit);

        let complete = ExitContract {
            truth_satisfied: true,
            economic_satisfied: true,
            risk_satisfied: true,
            ownership_satisfied: true,
        };
        assert!(complete.is_complete());
    }

    #[test]
    fn unknown_phase_is_an_error() {
        let registry = PhaseGateRegistry::new();
        assert!(matches!(registry.gate(13), Err(GateError::UnknownPhase(13))));
    }
}
