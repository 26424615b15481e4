//! Governance layer for the CareBridge gateway.
//!
//! Three concerns live here: the tamper-evident audit log shared by every
//! clinical workflow, the twelve-phase delivery gate registry, and the cost
//! telemetry contract with its per-operation ledger and spend guard.

pub mod audit;
pub mod cost;
pub mod phase_gates;

pub use audit::{AuditEntry, AuditError, AuditLog, AuditTrail, ChainVerification};
pub use cost::{contract_status, CostGuard, CostLedger, CostRecord};
pub use phase_gates::{GateType, PhaseGate, PhaseGateRegistry, PhaseStatus};
