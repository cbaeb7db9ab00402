//! Case lifecycle, evidence operations, and the closure gate enforcement.

use crate::ServiceDeps;
use chrono::{Datelike, Utc};
use vigil_core::{
    ActorRole, AuditContext, Case, CaseOutcome, CaseStatus, CaseStatusChange, CaseType,
    CustodyLogEntry, EntityId, EntityKind, EvidenceCondition, EvidenceItem, Incident,
    IncidentType, NewCase, NewEvidence, PolicyError, ProcessingResult, StorageError, VigilError,
    VigilResult,
};
use vigil_events::EventType;
use vigil_evidence::{can_close, CustodyLedger};
use vigil_rules::{
    can_transition_case, case_retention_deadline, validate_new_case, validate_new_evidence,
};
use vigil_storage::{CaseFilter, ListOptions};

/// Result of a case status change request.
#[derive(Debug, Clone)]
pub struct CaseStatusOutcome {
    pub case: Case,
    /// The change went through but is not final until approval is recorded.
    pub requires_approval: bool,
}

/// Lifecycle and evidence service for cases.
pub struct CaseService {
    deps: ServiceDeps,
    ledger: CustodyLedger,
}

impl CaseService {
    pub fn new(deps: ServiceDeps) -> Self {
        let ledger = CustodyLedger::new(deps.storage.clone());
        Self { deps, ledger }
    }

    /// Open a new case from a validated draft.
    pub fn create_case(&self, draft: NewCase, ctx: &AuditContext) -> VigilResult<Case> {
        validate_new_case(&draft).map_err(VigilError::ValidationBatch)?;

        let now = Utc::now();
        let sequence = self.deps.storage.next_case_sequence()?;
        let case = Case::open(
            format!("CASE-{}-{:06}", now.year(), sequence),
            draft.case_type,
            draft.priority,
            draft.lead_investigator_id,
            draft.incident_ids,
            case_retention_deadline(draft.case_type, now),
        );

        self.deps.storage.case_insert(&case)?;
        self.deps.audit_log(
            ctx,
            "case.create",
            EntityKind::Case,
            case.case_id,
            None,
            Some(serde_json::to_value(&case).unwrap_or_default()),
        );
        self.deps.publish(
            EventType::CaseCreated,
            EntityKind::Case,
            case.case_id,
            ctx.actor_id,
            serde_json::json!({ "case_number": case.case_number }),
        );
        Ok(case)
    }

    /// Hand-off target for the orchestrator: open a case referencing the
    /// incident, or link the incident into an existing case.
    pub fn open_or_update_for_incident(
        &self,
        incident: &Incident,
        ctx: &AuditContext,
    ) -> VigilResult<Case> {
        let existing = self
            .deps
            .storage
            .case_list(&CaseFilter::default(), &ListOptions::default())?
            .into_iter()
            .find(|c| c.incident_ids.contains(&incident.incident_id));
        if let Some(case) = existing {
            return Ok(case);
        }

        self.create_case(
            NewCase {
                case_type: case_type_for(incident.incident_type),
                priority: incident.priority,
                lead_investigator_id: ctx.actor_id,
                incident_ids: vec![incident.incident_id],
            },
            &ctx.for_action("case.create"),
        )
    }

    /// Request a case status change, gated by the role-aware state machine.
    /// A write to `closed` additionally runs the closure gate first.
    pub fn update_case_status(
        &self,
        case_id: EntityId,
        to: CaseStatus,
        ctx: &AuditContext,
    ) -> VigilResult<CaseStatusOutcome> {
        let mut case = self.require(case_id)?;

        if to == CaseStatus::Closed {
            self.check_closure_gate(&case)?;
        }

        let decision = can_transition_case(case.status, to, ctx.actor_role);
        if !decision.allowed {
            return Err(VigilError::Policy(PolicyError::TransitionDenied {
                entity_kind: EntityKind::Case,
                from: case.status.to_string(),
                to: to.to_string(),
                role: ctx.actor_role,
            }));
        }

        let before = case.status;
        case.record_status_change(CaseStatusChange {
            from: before,
            to,
            actor_id: ctx.actor_id,
            actor_role: ctx.actor_role,
            requires_approval: decision.requires_approval,
            approved_by: None,
            reason: ctx.reason.clone(),
            changed_at: Utc::now(),
        });
        self.deps.storage.case_put(&case)?;
        self.deps.audit_log(
            ctx,
            "case.status_change",
            EntityKind::Case,
            case_id,
            Some(serde_json::json!({ "status": before.to_string() })),
            Some(serde_json::json!({ "status": to.to_string() })),
        );
        self.deps.publish(
            EventType::CaseStatusChanged,
            EntityKind::Case,
            case_id,
            ctx.actor_id,
            serde_json::json!({
                "from": before.to_string(),
                "to": to.to_string(),
                "requires_approval": decision.requires_approval,
            }),
        );

        Ok(CaseStatusOutcome {
            case,
            requires_approval: decision.requires_approval,
        })
    }

    /// Record approval for the latest flagged transition. Elevated roles only.
    pub fn approve_case_transition(&self, case_id: EntityId, ctx: &AuditContext) -> VigilResult<Case> {
        if ctx.actor_role == ActorRole::Officer {
            return Err(VigilError::Policy(PolicyError::ApprovalDenied {
                case_id,
                role: ctx.actor_role,
            }));
        }

        let mut case = self.require(case_id)?;
        if !case.record_approval(ctx.actor_id) {
            return Err(VigilError::Policy(PolicyError::NothingToApprove { case_id }));
        }
        self.deps.storage.case_put(&case)?;
        self.deps.audit_log(
            ctx,
            "case.approve_transition",
            EntityKind::Case,
            case_id,
            None,
            None,
        );
        Ok(case)
    }

    /// Close a case: set the closure fields, run the authoritative gate,
    /// then run the state machine for the final write.
    pub fn close_case(
        &self,
        case_id: EntityId,
        conclusion: &str,
        recommendations: &str,
        outcome: CaseOutcome,
        ctx: &AuditContext,
    ) -> VigilResult<Case> {
        let mut case = self.require(case_id)?;
        case.conclusion = Some(conclusion.to_string());
        case.recommendations = Some(recommendations.to_string());
        case.outcome = Some(outcome);

        self.check_closure_gate(&case)?;

        let decision = can_transition_case(case.status, CaseStatus::Closed, ctx.actor_role);
        if !decision.allowed {
            return Err(VigilError::Policy(PolicyError::TransitionDenied {
                entity_kind: EntityKind::Case,
                from: case.status.to_string(),
                to: CaseStatus::Closed.to_string(),
                role: ctx.actor_role,
            }));
        }

        let before = case.status;
        case.record_status_change(CaseStatusChange {
            from: before,
            to: CaseStatus::Closed,
            actor_id: ctx.actor_id,
            actor_role: ctx.actor_role,
            requires_approval: decision.requires_approval,
            approved_by: None,
            reason: ctx.reason.clone(),
            changed_at: Utc::now(),
        });
        self.deps.storage.case_put(&case)?;
        self.deps.audit_log(
            ctx,
            "case.close",
            EntityKind::Case,
            case_id,
            Some(serde_json::json!({ "status": before.to_string() })),
            Some(serde_json::json!({ "status": "closed" })),
        );
        self.deps.publish(
            EventType::CaseClosed,
            EntityKind::Case,
            case_id,
            ctx.actor_id,
            serde_json::json!({ "case_number": case.case_number }),
        );
        Ok(case)
    }

    /// Collect evidence into a case through the custody ledger.
    pub fn add_evidence(
        &self,
        case_id: EntityId,
        draft: NewEvidence,
        ctx: &AuditContext,
    ) -> VigilResult<EvidenceItem> {
        validate_new_evidence(&draft).map_err(VigilError::ValidationBatch)?;

        let item = self.ledger.collect(case_id, draft, ctx)?;
        self.deps.audit_log(
            ctx,
            "evidence.collect",
            EntityKind::Evidence,
            item.evidence_id,
            None,
            Some(serde_json::to_value(&item).unwrap_or_default()),
        );
        self.deps.publish(
            EventType::EvidenceCollected,
            EntityKind::Evidence,
            item.evidence_id,
            ctx.actor_id,
            serde_json::json!({ "case_id": case_id }),
        );
        Ok(item)
    }

    /// Record a custody transfer.
    pub fn transfer_evidence(
        &self,
        evidence_id: EntityId,
        to_user_id: EntityId,
        to_user_name: &str,
        condition: EvidenceCondition,
        reason: Option<String>,
        ctx: &AuditContext,
    ) -> VigilResult<CustodyLogEntry> {
        let entry = self.ledger.transfer(
            evidence_id,
            to_user_id,
            to_user_name,
            condition,
            false,
            reason,
            ctx,
        )?;
        self.deps.audit_log(
            ctx,
            "evidence.transfer",
            EntityKind::Evidence,
            evidence_id,
            None,
            Some(serde_json::to_value(&entry).unwrap_or_default()),
        );
        self.deps.publish(
            EventType::EvidenceTransferred,
            EntityKind::Evidence,
            evidence_id,
            ctx.actor_id,
            serde_json::json!({ "to": to_user_name }),
        );
        Ok(entry)
    }

    /// Record an evidence processing result.
    pub fn process_evidence(
        &self,
        evidence_id: EntityId,
        result: ProcessingResult,
        ctx: &AuditContext,
    ) -> VigilResult<EvidenceItem> {
        let item = self.ledger.process(evidence_id, result, ctx)?;
        self.deps.audit_log(
            ctx,
            "evidence.process",
            EntityKind::Evidence,
            evidence_id,
            None,
            Some(serde_json::json!({ "status": item.processing_status.to_string() })),
        );
        self.deps.publish(
            EventType::EvidenceProcessed,
            EntityKind::Evidence,
            evidence_id,
            ctx.actor_id,
            serde_json::json!({ "status": item.processing_status.to_string() }),
        );
        Ok(item)
    }

    /// Re-verify an evidence file against its recorded hash.
    pub fn verify_evidence(
        &self,
        evidence_id: EntityId,
        file_bytes: &[u8],
        ctx: &AuditContext,
    ) -> VigilResult<bool> {
        self.ledger.verify_integrity(evidence_id, file_bytes, ctx)
    }

    fn check_closure_gate(&self, case: &Case) -> VigilResult<()> {
        let evidence = self.deps.storage.evidence_list_by_case(case.case_id)?;
        let check = can_close(case, &evidence);
        if !check.allowed {
            return Err(VigilError::Policy(PolicyError::ClosureBlocked {
                reasons: check.reasons,
            }));
        }
        Ok(())
    }

    fn require(&self, case_id: EntityId) -> VigilResult<Case> {
        self.deps
            .storage
            .case_get(case_id)?
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Case,
                id: case_id,
            }))
    }
}

/// Case category opened for an incident domain during hand-off.
fn case_type_for(incident_type: IncidentType) -> CaseType {
    match incident_type {
        IncidentType::MedicalEmergency => CaseType::SafetyIncident,
        IncidentType::SecurityBreach
        | IncidentType::UnauthorizedAccess
        | IncidentType::Tailgating
        | IncidentType::SuspiciousBehavior => CaseType::SecurityInvestigation,
        IncidentType::BolEvent
        | IncidentType::Alert
        | IncidentType::PropertyDamage
        | IncidentType::Other => CaseType::General,
    }
}

// ============================================================================
// TESTS
// ============================================================================
