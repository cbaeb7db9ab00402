//! VIGIL Evidence - chain of custody and the case closure gate.
//!
//! Custody chains are append-only: collection writes the first entry, and
//! every transfer, processing action, or verification step appends a new
//! one. Entries are never edited or removed, so append paths cannot fail on
//! conflict - there is nothing to overwrite.

use chrono::Utc;
use std::sync::Arc;
use vigil_core::{
    compute_file_hash, hash_to_hex, AuditContext, Case, CustodyAction, CustodyLogEntry, EntityId,
    EntityKind, EvidenceCondition, EvidenceItem, NewEvidence, ProcessingResult, StorageError,
    Timestamp, ValidationError, VigilError, VigilResult,
};
use vigil_storage::StorageTrait;

// ============================================================================
// CLOSURE GATE
// ============================================================================

/// Result of the closure gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureCheck {
    pub allowed: bool,
    /// Human-readable reasons when closure is blocked.
    pub reasons: Vec<String>,
}

/// The single authoritative closure gate. Pure; must be checked
/// synchronously before any status write to `closed` is attempted.
///
/// Closure requires non-empty conclusion and recommendations, and every
/// evidence item processed or archived.
pub fn can_close(case: &Case, evidence: &[EvidenceItem]) -> ClosureCheck {
    let mut reasons = Vec::new();

    if case.conclusion.as_deref().map_or(true, |c| c.trim().is_empty()) {
        reasons.push("conclusion is empty".to_string());
    }
    if case
        .recommendations
        .as_deref()
        .map_or(true, |r| r.trim().is_empty())
    {
        reasons.push("recommendations is empty".to_string());
    }

    let unresolved = evidence
        .iter()
        .filter(|e| !e.processing_status.releases_for_closure())
        .count();
    if unresolved > 0 {
        reasons.push(format!("{} evidence item(s) not fully processed", unresolved));
    }

    ClosureCheck {
        allowed: reasons.is_empty(),
        reasons,
    }
}

// ============================================================================
// CUSTODY LEDGER
// ============================================================================

/// Append-only custody ledger operating over the storage collaborator.
pub struct CustodyLedger {
    storage: Arc<dyn StorageTrait>,
}

impl CustodyLedger {
    pub fn new(storage: Arc<dyn StorageTrait>) -> Self {
        Self { storage }
    }

    /// Collect evidence into a case: creates the item with its first
    /// custody entry and links it to the owning case.
    pub fn collect(
        &self,
        case_id: EntityId,
        draft: NewEvidence,
        ctx: &AuditContext,
    ) -> VigilResult<EvidenceItem> {
        let mut case = self.require_case(case_id)?;

        let first_entry = CustodyLogEntry {
            action: CustodyAction::Collected,
            occurred_at: Utc::now(),
            actor_id: ctx.actor_id,
            actor_name: ctx.actor_name.clone(),
            location: draft.location.clone(),
            condition: Some(EvidenceCondition::Good),
            integrity_verified: false,
            notes: draft.notes.clone(),
        };
        let item = EvidenceItem::collected(
            case_id,
            draft.evidence_type,
            draft.classification,
            draft.file_ref,
            first_entry,
        );

        self.storage.evidence_insert(&item)?;
        case.link_evidence(item.evidence_id);
        self.storage.case_put(&case)?;
        Ok(item)
    }

    /// Record a custody transfer to another user. Appends an entry noting
    /// the evidence condition and whether integrity was re-verified.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        &self,
        evidence_id: EntityId,
        to_user_id: EntityId,
        to_user_name: &str,
        condition: EvidenceCondition,
        integrity_reverified: bool,
        reason: Option<String>,
        _ctx: &AuditContext,
    ) -> VigilResult<CustodyLogEntry> {
        let mut item = self.require_evidence(evidence_id)?;

        let entry = CustodyLogEntry {
            action: CustodyAction::Transferred,
            occurred_at: Utc::now(),
            actor_id: to_user_id,
            actor_name: to_user_name.to_string(),
            location: None,
            condition: Some(condition),
            integrity_verified: integrity_reverified,
            notes: reason,
        };
        item.append_custody(entry.clone());
        if integrity_reverified {
            item.integrity_verified = true;
        }
        self.storage.evidence_put(&item)?;
        Ok(entry)
    }

    /// Record a processing result. Processing is itself a custody event:
    /// the status change and the appended entry land together.
    pub fn process(
        &self,
        evidence_id: EntityId,
        result: ProcessingResult,
        ctx: &AuditContext,
    ) -> VigilResult<EvidenceItem> {
        let mut item = self.require_evidence(evidence_id)?;

        item.processing_status = result.status;
        item.append_custody(CustodyLogEntry {
            action: CustodyAction::Processed,
            occurred_at: Utc::now(),
            actor_id: ctx.actor_id,
            actor_name: ctx.actor_name.clone(),
            location: None,
            condition: None,
            integrity_verified: false,
            notes: result.notes,
        });
        self.storage.evidence_put(&item)?;
        Ok(item)
    }

    /// Re-verify file integrity against the recorded hash. Appends a
    /// `verified` entry either way; the flag reflects the comparison.
    pub fn verify_integrity(
        &self,
        evidence_id: EntityId,
        file_bytes: &[u8],
        ctx: &AuditContext,
    ) -> VigilResult<bool> {
        let mut item = self.require_evidence(evidence_id)?;

        let file_ref = item.file_ref.clone().ok_or_else(|| {
            VigilError::Validation(ValidationError::RequiredFieldMissing {
                field: "file_ref".to_string(),
            })
        })?;

        let verified = hash_to_hex(&compute_file_hash(file_bytes)) == file_ref.sha256;
        item.integrity_verified = verified;
        item.append_custody(CustodyLogEntry {
            action: CustodyAction::Verified,
            occurred_at: Utc::now(),
            actor_id: ctx.actor_id,
            actor_name: ctx.actor_name.clone(),
            location: None,
            condition: if verified {
                Some(EvidenceCondition::Good)
            } else {
                Some(EvidenceCondition::Compromised)
            },
            integrity_verified: verified,
            notes: None,
        });
        self.storage.evidence_put(&item)?;
        Ok(verified)
    }

    /// Snapshot of one item's custody chain, oldest first.
    pub fn custody_chain(&self, evidence_id: EntityId) -> VigilResult<Vec<CustodyLogEntry>> {
        Ok(self.require_evidence(evidence_id)?.custody_chain().to_vec())
    }

    fn require_case(&self, case_id: EntityId) -> VigilResult<Case> {
        self.storage
            .case_get(case_id)?
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Case,
                id: case_id,
            }))
    }

    fn require_evidence(&self, evidence_id: EntityId) -> VigilResult<EvidenceItem> {
        self.storage
            .evidence_get(evidence_id)?
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Evidence,
                id: evidence_id,
            }))
    }
}

/// Timestamp of the most recent custody event, if any entries exist.
pub fn last_custody_event(item: &EvidenceItem) -> Option<Timestamp> {
    item.custody_chain().last().map(|e| e.occurred_at)
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;
    use vigil_core::{ActorRole, CaseType, Classification, EvidenceType, Priority, ProcessingStatus};
    use vigil_storage::MockStorage;

    #[derive(Debug, Clone)]
    enum Op {
        Transfer,
        Process(ProcessingStatus),
    }

    fn any_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Transfer),
            Just(Op::Process(ProcessingStatus::InProgress)),
            Just(Op::Process(ProcessingStatus::Processed)),
            Just(Op::Process(ProcessingStatus::Rejected)),
            Just(Op::Process(ProcessingStatus::RequiresAnalysis)),
            Just(Op::Process(ProcessingStatus::Archived)),
        ]
    }

    fn any_status() -> impl Strategy<Value = ProcessingStatus> {
        prop_oneof![
            Just(ProcessingStatus::Pending),
            Just(ProcessingStatus::InProgress),
            Just(ProcessingStatus::Processed),
            Just(ProcessingStatus::Rejected),
            Just(ProcessingStatus::RequiresAnalysis),
            Just(ProcessingStatus::Archived),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The custody chain grows by exactly one per operation and prior
        /// entries never change.
        #[test]
        fn prop_chain_is_append_only(ops in proptest::collection::vec(any_op(), 0..12)) {
            let storage = Arc::new(MockStorage::new());
            let ledger = CustodyLedger::new(storage.clone());
            let ctx = AuditContext::new(
                Uuid::now_v7(), "tech", ActorRole::Officer, "evidence.collect",
            );
            let case = Case::open(
                "CASE-2026-000100".to_string(),
                CaseType::General,
                Priority::Low,
                Uuid::now_v7(),
                Vec::new(),
                Utc::now(),
            );
            storage.case_insert(&case).unwrap();

            let item = ledger
                .collect(
                    case.case_id,
                    NewEvidence {
                        evidence_type: EvidenceType::Digital,
                        classification: Classification::Internal,
                        file_ref: None,
                        location: None,
                        notes: None,
                    },
                    &ctx,
                )
                .unwrap();

            let mut prev_chain = ledger.custody_chain(item.evidence_id).unwrap();
            for op in ops {
                match op {
                    Op::Transfer => {
                        ledger
                            .transfer(
                                item.evidence_id,
                                Uuid::now_v7(),
                                "clerk",
                                EvidenceCondition::Good,
                                false,
                                None,
                                &ctx,
                            )
                            .unwrap();
                    }
                    Op::Process(status) => {
                        ledger
                            .process(
                                item.evidence_id,
                                ProcessingResult { status, notes: None },
                                &ctx,
                            )
                            .unwrap();
                    }
                }
                let chain = ledger.custody_chain(item.evidence_id).unwrap();
                prop_assert_eq!(chain.len(), prev_chain.len() + 1);
                prop_assert_eq!(&chain[..prev_chain.len()], &prev_chain[..]);
                prev_chain = chain;
            }
        }

        /// The gate allows closure iff the explicit predicate holds.
        #[test]
        fn prop_closure_gate_matches_predicate(
            statuses in proptest::collection::vec(any_status(), 0..8),
            has_conclusion in proptest::bool::ANY,
            has_recommendations in proptest::bool::ANY,
        ) {
            let mut case = Case::open(
                "CASE-2026-000200".to_string(),
                CaseType::General,
                Priority::Low,
                Uuid::now_v7(),
                Vec::new(),
                Utc::now(),
            );
            if has_conclusion {
                case.conclusion = Some("done".to_string());
            }
            if has_recommendations {
                case.recommendations = Some("none".to_string());
            }

            let evidence: Vec<EvidenceItem> = statuses
                .iter()
                .map(|&status| {
                    let entry = CustodyLogEntry {
                        action: CustodyAction::Collected,
                        occurred_at: Utc::now(),
                        actor_id: Uuid::now_v7(),
                        actor_name: "tech".to_string(),
                        location: None,
                        condition: None,
                        integrity_verified: false,
                        notes: None,
                    };
                    let mut item = EvidenceItem::collected(
                        case.case_id,
                        EvidenceType::Document,
                        Classification::Internal,
                        None,
                        entry,
                    );
                    item.processing_status = status;
                    item
                })
                .collect();

            let expected = has_conclusion
                && has_recommendations
                && statuses.iter().all(|s| s.releases_for_closure());
            prop_assert_eq!(can_close(&case, &evidence).allowed, expected);
        }
    }
}
