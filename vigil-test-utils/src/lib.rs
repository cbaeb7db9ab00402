//! VIGIL Test Utilities
//!
//! Centralized test infrastructure for the VIGIL workspace:
//! - Proptest generators for entity and enum types
//! - Fixtures for common scenarios
//! - Re-exports of the in-memory collaborators

// Re-export the in-memory collaborators from their source crates
pub use vigil_events::{InMemoryAuditLog, InMemoryEventBus};
pub use vigil_storage::MockStorage;

// Re-export core types for convenience
pub use vigil_core::{
    Activity, ActivityStatus, ActivityType, ActorClass, ActorRole, AuditContext, Case, CaseStatus,
    CaseType, Classification, CustodyAction, CustodyLogEntry, EvidenceCondition, EvidenceItem,
    EvidenceType, Incident, IncidentStatus, IncidentType, NewActivity, NewCase, NewEvidence,
    Priority, ProcessingStatus, Timestamp, VigilConfig,
};

use chrono::Utc;
use uuid::Uuid;

// ============================================================================
// FIXTURES
// ============================================================================

/// An audit context for the given role with a throwaway actor.
pub fn test_ctx(role: ActorRole, action: &str) -> AuditContext {
    AuditContext::new(Uuid::now_v7(), "Test Actor", role, action)
}

/// A plain human-reported activity of the given type.
pub fn test_activity(activity_type: ActivityType) -> Activity {
    let now = Utc::now();
    Activity {
        activity_id: Uuid::now_v7(),
        activity_type,
        title: format!("test {}", activity_type),
        description: None,
        priority: Priority::Medium,
        status: ActivityStatus::Detecting,
        location: "test location".to_string(),
        site: None,
        source: ActorClass::Human,
        confidence: 0.0,
        system_tags: Vec::new(),
        user_tags: Vec::new(),
        incident_ids: Vec::new(),
        retention_deadline: now + chrono::Duration::days(30),
        archived: false,
        created_at: now,
        updated_at: now,
    }
}

/// A pending incident of the given type.
pub fn test_incident(incident_type: IncidentType, priority: Priority) -> Incident {
    let now = Utc::now();
    Incident {
        incident_id: Uuid::now_v7(),
        incident_type,
        status: IncidentStatus::Pending,
        priority,
        trigger_activity_id: Uuid::now_v7(),
        requires_validation: true,
        dismissible: true,
        created_at: now,
        updated_at: now,
    }
}

/// A freshly opened case.
pub fn test_case(case_type: CaseType) -> Case {
    Case::open(
        "CASE-2026-000001".to_string(),
        case_type,
        Priority::Medium,
        Uuid::now_v7(),
        Vec::new(),
        Utc::now() + chrono::Duration::days(365 * 3),
    )
}

/// An evidence item in a given processing status, with its collection entry.
pub fn test_evidence(case_id: Uuid, status: ProcessingStatus) -> EvidenceItem {
    let entry = CustodyLogEntry {
        action: CustodyAction::Collected,
        occurred_at: Utc::now(),
        actor_id: Uuid::now_v7(),
        actor_name: "Test Actor".to_string(),
        location: None,
        condition: Some(EvidenceCondition::Good),
        integrity_verified: false,
        notes: None,
    };
    let mut item = EvidenceItem::collected(
        case_id,
        EvidenceType::Document,
        Classification::Internal,
        None,
        entry,
    );
    item.processing_status = status;
    item
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// Generate an arbitrary UUID (v4, from random bytes).
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_activity_type() -> impl Strategy<Value = ActivityType> {
        proptest::sample::select(ActivityType::ALL.to_vec())
    }

    pub fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Low),
            Just(Priority::Medium),
            Just(Priority::High),
            Just(Priority::Critical),
        ]
    }

    pub fn arb_activity_status() -> impl Strategy<Value = ActivityStatus> {
        prop_oneof![
            Just(ActivityStatus::Detecting),
            Just(ActivityStatus::Assigned),
            Just(ActivityStatus::Responding),
            Just(ActivityStatus::Resolved),
        ]
    }

    pub fn arb_case_status() -> impl Strategy<Value = CaseStatus> {
        prop_oneof![
            Just(CaseStatus::Open),
            Just(CaseStatus::Investigating),
            Just(CaseStatus::EvidenceCollection),
            Just(CaseStatus::Analysis),
            Just(CaseStatus::Closed),
        ]
    }

    pub fn arb_actor_role() -> impl Strategy<Value = ActorRole> {
        prop_oneof![
            Just(ActorRole::Officer),
            Just(ActorRole::Supervisor),
            Just(ActorRole::Admin),
        ]
    }

    pub fn arb_actor_class() -> impl Strategy<Value = ActorClass> {
        prop_oneof![
            Just(ActorClass::Human),
            Just(ActorClass::Integration),
            Just(ActorClass::Ambient),
        ]
    }

    pub fn arb_processing_status() -> impl Strategy<Value = ProcessingStatus> {
        prop_oneof![
            Just(ProcessingStatus::Pending),
            Just(ProcessingStatus::InProgress),
            Just(ProcessingStatus::Processed),
            Just(ProcessingStatus::Rejected),
            Just(ProcessingStatus::RequiresAnalysis),
            Just(ProcessingStatus::Archived),
        ]
    }

    /// Generate a plausible activity with arbitrary enum fields.
    pub fn arb_activity() -> impl Strategy<Value = Activity> {
        (
            arb_activity_type(),
            arb_priority(),
            arb_activity_status(),
            arb_actor_class(),
            0.0f64..=1.0f64,
            "[a-z]{3,20}",
        )
            .prop_map(
                |(activity_type, priority, status, source, confidence, location)| {
                    let now = Utc::now();
                    Activity {
                        activity_id: Uuid::now_v7(),
                        activity_type,
                        title: format!("{} report", activity_type),
                        description: None,
                        priority,
                        status,
                        location,
                        site: None,
                        source,
                        confidence,
                        system_tags: Vec::new(),
                        user_tags: Vec::new(),
                        incident_ids: Vec::new(),
                        retention_deadline: now + chrono::Duration::days(30),
                        archived: false,
                        created_at: now,
                        updated_at: now,
                    }
                },
            )
    }
}

// ============================================================================
// TESTS
// ============================================================================
