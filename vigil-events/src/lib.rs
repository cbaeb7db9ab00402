//! VIGIL Events - event publication and audit logging seams.
//!
//! The engine only defines the events it publishes and consumes; transport
//! belongs to an external collaborator. Publishing is fire-and-forget with
//! no acknowledgement contract. The in-memory implementations back tests
//! and local runs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vigil_core::{AuditContext, EntityId, EntityKind, Timestamp, VigilResult};

// ============================================================================
// EVENT TYPES
// ============================================================================

/// Event vocabulary published by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    ActivityCreated,
    ActivityStatusChanged,
    ActivityArchived,
    IncidentAutoCreated,
    IncidentConfirmed,
    IncidentDismissed,
    CaseCreated,
    CaseStatusChanged,
    CaseClosed,
    EvidenceCollected,
    EvidenceTransferred,
    EvidenceProcessed,
}

impl EventType {
    /// Dotted wire name of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ActivityCreated => "activity.created",
            EventType::ActivityStatusChanged => "activity.status_changed",
            EventType::ActivityArchived => "activity.archived",
            EventType::IncidentAutoCreated => "incident.auto_created",
            EventType::IncidentConfirmed => "incident.confirmed",
            EventType::IncidentDismissed => "incident.dismissed",
            EventType::CaseCreated => "case.created",
            EventType::CaseStatusChanged => "case.status_changed",
            EventType::CaseClosed => "case.closed",
            EventType::EvidenceCollected => "evidence.collected",
            EventType::EvidenceTransferred => "evidence.transferred",
            EventType::EvidenceProcessed => "evidence.processed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: EventType,
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    pub actor_id: EntityId,
    pub occurred_at: Timestamp,
    pub data: serde_json::Value,
}

impl EventEnvelope {
    /// Build an envelope stamped with the current time.
    pub fn new(
        event_type: EventType,
        entity_kind: EntityKind,
        entity_id: EntityId,
        actor_id: EntityId,
        data: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            entity_kind,
            entity_id,
            actor_id,
            occurred_at: Utc::now(),
            data,
        }
    }
}

/// Fire-and-forget event publication. Implementations must not block the
/// caller on downstream delivery.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, envelope: EventEnvelope) -> VigilResult<()>;
}

// ============================================================================
// AUDIT SINK
// ============================================================================

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub audit_id: EntityId,
    pub actor_id: EntityId,
    pub actor_name: String,
    pub action: String,
    pub reason: Option<String>,
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub occurred_at: Timestamp,
}

/// Audit log consumer. Storage of the log itself is external.
pub trait AuditSink: Send + Sync {
    fn audit_log(
        &self,
        ctx: &AuditContext,
        action: &str,
        entity_kind: EntityKind,
        entity_id: EntityId,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> VigilResult<()>;
}

// ============================================================================
// IN-MEMORY IMPLEMENTATIONS
// ============================================================================

/// In-memory event bus for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventBus {
    events: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in order.
    pub fn published(&self) -> Vec<EventEnvelope> {
        self.events.lock().unwrap().clone()
    }

    /// Count published events of one type.
    pub fn count_of(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, envelope: EventEnvelope) -> VigilResult<()> {
        self.events.lock().unwrap().push(envelope);
        Ok(())
    }
}

/// In-memory audit log for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries, in order.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn audit_log(
        &self,
        ctx: &AuditContext,
        action: &str,
        entity_kind: EntityKind,
        entity_id: EntityId,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> VigilResult<()> {
        self.entries.lock().unwrap().push(AuditEntry {
            audit_id: Uuid::now_v7(),
            actor_id: ctx.actor_id,
            actor_name: ctx.actor_name.clone(),
            action: action.to_string(),
            reason: ctx.reason.clone(),
            entity_kind,
            entity_id,
            before,
            after,
            occurred_at: Utc::now(),
        });
        Ok(())
    }
}

/// Publisher that always fails. Used to test that integration failures do
/// not roll back the primary mutation.
#[derive(Debug, Default, Clone)]
pub struct FailingEventBus;

impl EventPublisher for FailingEventBus {
    fn publish(&self, _envelope: EventEnvelope) -> VigilResult<()> {
        Err(vigil_core::VigilError::Storage(
            vigil_core::StorageError::InsertFailed {
                entity_kind: EntityKind::Activity,
                reason: "event transport unavailable".to_string(),
            },
        ))
    }
}

// ============================================================================
// TESTS
// ============================================================================
