//! VIGIL Service - the exposed operations of the escalation engine.
//!
//! Wires the pure rule crates to the storage, audit, and event collaborators
//! and enforces the engine's ordering guarantees: escalation evaluation
//! completes (incident fully constructed, status `pending`) before routing
//! begins; routing completes (memory update included) before a case hand-off
//! is attempted.
//!
//! Every mutating call requires an `AuditContext`. When the audit log or
//! event publish fails after the primary mutation succeeded, the mutation is
//! NOT rolled back: the failure is logged and swallowed, favouring
//! availability of the primary record.

pub mod activity;
pub mod case;
pub mod incident;

pub use activity::{ActivityService, CreateActivityOutcome, StatusChangeOutcome};
pub use case::{CaseService, CaseStatusOutcome};
pub use incident::IncidentService;

use std::sync::Arc;
use vigil_agents::Orchestrator;
use vigil_core::{AuditContext, EntityId, EntityKind, VigilConfig, VigilResult};
use vigil_events::{AuditSink, EventEnvelope, EventPublisher, EventType};
use vigil_storage::StorageTrait;

/// Shared collaborator handles passed to every service.
#[derive(Clone)]
pub struct ServiceDeps {
    pub storage: Arc<dyn StorageTrait>,
    pub audit: Arc<dyn AuditSink>,
    pub events: Arc<dyn EventPublisher>,
}

impl ServiceDeps {
    pub fn new(
        storage: Arc<dyn StorageTrait>,
        audit: Arc<dyn AuditSink>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            storage,
            audit,
            events,
        }
    }

    /// Write an audit entry. A failure here never fails the caller's
    /// operation; the primary mutation already happened.
    pub(crate) fn audit_log(
        &self,
        ctx: &AuditContext,
        action: &str,
        entity_kind: EntityKind,
        entity_id: EntityId,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) {
        if let Err(err) = self
            .audit
            .audit_log(ctx, action, entity_kind, entity_id, before, after)
        {
            tracing::warn!(%entity_id, action, error = %err, "audit log write failed");
        }
    }

    /// Publish an event. Fire-and-forget: failures are warned, never
    /// propagated.
    pub(crate) fn publish(
        &self,
        event_type: EventType,
        entity_kind: EntityKind,
        entity_id: EntityId,
        actor_id: EntityId,
        data: serde_json::Value,
    ) {
        let envelope = EventEnvelope::new(event_type, entity_kind, entity_id, actor_id, data);
        if let Err(err) = self.events.publish(envelope) {
            tracing::warn!(%entity_id, event = %event_type, error = %err, "event publish failed");
        }
    }
}

/// The assembled engine: every exposed service plus the orchestrator.
pub struct Engine {
    pub activities: ActivityService,
    pub incidents: IncidentService,
    pub cases: Arc<CaseService>,
    pub orchestrator: Arc<Orchestrator>,
}

impl Engine {
    /// Wire the engine from its collaborators. The orchestrator is built by
    /// the caller (handlers registered) and injected; no ambient singleton.
    pub fn new(
        config: VigilConfig,
        deps: ServiceDeps,
        orchestrator: Arc<Orchestrator>,
    ) -> VigilResult<Self> {
        config.validate()?;
        let cases = Arc::new(CaseService::new(deps.clone()));
        Ok(Self {
            activities: ActivityService::new(
                config.clone(),
                deps.clone(),
                orchestrator.clone(),
                cases.clone(),
            ),
            incidents: IncidentService::new(deps.clone()),
            cases,
            orchestrator,
        })
    }
}
