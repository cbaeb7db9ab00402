//! Human-in-the-loop incident confirmation.
//!
//! Auto-created incidents sit in `pending` until a person confirms or
//! dismisses them; nothing in the engine activates an incident on its own.

use crate::ServiceDeps;
use vigil_core::{
    AuditContext, EntityId, EntityKind, Incident, IncidentStatus, PolicyError, StorageError,
    VigilError, VigilResult,
};
use vigil_events::EventType;
use vigil_storage::IncidentUpdate;

/// Confirmation/dismissal service for pending incidents.
pub struct IncidentService {
    deps: ServiceDeps,
}

impl IncidentService {
    pub fn new(deps: ServiceDeps) -> Self {
        Self { deps }
    }

    /// Confirm a pending incident, making it active.
    pub fn confirm_incident(&self, incident_id: EntityId, ctx: &AuditContext) -> VigilResult<Incident> {
        let incident = self.require(incident_id)?;
        if incident.status != IncidentStatus::Pending {
            return Err(VigilError::Policy(PolicyError::IncidentNotPending {
                incident_id,
                status: incident.status.to_string(),
            }));
        }

        self.deps.storage.incident_update(
            incident_id,
            IncidentUpdate {
                status: Some(IncidentStatus::Active),
            },
        )?;
        self.deps.audit_log(
            ctx,
            "incident.confirm",
            EntityKind::Incident,
            incident_id,
            Some(serde_json::json!({ "status": "pending" })),
            Some(serde_json::json!({ "status": "active" })),
        );
        self.deps.publish(
            EventType::IncidentConfirmed,
            EntityKind::Incident,
            incident_id,
            ctx.actor_id,
            serde_json::Value::Null,
        );

        self.require(incident_id)
    }

    /// Dismiss a pending incident as a false positive.
    pub fn dismiss_incident(&self, incident_id: EntityId, ctx: &AuditContext) -> VigilResult<Incident> {
        let incident = self.require(incident_id)?;
        if incident.status != IncidentStatus::Pending {
            return Err(VigilError::Policy(PolicyError::IncidentNotPending {
                incident_id,
                status: incident.status.to_string(),
            }));
        }
        if !incident.dismissible {
            return Err(VigilError::Policy(PolicyError::NotDismissible { incident_id }));
        }

        self.deps.storage.incident_update(
            incident_id,
            IncidentUpdate {
                status: Some(IncidentStatus::Dismissed),
            },
        )?;
        self.deps.audit_log(
            ctx,
            "incident.dismiss",
            EntityKind::Incident,
            incident_id,
            Some(serde_json::json!({ "status": "pending" })),
            Some(serde_json::json!({ "status": "dismissed" })),
        );
        self.deps.publish(
            EventType::IncidentDismissed,
            EntityKind::Incident,
            incident_id,
            ctx.actor_id,
            serde_json::Value::Null,
        );

        self.require(incident_id)
    }

    fn require(&self, incident_id: EntityId) -> VigilResult<Incident> {
        self.deps
            .storage
            .incident_get(incident_id)?
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Incident,
                id: incident_id,
            }))
    }
}

// ============================================================================
// TESTS
// ============================================================================
