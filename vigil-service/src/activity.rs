//! Activity intake, status changes, and the escalate-route-handoff pipeline.

use crate::case::CaseService;
use crate::ServiceDeps;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use vigil_agents::Orchestrator;
use vigil_core::{
    Activity, ActivityStatus, AuditContext, Decision, EntityId, EntityKind, Incident, NewActivity,
    PolicyError, StorageError, VigilConfig, VigilError, VigilResult,
};
use vigil_events::EventType;
use vigil_rules::{
    activity_retention_deadline, apply_system_tags, can_transition_activity, evaluate,
    resolve_priority, validate_new_activity, AUTO_GENERATED_TAG,
};
use vigil_storage::{ActivityFilter, ActivityUpdate, ListOptions};

/// Everything that happened during one activity intake.
#[derive(Debug, Clone)]
pub struct CreateActivityOutcome {
    pub activity: Activity,
    /// Pending incident, when an escalation rule triggered.
    pub incident: Option<Incident>,
    /// Handler decision, when routing found a capable handler.
    pub decision: Option<Decision>,
}

/// Result of a status change request.
#[derive(Debug, Clone)]
pub struct StatusChangeOutcome {
    pub activity: Activity,
    /// The change went through but is not final until approval is recorded.
    pub requires_approval: bool,
}

/// Intake and lifecycle service for activities.
pub struct ActivityService {
    config: VigilConfig,
    deps: ServiceDeps,
    orchestrator: Arc<Orchestrator>,
    case_layer: Arc<CaseService>,
}

impl ActivityService {
    pub fn new(
        config: VigilConfig,
        deps: ServiceDeps,
        orchestrator: Arc<Orchestrator>,
        case_layer: Arc<CaseService>,
    ) -> Self {
        Self {
            config,
            deps,
            orchestrator,
            case_layer,
        }
    }

    /// Create an activity from a validated draft and run the full pipeline:
    /// store, audit, publish, escalate, route, and - when the decision asks
    /// for it - hand off to the case layer.
    pub fn create_activity(
        &self,
        draft: NewActivity,
        ctx: &AuditContext,
    ) -> VigilResult<CreateActivityOutcome> {
        validate_new_activity(&draft).map_err(VigilError::ValidationBatch)?;

        let now = Utc::now();
        let mut activity = Activity {
            activity_id: Uuid::now_v7(),
            activity_type: draft.activity_type,
            title: draft.title,
            description: draft.description,
            priority: resolve_priority(draft.priority, draft.activity_type),
            status: ActivityStatus::Detecting,
            location: draft.location,
            site: draft.site,
            source: draft.source,
            confidence: draft.confidence,
            system_tags: Vec::new(),
            user_tags: draft.user_tags,
            incident_ids: Vec::new(),
            retention_deadline: activity_retention_deadline(now, &self.config),
            archived: false,
            created_at: now,
            updated_at: now,
        };
        apply_system_tags(&mut activity, now, &self.config);

        self.deps.storage.activity_insert(&activity)?;
        self.deps.audit_log(
            ctx,
            "activity.create",
            EntityKind::Activity,
            activity.activity_id,
            None,
            Some(serde_json::to_value(&activity).unwrap_or_default()),
        );
        self.deps.publish(
            EventType::ActivityCreated,
            EntityKind::Activity,
            activity.activity_id,
            ctx.actor_id,
            serde_json::json!({ "activity_type": activity.activity_type.to_string() }),
        );

        // Escalation runs to completion (incident constructed and committed,
        // status pending) before routing begins.
        let incident = match evaluate(&activity) {
            Some(incident) => {
                activity.add_system_tag(AUTO_GENERATED_TAG);
                activity.link_incident(incident.incident_id);
                self.deps.storage.activity_update(
                    activity.activity_id,
                    ActivityUpdate {
                        system_tags: Some(activity.system_tags.clone()),
                        incident_ids: Some(activity.incident_ids.clone()),
                        ..Default::default()
                    },
                )?;

                self.deps.storage.incident_insert(&incident)?;
                self.deps.audit_log(
                    ctx,
                    "incident.auto_create",
                    EntityKind::Incident,
                    incident.incident_id,
                    None,
                    Some(serde_json::to_value(&incident).unwrap_or_default()),
                );
                self.deps.publish(
                    EventType::IncidentAutoCreated,
                    EntityKind::Incident,
                    incident.incident_id,
                    ctx.actor_id,
                    serde_json::json!({
                        "trigger_activity_id": activity.activity_id,
                        "priority": incident.priority.to_string(),
                    }),
                );
                Some(incident)
            }
            None => None,
        };

        // Routing (memory update included) completes before any hand-off.
        let decision = self.orchestrator.route_activity(&activity);

        if let (Some(decision), Some(incident)) = (decision.as_ref(), incident.as_ref()) {
            if decision.escalation_required {
                // Fire-and-forget: the case layer's own state machine governs
                // what happens next.
                if let Err(err) = self.case_layer.open_or_update_for_incident(incident, ctx) {
                    tracing::warn!(
                        incident_id = %incident.incident_id,
                        error = %err,
                        "case hand-off failed"
                    );
                }
            }
        }

        Ok(CreateActivityOutcome {
            activity,
            incident,
            decision,
        })
    }

    /// Request a status change, gated by the role-aware state machine.
    /// Denial is a policy violation surfaced to the actor, never retried.
    pub fn update_activity_status(
        &self,
        activity_id: EntityId,
        to: ActivityStatus,
        ctx: &AuditContext,
    ) -> VigilResult<StatusChangeOutcome> {
        let activity = self
            .deps
            .storage
            .activity_get(activity_id)?
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Activity,
                id: activity_id,
            }))?;

        let decision = can_transition_activity(activity.status, to, ctx.actor_role);
        if !decision.allowed {
            return Err(VigilError::Policy(PolicyError::TransitionDenied {
                entity_kind: EntityKind::Activity,
                from: activity.status.to_string(),
                to: to.to_string(),
                role: ctx.actor_role,
            }));
        }

        let before = activity.status;
        self.deps.storage.activity_update(
            activity_id,
            ActivityUpdate {
                status: Some(to),
                ..Default::default()
            },
        )?;
        self.deps.audit_log(
            ctx,
            "activity.status_change",
            EntityKind::Activity,
            activity_id,
            Some(serde_json::json!({ "status": before.to_string() })),
            Some(serde_json::json!({ "status": to.to_string() })),
        );
        self.deps.publish(
            EventType::ActivityStatusChanged,
            EntityKind::Activity,
            activity_id,
            ctx.actor_id,
            serde_json::json!({
                "from": before.to_string(),
                "to": to.to_string(),
                "requires_approval": decision.requires_approval,
            }),
        );

        let activity = self
            .deps
            .storage
            .activity_get(activity_id)?
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Activity,
                id: activity_id,
            }))?;
        Ok(StatusChangeOutcome {
            activity,
            requires_approval: decision.requires_approval,
        })
    }

    /// Retention sweep: mark every activity past its deadline as archived.
    /// Returns the number of activities archived.
    pub fn archive_expired(&self, ctx: &AuditContext) -> VigilResult<usize> {
        let now = Utc::now();
        let candidates = self.deps.storage.activity_list(
            &ActivityFilter {
                archived: Some(false),
                ..Default::default()
            },
            &ListOptions::default(),
        )?;

        let mut archived = 0;
        for activity in candidates {
            if activity.retention_deadline > now {
                continue;
            }
            self.deps.storage.activity_update(
                activity.activity_id,
                ActivityUpdate {
                    archived: Some(true),
                    ..Default::default()
                },
            )?;
            self.deps.audit_log(
                ctx,
                "activity.archive",
                EntityKind::Activity,
                activity.activity_id,
                Some(serde_json::json!({ "archived": false })),
                Some(serde_json::json!({ "archived": true })),
            );
            self.deps.publish(
                EventType::ActivityArchived,
                EntityKind::Activity,
                activity.activity_id,
                ctx.actor_id,
                serde_json::Value::Null,
            );
            archived += 1;
        }
        Ok(archived)
    }
}

// ============================================================================
// TESTS
// ============================================================================
