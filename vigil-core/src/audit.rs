//! Audit context carried by every mutating operation.

use crate::enums::ActorRole;
use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Who is performing an action and why. A hard precondition of every
/// mutating service call, not optional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditContext {
    pub actor_id: EntityId,
    pub actor_name: String,
    pub actor_role: ActorRole,
    /// Action label, e.g. `activity.create` or `case.close`.
    pub action: String,
    pub reason: Option<String>,
}

impl AuditContext {
    /// Create an audit context for the given actor and action label.
    pub fn new(
        actor_id: EntityId,
        actor_name: impl Into<String>,
        actor_role: ActorRole,
        action: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            actor_name: actor_name.into(),
            actor_role,
            action: action.into(),
            reason: None,
        }
    }

    /// Attach a free-text reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Derive a context for a follow-on action by the same actor.
    pub fn for_action(&self, action: impl Into<String>) -> Self {
        Self {
            actor_id: self.actor_id,
            actor_name: self.actor_name.clone(),
            actor_role: self.actor_role,
            action: action.into(),
            reason: self.reason.clone(),
        }
    }
}
