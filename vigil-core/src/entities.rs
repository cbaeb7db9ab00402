//! Core entity structs for the VIGIL escalation engine.
//!
//! Append-only sequences (custody chains, case status history) keep their
//! backing `Vec` private and expose only an append operation plus an
//! immutable snapshot read.

use crate::enums::{
    ActivityStatus, ActivityType, ActorClass, ActorRole, CaseOutcome, CaseStatus, CaseType,
    Classification, CustodyAction, DecisionAction, EvidenceCondition, EvidenceType,
    IncidentStatus, IncidentType, Priority, ProcessingStatus,
};
use crate::{EntityId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// ACTIVITY
// ============================================================================

/// Activity - a raw field-reported event, the unit of initial observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: EntityId,
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: ActivityStatus,
    pub location: String,
    /// Site/building metadata, when the reporting source provides it.
    pub site: Option<String>,
    pub source: ActorClass,
    /// Sensor-reported detection confidence in [0, 1]. Human reports carry 0.
    pub confidence: f64,
    pub system_tags: Vec<String>,
    pub user_tags: Vec<String>,
    pub incident_ids: Vec<EntityId>,
    /// Eligible for archival after this instant; never hard-deleted.
    pub retention_deadline: Timestamp,
    pub archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Activity {
    /// Add a system tag if not already present. Idempotent.
    pub fn add_system_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.system_tags.contains(&tag) {
            self.system_tags.push(tag);
        }
    }

    /// Link an incident to this activity. Idempotent.
    pub fn link_incident(&mut self, incident_id: EntityId) {
        if !self.incident_ids.contains(&incident_id) {
            self.incident_ids.push(incident_id);
        }
    }

    /// Check if this activity carries a given tag (system or user).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.system_tags.iter().any(|t| t == tag) || self.user_tags.iter().any(|t| t == tag)
    }
}

/// Draft payload for creating an activity. Validated before it becomes
/// an `Activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    /// Unset means "derive from the type-to-priority table".
    pub priority: Option<Priority>,
    pub location: String,
    pub site: Option<String>,
    pub source: ActorClass,
    pub confidence: f64,
    pub user_tags: Vec<String>,
}

impl NewActivity {
    /// Minimal draft for a human-reported activity.
    pub fn new(activity_type: ActivityType, title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            activity_type,
            title: title.into(),
            description: None,
            priority: None,
            location: location.into(),
            site: None,
            source: ActorClass::Human,
            confidence: 0.0,
            user_tags: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an explicit priority (otherwise derived from the type table).
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the originating site.
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Mark the draft as sensor-originated with the given confidence.
    pub fn from_sensor(mut self, source: ActorClass, confidence: f64) -> Self {
        self.source = source;
        self.confidence = confidence;
        self
    }
}

// ============================================================================
// INCIDENT
// ============================================================================

/// Incident - an escalated, human-confirmable event derived from an activity.
///
/// Invariant: incidents constructed by the escalation evaluator always start
/// `Pending` with `requires_validation` set; they are never born active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: EntityId,
    pub incident_type: IncidentType,
    pub status: IncidentStatus,
    pub priority: Priority,
    pub trigger_activity_id: EntityId,
    pub requires_validation: bool,
    pub dismissible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ============================================================================
// CASE
// ============================================================================

/// One recorded case status change. Immutable once appended, except that a
/// transition awaiting approval gets its approver recorded exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStatusChange {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub actor_id: EntityId,
    pub actor_role: ActorRole,
    pub requires_approval: bool,
    /// Set when a supervisor records approval for a flagged transition.
    pub approved_by: Option<EntityId>,
    pub reason: Option<String>,
    pub changed_at: Timestamp,
}

/// Case - a formal investigation owning evidence and closure documentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: EntityId,
    /// Formatted, sequence-derived case number, e.g. `CASE-2026-000042`.
    pub case_number: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub priority: Priority,
    pub lead_investigator_id: EntityId,
    pub incident_ids: Vec<EntityId>,
    pub evidence_ids: Vec<EntityId>,
    status_history: Vec<CaseStatusChange>,
    pub retention_deadline: Timestamp,
    pub conclusion: Option<String>,
    pub recommendations: Option<String>,
    pub outcome: Option<CaseOutcome>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Case {
    /// Construct a freshly opened case.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        case_number: String,
        case_type: CaseType,
        priority: Priority,
        lead_investigator_id: EntityId,
        incident_ids: Vec<EntityId>,
        retention_deadline: Timestamp,
    ) -> Self {
        let now = Utc::now();
        Self {
            case_id: Uuid::now_v7(),
            case_number,
            case_type,
            status: CaseStatus::Open,
            priority,
            lead_investigator_id,
            incident_ids,
            evidence_ids: Vec::new(),
            status_history: Vec::new(),
            retention_deadline,
            conclusion: None,
            recommendations: None,
            outcome: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a status change and move the case to its new status.
    pub fn record_status_change(&mut self, change: CaseStatusChange) {
        self.status = change.to;
        self.updated_at = change.changed_at;
        self.status_history.push(change);
    }

    /// Record approval for the most recent transition that required it.
    /// Returns false when there is nothing awaiting approval.
    pub fn record_approval(&mut self, approver_id: EntityId) -> bool {
        match self
            .status_history
            .iter_mut()
            .rev()
            .find(|c| c.requires_approval && c.approved_by.is_none())
        {
            Some(change) => {
                change.approved_by = Some(approver_id);
                true
            }
            None => false,
        }
    }

    /// Immutable snapshot of the status history, oldest first.
    pub fn status_history(&self) -> &[CaseStatusChange] {
        &self.status_history
    }

    /// Whether the latest flagged transition is still awaiting approval.
    pub fn has_pending_approval(&self) -> bool {
        self.status_history
            .iter()
            .rev()
            .any(|c| c.requires_approval && c.approved_by.is_none())
    }

    /// Link an evidence item to this case. Idempotent.
    pub fn link_evidence(&mut self, evidence_id: EntityId) {
        if !self.evidence_ids.contains(&evidence_id) {
            self.evidence_ids.push(evidence_id);
        }
    }
}

/// Draft payload for opening a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCase {
    pub case_type: CaseType,
    pub priority: Priority,
    pub lead_investigator_id: EntityId,
    pub incident_ids: Vec<EntityId>,
}

// ============================================================================
// EVIDENCE
// ============================================================================

/// Reference to the evidence file held by the external storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    /// Lowercase hex SHA-256 of the file bytes at collection time.
    pub sha256: String,
}

/// One custody event. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyLogEntry {
    pub action: CustodyAction,
    pub occurred_at: Timestamp,
    pub actor_id: EntityId,
    pub actor_name: String,
    pub location: Option<String>,
    pub condition: Option<EvidenceCondition>,
    pub integrity_verified: bool,
    pub notes: Option<String>,
}

/// Evidence item owned by a case, carrying its full chain of custody.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub evidence_id: EntityId,
    pub case_id: EntityId,
    pub evidence_type: EvidenceType,
    pub classification: Classification,
    pub processing_status: ProcessingStatus,
    pub integrity_verified: bool,
    pub file_ref: Option<FileRef>,
    custody_chain: Vec<CustodyLogEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EvidenceItem {
    /// Create a collected evidence item with its first custody entry.
    pub fn collected(
        case_id: EntityId,
        evidence_type: EvidenceType,
        classification: Classification,
        file_ref: Option<FileRef>,
        first_entry: CustodyLogEntry,
    ) -> Self {
        let now = first_entry.occurred_at;
        Self {
            evidence_id: Uuid::now_v7(),
            case_id,
            evidence_type,
            classification,
            processing_status: ProcessingStatus::Pending,
            integrity_verified: false,
            file_ref,
            custody_chain: vec![first_entry],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a custody entry. The chain only ever grows.
    pub fn append_custody(&mut self, entry: CustodyLogEntry) {
        self.updated_at = entry.occurred_at;
        self.custody_chain.push(entry);
    }

    /// Immutable snapshot of the custody chain, oldest first.
    pub fn custody_chain(&self) -> &[CustodyLogEntry] {
        &self.custody_chain
    }

    /// Number of custody entries recorded so far.
    pub fn custody_len(&self) -> usize {
        self.custody_chain.len()
    }
}

/// Draft payload for collecting evidence into a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvidence {
    pub evidence_type: EvidenceType,
    pub classification: Classification,
    pub file_ref: Option<FileRef>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Result of processing an evidence item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub status: ProcessingStatus,
    pub notes: Option<String>,
}

// ============================================================================
// DECISION
// ============================================================================

/// A handler's decision for one processed activity or incident. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub handler_key: String,
    pub decided_at: Timestamp,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub action: DecisionAction,
    /// Ids of the SOP steps the handler applied, in order.
    pub sop_steps_applied: Vec<String>,
    pub escalation_required: bool,
    pub metadata: BTreeMap<String, String>,
}

impl Decision {
    /// Create a decision with no SOP steps and empty metadata.
    pub fn new(handler_key: impl Into<String>, action: DecisionAction, confidence: f64) -> Self {
        Self {
            handler_key: handler_key.into(),
            decided_at: Utc::now(),
            confidence,
            action,
            sop_steps_applied: Vec::new(),
            escalation_required: false,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach the applied SOP step ids.
    pub fn with_sop_steps(mut self, steps: Vec<String>) -> Self {
        self.sop_steps_applied = steps;
        self
    }

    /// Flag that the case layer must be signalled.
    pub fn with_escalation_required(mut self, required: bool) -> Self {
        self.escalation_required = required;
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================
