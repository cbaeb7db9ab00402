//! VIGIL Agents - Handler Registry and Orchestration
//!
//! Provides the multi-handler routing layer:
//! - Capability-scoped handler trait and concrete domain handlers
//! - First-match orchestrator with registration-time capability validation
//! - Per-handler append-only memory with O(1) incremental metrics
//! - SOP definitions and per-incident-type effectiveness tracking
//!
//! The orchestrator is an explicit owned value passed by reference into
//! callers; there is no ambient handler registry.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Instant;
use vigil_core::{
    Activity, ActivityType, ActorRole, Decision, DecisionAction, DecisionOutcome, EntityId,
    Incident, IncidentType, Priority, RoutingError, Timestamp, VigilConfig, VigilError,
    VigilResult,
};

// ============================================================================
// SOP DEFINITIONS
// ============================================================================

/// One step of a standard operating procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SopStep {
    /// Stable identifier referenced from `Decision::sop_steps_applied`.
    pub step_id: String,
    pub title: String,
    pub estimated_duration_ms: u64,
    pub required: bool,
    /// Steps that must complete before this one.
    pub depends_on: Vec<String>,
    pub assigned_role: ActorRole,
}

/// An ordered checklist a handler applies to an incident type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sop {
    pub incident_type: IncidentType,
    pub steps: Vec<SopStep>,
}

impl Sop {
    /// Ids of the required steps, in order.
    pub fn required_step_ids(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.required)
            .map(|s| s.step_id.as_str())
            .collect()
    }
}

/// Compare applied steps against a SOP. Returns the compliance verdict and
/// one deviation string per missing required step.
pub fn evaluate_sop_compliance(sop: &Sop, applied: &[String]) -> (bool, Vec<String>) {
    let deviations: Vec<String> = sop
        .required_step_ids()
        .into_iter()
        .filter(|id| !applied.iter().any(|a| a == id))
        .map(|id| format!("missing step: {}", id))
        .collect();
    (deviations.is_empty(), deviations)
}

// ============================================================================
// HANDLER TRAIT
// ============================================================================

/// A capability-scoped decision-maker for a class of activities/incidents.
///
/// Handlers are pure computation: they must not block on I/O inside
/// `process_*`. Latency is measured by the orchestrator, not bounded.
pub trait Handler: Send + Sync {
    /// Unique capability key, e.g. `medical-emergency`.
    fn capability(&self) -> &str;

    fn can_handle_activity(&self, activity: &Activity) -> bool;

    fn can_handle_incident(&self, incident: &Incident) -> bool;

    fn process_activity(&self, activity: &Activity) -> Decision;

    fn process_incident(&self, incident: &Incident) -> Decision;

    /// The SOP this handler applies to an incident type, if it has one.
    fn sop_for(&self, incident_type: IncidentType) -> Option<&Sop>;
}

// ============================================================================
// HANDLER MEMORY
// ============================================================================

/// One past decision, as remembered by its handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub entity_id: EntityId,
    pub action: DecisionAction,
    pub outcome: DecisionOutcome,
    pub confidence: f64,
    pub response_ms: f64,
    pub recorded_at: Timestamp,
}

/// Running success metrics, maintained incrementally: every rate is the
/// running mean of an indicator, folded with
/// `new = (old * (n - 1) + value) / n`. History is never rescanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SuccessMetrics {
    pub total_handled: u64,
    pub average_response_ms: f64,
    pub resolution_rate: f64,
    pub escalation_rate: f64,
    pub sop_compliance_rate: f64,
}

fn incremental_mean(old: f64, value: f64, n: f64) -> f64 {
    (old * (n - 1.0) + value) / n
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

impl SuccessMetrics {
    /// Fold one decision into the running metrics. O(1).
    pub fn record(&mut self, success: bool, escalated: bool, compliant: bool, response_ms: f64) {
        self.total_handled += 1;
        let n = self.total_handled as f64;
        self.average_response_ms = incremental_mean(self.average_response_ms, response_ms, n);
        self.resolution_rate = incremental_mean(self.resolution_rate, indicator(success), n);
        self.escalation_rate = incremental_mean(self.escalation_rate, indicator(escalated), n);
        self.sop_compliance_rate =
            incremental_mean(self.sop_compliance_rate, indicator(compliant), n);
    }
}

/// Per-incident-type SOP effectiveness. Reporting data only; it does not
/// feed back into routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SopEffectiveness {
    pub samples: u64,
    pub compliance_rate: f64,
    pub success_rate: f64,
    pub average_resolution_ms: f64,
    /// Deduplicated free-form deviation descriptions.
    pub common_deviations: Vec<String>,
}

impl SopEffectiveness {
    fn record(&mut self, compliant: bool, success: bool, resolution_ms: f64, deviations: &[String]) {
        self.samples += 1;
        let n = self.samples as f64;
        self.compliance_rate = incremental_mean(self.compliance_rate, indicator(compliant), n);
        self.success_rate = incremental_mean(self.success_rate, indicator(success), n);
        self.average_resolution_ms =
            incremental_mean(self.average_resolution_ms, resolution_ms, n);
        for deviation in deviations {
            if !self.common_deviations.contains(deviation) {
                self.common_deviations.push(deviation.clone());
            }
        }
    }
}

/// A handler's private, append-only record of past decisions and derived
/// metrics. Created on first registration; never reset except by explicit
/// operator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerMemory {
    conversations: Vec<ConversationEntry>,
    pub learned_patterns: BTreeMap<String, String>,
    pub metrics: SuccessMetrics,
    pub sop_effectiveness: HashMap<IncidentType, SopEffectiveness>,
    pub created_at: Timestamp,
    pub last_decision_at: Option<Timestamp>,
}

impl HandlerMemory {
    /// Fresh memory for a newly registered handler.
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            learned_patterns: BTreeMap::new(),
            metrics: SuccessMetrics::default(),
            sop_effectiveness: HashMap::new(),
            created_at: Utc::now(),
            last_decision_at: None,
        }
    }

    /// Append one decision and fold it into the running metrics.
    pub fn record_decision(&mut self, entry: ConversationEntry, escalated: bool, compliant: bool) {
        let success = entry.outcome == DecisionOutcome::Success;
        self.metrics
            .record(success, escalated, compliant, entry.response_ms);
        self.last_decision_at = Some(entry.recorded_at);
        self.conversations.push(entry);
    }

    /// Fold one decision into the per-incident-type effectiveness report.
    pub fn record_sop_effectiveness(
        &mut self,
        incident_type: IncidentType,
        compliant: bool,
        success: bool,
        resolution_ms: f64,
        deviations: &[String],
    ) {
        self.sop_effectiveness
            .entry(incident_type)
            .or_default()
            .record(compliant, success, resolution_ms, deviations);
    }

    /// Remember a learned pattern.
    pub fn learn_pattern(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.learned_patterns.insert(key.into(), value.into());
    }

    /// Immutable snapshot of past decisions, oldest first.
    pub fn conversations(&self) -> &[ConversationEntry] {
        &self.conversations
    }
}

impl Default for HandlerMemory {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// System-level routing metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub agent_count: usize,
    pub last_processed: Option<Timestamp>,
}

struct RegisteredHandler {
    key: String,
    handler: Box<dyn Handler>,
    /// Per-handler critical section: routing two entities to the same
    /// handler concurrently serializes on this lock, keeping the
    /// incremental mean's read-modify-write atomic.
    memory: Mutex<HandlerMemory>,
}

/// Holds the registered handlers and routes activities/incidents to the
/// first capable one. First-match is safe because capability keys are
/// validated to be unique at registration time.
pub struct Orchestrator {
    handlers: Vec<RegisteredHandler>,
    config: VigilConfig,
    last_processed: Mutex<Option<Timestamp>>,
}

impl Orchestrator {
    pub fn new(config: VigilConfig) -> Self {
        Self {
            handlers: Vec::new(),
            config,
            last_processed: Mutex::new(None),
        }
    }

    /// Register a handler. Rejects a duplicate capability key so that
    /// first-match routing cannot silently depend on registration order.
    pub fn register(&mut self, handler: Box<dyn Handler>) -> VigilResult<()> {
        let key = handler.capability().to_string();
        if self.handlers.iter().any(|r| r.key == key) {
            return Err(VigilError::Routing(RoutingError::DuplicateCapability {
                capability: key,
            }));
        }
        self.handlers.push(RegisteredHandler {
            key,
            handler,
            memory: Mutex::new(HandlerMemory::new()),
        });
        Ok(())
    }

    /// Route an activity to the first capable handler.
    ///
    /// No capable handler means no decision and no error: escalation and
    /// routing are independent subsystems that must both permit action.
    pub fn route_activity(&self, activity: &Activity) -> Option<Decision> {
        let registered = self
            .handlers
            .iter()
            .find(|r| r.handler.can_handle_activity(activity))?;

        let started = Instant::now();
        let decision = registered.handler.process_activity(activity);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.settle(
            registered,
            &decision,
            activity.activity_id,
            IncidentType::from(activity.activity_type),
            elapsed_ms,
        );
        Some(decision)
    }

    /// Route a committed incident to the first capable handler.
    ///
    /// The incident already exists, so having no handler for it is a hard
    /// error, not a silent no-op.
    pub fn route_incident(&self, incident: &Incident) -> VigilResult<Decision> {
        let registered = self
            .handlers
            .iter()
            .find(|r| r.handler.can_handle_incident(incident))
            .ok_or(VigilError::Routing(RoutingError::NoHandler {
                incident_id: incident.incident_id,
            }))?;

        let started = Instant::now();
        let decision = registered.handler.process_incident(incident);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.settle(
            registered,
            &decision,
            incident.incident_id,
            incident.incident_type,
            elapsed_ms,
        );
        Ok(decision)
    }

    /// Snapshot of a handler's memory. Absence is expected, not an error.
    pub fn memory(&self, capability: &str) -> Option<HandlerMemory> {
        self.handlers
            .iter()
            .find(|r| r.key == capability)
            .map(|r| r.memory.lock().unwrap().clone())
    }

    /// Explicit operator action: wipe one handler's memory.
    pub fn reset_memory(&self, capability: &str) -> bool {
        match self.handlers.iter().find(|r| r.key == capability) {
            Some(registered) => {
                *registered.memory.lock().unwrap() = HandlerMemory::new();
                true
            }
            None => false,
        }
    }

    /// Registered capability keys, in registration order.
    pub fn capabilities(&self) -> Vec<&str> {
        self.handlers.iter().map(|r| r.key.as_str()).collect()
    }

    pub fn system_metrics(&self) -> SystemMetrics {
        SystemMetrics {
            agent_count: self.handlers.len(),
            last_processed: *self.last_processed.lock().unwrap(),
        }
    }

    /// Classify the outcome, fold it into the chosen handler's memory, and
    /// stamp `last_processed`. A decision slower than the configured bound
    /// is classified a failure: handlers are pure computation, so the
    /// timeout policy is observational rather than preemptive.
    fn settle(
        &self,
        registered: &RegisteredHandler,
        decision: &Decision,
        entity_id: EntityId,
        incident_type: IncidentType,
        elapsed_ms: f64,
    ) {
        let timed_out = elapsed_ms > self.config.decision_timeout.as_secs_f64() * 1000.0;
        if timed_out {
            tracing::warn!(
                handler = %registered.key,
                elapsed_ms,
                "handler decision exceeded the configured timeout; outcome classified as failure"
            );
        }
        let success =
            !timed_out && decision.confidence > self.config.success_confidence_threshold;

        let (compliant, deviations) = match registered.handler.sop_for(incident_type) {
            Some(sop) => evaluate_sop_compliance(sop, &decision.sop_steps_applied),
            // No SOP applies: compliance holds vacuously.
            None => (true, Vec::new()),
        };

        let entry = ConversationEntry {
            entity_id,
            action: decision.action,
            outcome: if success {
                DecisionOutcome::Success
            } else {
                DecisionOutcome::Failure
            },
            confidence: decision.confidence,
            response_ms: elapsed_ms,
            recorded_at: Utc::now(),
        };

        let mut memory = registered.memory.lock().unwrap();
        memory.record_decision(entry, decision.escalation_required, compliant);
        memory.record_sop_effectiveness(incident_type, compliant, success, elapsed_ms, &deviations);
        drop(memory);

        *self.last_processed.lock().unwrap() = Some(Utc::now());
    }
}

// ============================================================================
// CONCRETE HANDLERS
// ============================================================================

/// Handler for medical emergencies.
pub struct MedicalEmergencyHandler {
    sop: Sop,
}

impl MedicalEmergencyHandler {
    pub fn new() -> Self {
        Self {
            sop: Sop {
                incident_type: IncidentType::MedicalEmergency,
                steps: vec![
                    SopStep {
                        step_id: "dispatch-ems".to_string(),
                        title: "Dispatch EMS to the scene".to_string(),
                        estimated_duration_ms: 120_000,
                        required: true,
                        depends_on: vec![],
                        assigned_role: ActorRole::Officer,
                    },
                    SopStep {
                        step_id: "secure-scene".to_string(),
                        title: "Secure the immediate area".to_string(),
                        estimated_duration_ms: 300_000,
                        required: true,
                        depends_on: vec!["dispatch-ems".to_string()],
                        assigned_role: ActorRole::Officer,
                    },
                    SopStep {
                        step_id: "first-aid".to_string(),
                        title: "Administer first aid if trained".to_string(),
                        estimated_duration_ms: 600_000,
                        required: false,
                        depends_on: vec!["secure-scene".to_string()],
                        assigned_role: ActorRole::Officer,
                    },
                    SopStep {
                        step_id: "notify-supervisor".to_string(),
                        title: "Notify shift supervisor".to_string(),
                        estimated_duration_ms: 60_000,
                        required: true,
                        depends_on: vec![],
                        assigned_role: ActorRole::Supervisor,
                    },
                ],
            },
        }
    }
}

impl Default for MedicalEmergencyHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for MedicalEmergencyHandler {
    fn capability(&self) -> &str {
        "medical-emergency"
    }

    fn can_handle_activity(&self, activity: &Activity) -> bool {
        activity.activity_type == ActivityType::Medical
    }

    fn can_handle_incident(&self, incident: &Incident) -> bool {
        incident.incident_type == IncidentType::MedicalEmergency
    }

    fn process_activity(&self, activity: &Activity) -> Decision {
        let confidence = if activity.priority >= Priority::High { 0.95 } else { 0.85 };
        Decision::new(self.capability(), DecisionAction::CreateIncident, confidence)
            .with_sop_steps(vec![
                "dispatch-ems".to_string(),
                "secure-scene".to_string(),
                "notify-supervisor".to_string(),
            ])
            .with_escalation_required(activity.priority >= Priority::High)
            .with_metadata("location", activity.location.clone())
    }

    fn process_incident(&self, incident: &Incident) -> Decision {
        Decision::new(self.capability(), DecisionAction::Escalate, 0.9)
            .with_sop_steps(vec![
                "dispatch-ems".to_string(),
                "secure-scene".to_string(),
                "notify-supervisor".to_string(),
            ])
            .with_escalation_required(incident.priority >= Priority::High)
    }

    fn sop_for(&self, incident_type: IncidentType) -> Option<&Sop> {
        (incident_type == IncidentType::MedicalEmergency).then_some(&self.sop)
    }
}

/// Handler for security breaches and access violations.
pub struct SecurityBreachHandler {
    sop: Sop,
}

impl SecurityBreachHandler {
    pub fn new() -> Self {
        Self {
            sop: Sop {
                incident_type: IncidentType::SecurityBreach,
                steps: vec![
                    SopStep {
                        step_id: "lockdown-zone".to_string(),
                        title: "Lock down the affected zone".to_string(),
                        estimated_duration_ms: 180_000,
                        required: true,
                        depends_on: vec![],
                        assigned_role: ActorRole::Officer,
                    },
                    SopStep {
                        step_id: "review-cameras".to_string(),
                        title: "Review camera coverage of the zone".to_string(),
                        estimated_duration_ms: 600_000,
                        required: true,
                        depends_on: vec!["lockdown-zone".to_string()],
                        assigned_role: ActorRole::Officer,
                    },
                    SopStep {
                        step_id: "sweep-area".to_string(),
                        title: "Physical sweep of the area".to_string(),
                        estimated_duration_ms: 900_000,
                        required: false,
                        depends_on: vec!["lockdown-zone".to_string()],
                        assigned_role: ActorRole::Officer,
                    },
                    SopStep {
                        step_id: "file-report".to_string(),
                        title: "File the breach report".to_string(),
                        estimated_duration_ms: 300_000,
                        required: true,
                        depends_on: vec!["review-cameras".to_string()],
                        assigned_role: ActorRole::Supervisor,
                    },
                ],
            },
        }
    }

    fn handles_type(&self, activity_type: ActivityType) -> bool {
        matches!(
            activity_type,
            ActivityType::SecurityBreach
                | ActivityType::UnauthorizedAccess
                | ActivityType::Tailgating
        )
    }
}

impl Default for SecurityBreachHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for SecurityBreachHandler {
    fn capability(&self) -> &str {
        "security-breach"
    }

    fn can_handle_activity(&self, activity: &Activity) -> bool {
        self.handles_type(activity.activity_type)
    }

    fn can_handle_incident(&self, incident: &Incident) -> bool {
        matches!(
            incident.incident_type,
            IncidentType::SecurityBreach
                | IncidentType::UnauthorizedAccess
                | IncidentType::Tailgating
        )
    }

    fn process_activity(&self, activity: &Activity) -> Decision {
        // Sensor detections with strong confidence go straight to incident
        // creation; weak ones are held for monitoring.
        let (action, confidence) = if activity.confidence > 0.0 && activity.confidence < 0.5 {
            (DecisionAction::Monitor, 0.6)
        } else {
            (DecisionAction::CreateIncident, 0.85)
        };
        Decision::new(self.capability(), action, confidence)
            .with_sop_steps(vec!["lockdown-zone".to_string(), "review-cameras".to_string()])
            .with_escalation_required(activity.priority >= Priority::Critical)
            .with_metadata("location", activity.location.clone())
    }

    fn process_incident(&self, incident: &Incident) -> Decision {
        Decision::new(self.capability(), DecisionAction::Escalate, 0.88)
            .with_sop_steps(vec![
                "lockdown-zone".to_string(),
                "review-cameras".to_string(),
                "file-report".to_string(),
            ])
            .with_escalation_required(incident.priority >= Priority::High)
    }

    fn sop_for(&self, incident_type: IncidentType) -> Option<&Sop> {
        matches!(
            incident_type,
            IncidentType::SecurityBreach
                | IncidentType::UnauthorizedAccess
                | IncidentType::Tailgating
        )
        .then_some(&self.sop)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vigil_core::{ActivityStatus, ActorClass, IncidentStatus};

    fn activity(activity_type: ActivityType, priority: Priority) -> Activity {
        let now = Utc::now();
        Activity {
            activity_id: Uuid::now_v7(),
            activity_type,
            title: "t".to_string(),
            description: None,
            priority,
            status: ActivityStatus::Detecting,
            location: "wing b".to_string(),
            site: None,
            source: ActorClass::Human,
            confidence: 0.0,
            system_tags: Vec::new(),
            user_tags: Vec::new(),
            incident_ids: Vec::new(),
            retention_deadline: now,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn incident(incident_type: IncidentType, priority: Priority) -> Incident {
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

    fn orchestrator() -> Orchestrator {
        let mut orch = Orchestrator::new(VigilConfig::standard());
        orch.register(Box::new(MedicalEmergencyHandler::new())).unwrap();
        orch.register(Box::new(SecurityBreachHandler::new())).unwrap();
        orch
    }

    #[test]
    fn test_duplicate_capability_rejected() {
        let mut orch = Orchestrator::new(VigilConfig::standard());
        orch.register(Box::new(MedicalEmergencyHandler::new())).unwrap();
        let result = orch.register(Box::new(MedicalEmergencyHandler::new()));
        assert!(matches!(
            result,
            Err(VigilError::Routing(RoutingError::DuplicateCapability { capability }))
                if capability == "medical-emergency"
        ));
    }

    #[test]
    fn test_route_activity_first_match() {
        let orch = orchestrator();
        let decision = orch
            .route_activity(&activity(ActivityType::Medical, Priority::Critical))
            .unwrap();
        assert_eq!(decision.handler_key, "medical-emergency");
        assert!(decision.escalation_required);
    }

    #[test]
    fn test_route_activity_no_handler_is_none() {
        let orch = orchestrator();
        assert!(orch
            .route_activity(&activity(ActivityType::PropertyDamage, Priority::Medium))
            .is_none());
        // No memory was touched and nothing was processed.
        assert!(orch.system_metrics().last_processed.is_none());
    }

    #[test]
    fn test_route_incident_no_handler_is_hard_error() {
        let orch = orchestrator();
        let result = orch.route_incident(&incident(IncidentType::PropertyDamage, Priority::Medium));
        assert!(matches!(
            result,
            Err(VigilError::Routing(RoutingError::NoHandler { .. }))
        ));
    }

    #[test]
    fn test_route_updates_memory_and_last_processed() {
        let orch = orchestrator();
        orch.route_activity(&activity(ActivityType::Medical, Priority::Critical))
            .unwrap();
        orch.route_incident(&incident(IncidentType::MedicalEmergency, Priority::High))
            .unwrap();

        let memory = orch.memory("medical-emergency").unwrap();
        assert_eq!(memory.metrics.total_handled, 2);
        assert_eq!(memory.conversations().len(), 2);
        assert!(memory.last_decision_at.is_some());
        assert!(orch.system_metrics().last_processed.is_some());

        // The other handler's memory is untouched.
        let other = orch.memory("security-breach").unwrap();
        assert_eq!(other.metrics.total_handled, 0);
    }

    #[test]
    fn test_outcome_classification_threshold() {
        let orch = orchestrator();
        // Medical critical -> confidence 0.95 -> success.
        orch.route_activity(&activity(ActivityType::Medical, Priority::Critical))
            .unwrap();
        // Medical low -> confidence 0.85 -> success as well (> 0.8).
        orch.route_activity(&activity(ActivityType::Medical, Priority::Low))
            .unwrap();
        let memory = orch.memory("medical-emergency").unwrap();
        assert!((memory.metrics.resolution_rate - 1.0).abs() < 1e-9);

        // A weak sensor detection routes to Monitor with confidence 0.6 -> failure.
        let mut weak = activity(ActivityType::Tailgating, Priority::Low);
        weak.confidence = 0.3;
        orch.route_activity(&weak).unwrap();
        let memory = orch.memory("security-breach").unwrap();
        assert!((memory.metrics.resolution_rate - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_sop_deviations_recorded() {
        let orch = orchestrator();
        // Incident processing applies lockdown-zone, review-cameras,
        // file-report: fully compliant.
        orch.route_incident(&incident(IncidentType::SecurityBreach, Priority::High))
            .unwrap();
        let memory = orch.memory("security-breach").unwrap();
        let eff = memory
            .sop_effectiveness
            .get(&IncidentType::SecurityBreach)
            .unwrap();
        assert_eq!(eff.samples, 1);
        assert!((eff.compliance_rate - 1.0).abs() < 1e-9);
        assert!(eff.common_deviations.is_empty());

        // Activity processing skips file-report: one deviation, deduplicated
        // across repeats.
        orch.route_activity(&activity(ActivityType::SecurityBreach, Priority::Medium))
            .unwrap();
        orch.route_activity(&activity(ActivityType::SecurityBreach, Priority::Medium))
            .unwrap();
        let memory = orch.memory("security-breach").unwrap();
        let eff = memory
            .sop_effectiveness
            .get(&IncidentType::SecurityBreach)
            .unwrap();
        assert_eq!(eff.samples, 3);
        assert_eq!(eff.common_deviations, vec!["missing step: file-report".to_string()]);
    }

    #[test]
    fn test_memory_absent_for_unknown_capability() {
        let orch = orchestrator();
        assert!(orch.memory("bomb-disposal").is_none());
    }

    #[test]
    fn test_reset_memory_is_explicit() {
        let orch = orchestrator();
        orch.route_activity(&activity(ActivityType::Medical, Priority::High))
            .unwrap();
        assert_eq!(orch.memory("medical-emergency").unwrap().metrics.total_handled, 1);

        assert!(orch.reset_memory("medical-emergency"));
        assert_eq!(orch.memory("medical-emergency").unwrap().metrics.total_handled, 0);
        assert!(!orch.reset_memory("unknown"));
    }

    #[test]
    fn test_timeout_classifies_failure() {
        struct SlowHandler;
        impl Handler for SlowHandler {
            fn capability(&self) -> &str {
                "slow"
            }
            fn can_handle_activity(&self, _: &Activity) -> bool {
                true
            }
            fn can_handle_incident(&self, _: &Incident) -> bool {
                true
            }
            fn process_activity(&self, _: &Activity) -> Decision {
                std::thread::sleep(std::time::Duration::from_millis(5));
                Decision::new("slow", DecisionAction::Monitor, 0.99)
            }
            fn process_incident(&self, _: &Incident) -> Decision {
                Decision::new("slow", DecisionAction::Monitor, 0.99)
            }
            fn sop_for(&self, _: IncidentType) -> Option<&Sop> {
                None
            }
        }

        let mut config = VigilConfig::standard();
        config.decision_timeout = std::time::Duration::from_millis(1);
        let mut orch = Orchestrator::new(config);
        orch.register(Box::new(SlowHandler)).unwrap();

        orch.route_activity(&activity(ActivityType::Patrol, Priority::Low))
            .unwrap();
        let memory = orch.memory("slow").unwrap();
        // Confidence 0.99 would be a success, but the decision blew the bound.
        assert_eq!(memory.conversations()[0].outcome, DecisionOutcome::Failure);
        assert!((memory.metrics.resolution_rate - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_sop_compliance_evaluation() {
        let sop = MedicalEmergencyHandler::new().sop;
        let (compliant, deviations) = evaluate_sop_compliance(
            &sop,
            &[
                "dispatch-ems".to_string(),
                "secure-scene".to_string(),
                "notify-supervisor".to_string(),
            ],
        );
        assert!(compliant);
        assert!(deviations.is_empty());

        let (compliant, deviations) =
            evaluate_sop_compliance(&sop, &["dispatch-ems".to_string()]);
        assert!(!compliant);
        assert_eq!(
            deviations,
            vec![
                "missing step: secure-scene".to_string(),
                "missing step: notify-supervisor".to_string(),
            ]
        );
    }

    #[test]
    fn test_learned_patterns() {
        let mut memory = HandlerMemory::new();
        memory.learn_pattern("dock-4-after-hours", "recurring false positives from forklift");
        assert_eq!(
            memory.learned_patterns.get("dock-4-after-hours").map(String::as_str),
            Some("recurring false positives from forklift")
        );
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// The incremental update formula must agree with a full recompute
        /// over the entire history, for any interleaving of decisions.
        #[test]
        fn prop_incremental_metrics_match_recompute(
            decisions in proptest::collection::vec(
                (0.0f64..=1.0f64, proptest::bool::ANY, proptest::bool::ANY, 0.0f64..5000.0),
                1..50,
            )
        ) {
            let threshold = 0.8f64;
            let mut memory = HandlerMemory::new();
            for (confidence, escalated, compliant, response_ms) in &decisions {
                let success = *confidence > threshold;
                memory.record_decision(
                    ConversationEntry {
                        entity_id: Uuid::now_v7(),
                        action: DecisionAction::Monitor,
                        outcome: if success {
                            DecisionOutcome::Success
                        } else {
                            DecisionOutcome::Failure
                        },
                        confidence: *confidence,
                        response_ms: *response_ms,
                        recorded_at: Utc::now(),
                    },
                    *escalated,
                    *compliant,
                );
            }

            let n = decisions.len() as f64;
            let successes = decisions.iter().filter(|(c, ..)| *c > threshold).count() as f64;
            let escalations = decisions.iter().filter(|(_, e, ..)| *e).count() as f64;
            let compliant = decisions.iter().filter(|(_, _, c, _)| *c).count() as f64;
            let mean_ms: f64 = decisions.iter().map(|(.., ms)| ms).sum::<f64>() / n;

            prop_assert_eq!(memory.metrics.total_handled, decisions.len() as u64);
            prop_assert!((memory.metrics.resolution_rate - successes / n).abs() < 1e-9);
            prop_assert!((memory.metrics.escalation_rate - escalations / n).abs() < 1e-9);
            prop_assert!((memory.metrics.sop_compliance_rate - compliant / n).abs() < 1e-9);
            prop_assert!((memory.metrics.average_response_ms - mean_ms).abs() < 1e-6);
        }

        /// Conversations are append-only: each record adds exactly one entry
        /// and earlier entries are untouched.
        #[test]
        fn prop_conversations_append_only(
            confidences in proptest::collection::vec(0.0f64..=1.0f64, 1..30)
        ) {
            let mut memory = HandlerMemory::new();
            let mut prev_len = 0usize;
            let mut first_entry: Option<ConversationEntry> = None;
            for confidence in confidences {
                memory.record_decision(
                    ConversationEntry {
                        entity_id: Uuid::now_v7(),
                        action: DecisionAction::Resolve,
                        outcome: DecisionOutcome::Success,
                        confidence,
                        response_ms: 1.0,
                        recorded_at: Utc::now(),
                    },
                    false,
                    true,
                );
                prop_assert_eq!(memory.conversations().len(), prev_len + 1);
                prev_len = memory.conversations().len();
                match &first_entry {
                    None => first_entry = Some(memory.conversations()[0].clone()),
                    Some(first) => prop_assert_eq!(first, &memory.conversations()[0]),
                }
            }
        }
    }
}
