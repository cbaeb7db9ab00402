//! End-to-end pipeline tests: intake through escalation, routing, custody,
//! and closure, over the in-memory collaborators.

use std::sync::Arc;
use vigil_agents::{MedicalEmergencyHandler, Orchestrator, SecurityBreachHandler};
use vigil_core::{
    ActivityType, ActorRole, CaseOutcome, CaseStatus, IncidentStatus, IncidentType, NewActivity,
    Priority, ProcessingResult, ProcessingStatus, VigilConfig,
};
use vigil_events::EventType;
use vigil_service::{Engine, ServiceDeps};
use vigil_storage::StorageTrait;
use vigil_test_utils::{test_ctx, test_incident, InMemoryAuditLog, InMemoryEventBus, MockStorage};

struct Rig {
    engine: Engine,
    storage: Arc<MockStorage>,
    audit: InMemoryAuditLog,
    events: InMemoryEventBus,
}

fn rig() -> Rig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();

    let storage = Arc::new(MockStorage::new());
    let audit = InMemoryAuditLog::new();
    let events = InMemoryEventBus::new();

    let mut orchestrator = Orchestrator::new(VigilConfig::standard());
    orchestrator
        .register(Box::new(MedicalEmergencyHandler::new()))
        .unwrap();
    orchestrator
        .register(Box::new(SecurityBreachHandler::new()))
        .unwrap();

    let deps = ServiceDeps::new(
        storage.clone(),
        Arc::new(audit.clone()),
        Arc::new(events.clone()),
    );
    let engine = Engine::new(VigilConfig::standard(), deps, Arc::new(orchestrator)).unwrap();
    Rig {
        engine,
        storage,
        audit,
        events,
    }
}

#[test]
fn medical_intake_runs_the_whole_pipeline() {
    let r = rig();
    let ctx = test_ctx(ActorRole::Officer, "activity.create");

    let outcome = r
        .engine
        .activities
        .create_activity(
            NewActivity::new(ActivityType::Medical, "worker down", "assembly line 2"),
            &ctx,
        )
        .unwrap();

    // Escalation: pending incident, critical priority from the type table.
    let incident = outcome.incident.as_ref().unwrap();
    assert_eq!(incident.status, IncidentStatus::Pending);
    assert_eq!(incident.priority, Priority::Critical);

    // Routing: the medical handler claimed it and its memory was updated.
    let decision = outcome.decision.as_ref().unwrap();
    assert_eq!(decision.handler_key, "medical-emergency");
    let memory = r.engine.orchestrator.memory("medical-emergency").unwrap();
    assert_eq!(memory.metrics.total_handled, 1);

    // Hand-off: a case referencing the incident was opened.
    assert_eq!(r.storage.case_count(), 1);

    // Audit and events fired for every stage.
    let actions: Vec<String> = r.audit.entries().iter().map(|e| e.action.clone()).collect();
    assert!(actions.contains(&"activity.create".to_string()));
    assert!(actions.contains(&"incident.auto_create".to_string()));
    assert!(actions.contains(&"case.create".to_string()));
    assert_eq!(r.events.count_of(EventType::IncidentAutoCreated), 1);
    assert_eq!(r.events.count_of(EventType::CaseCreated), 1);
}

#[test]
fn pending_incident_confirmation_then_case_to_closure() {
    let r = rig();
    let officer = test_ctx(ActorRole::Officer, "engine");
    let supervisor = test_ctx(ActorRole::Supervisor, "engine");

    let outcome = r
        .engine
        .activities
        .create_activity(
            NewActivity::new(ActivityType::SecurityBreach, "server room forced", "dc-1"),
            &officer,
        )
        .unwrap();
    let incident = outcome.incident.unwrap();

    // Human confirmation gate.
    let confirmed = r
        .engine
        .incidents
        .confirm_incident(incident.incident_id, &supervisor)
        .unwrap();
    assert_eq!(confirmed.status, IncidentStatus::Active);

    // Open a case for the incident, collect and process evidence, close.
    let case = r
        .engine
        .cases
        .open_or_update_for_incident(&confirmed, &supervisor)
        .unwrap();
    let item = r
        .engine
        .cases
        .add_evidence(
            case.case_id,
            vigil_core::NewEvidence {
                evidence_type: vigil_core::EvidenceType::Video,
                classification: vigil_core::Classification::Confidential,
                file_ref: None,
                location: Some("rack row c".to_string()),
                notes: None,
            },
            &officer,
        )
        .unwrap();
    r.engine
        .cases
        .process_evidence(
            item.evidence_id,
            ProcessingResult {
                status: ProcessingStatus::Processed,
                notes: None,
            },
            &officer,
        )
        .unwrap();

    for status in [
        CaseStatus::Investigating,
        CaseStatus::EvidenceCollection,
        CaseStatus::Analysis,
    ] {
        r.engine
            .cases
            .update_case_status(case.case_id, status, &officer)
            .unwrap();
    }

    let closed = r
        .engine
        .cases
        .close_case(
            case.case_id,
            "entry via propped door",
            "alarm the door, retrain staff",
            CaseOutcome::Substantiated,
            &supervisor,
        )
        .unwrap();
    assert_eq!(closed.status, CaseStatus::Closed);

    // The custody chain recorded collection and processing.
    let stored = r.storage.evidence_get(item.evidence_id).unwrap().unwrap();
    assert_eq!(stored.custody_len(), 2);
}

#[test]
fn memory_metrics_survive_interleaving_across_handlers() {
    let r = rig();
    let ctx = test_ctx(ActorRole::Officer, "activity.create");

    // Interleave medical and security intakes; each handler's memory is
    // independent and must match a full recompute of its own history.
    for i in 0..6 {
        let activity_type = if i % 2 == 0 {
            ActivityType::Medical
        } else {
            ActivityType::SecurityBreach
        };
        r.engine
            .activities
            .create_activity(
                NewActivity::new(activity_type, "event", "site"),
                &ctx,
            )
            .unwrap();
    }
    // Route a few committed incidents at the same handlers.
    for _ in 0..2 {
        r.engine
            .orchestrator
            .route_incident(&test_incident(IncidentType::MedicalEmergency, Priority::High))
            .unwrap();
    }

    for capability in ["medical-emergency", "security-breach"] {
        let memory = r.engine.orchestrator.memory(capability).unwrap();
        let n = memory.conversations().len();
        assert_eq!(memory.metrics.total_handled as usize, n);
        let successes = memory
            .conversations()
            .iter()
            .filter(|c| c.confidence > 0.8)
            .count();
        assert!((memory.metrics.resolution_rate - successes as f64 / n as f64).abs() < 1e-9);
    }
}

#[test]
fn routing_without_escalation_stays_decoupled() {
    let r = rig();
    let ctx = test_ctx(ActorRole::Officer, "activity.create");

    // Patrol never escalates and no handler claims it: the pipeline ends
    // quietly after intake.
    let outcome = r
        .engine
        .activities
        .create_activity(NewActivity::new(ActivityType::Patrol, "round", "yard"), &ctx)
        .unwrap();
    assert!(outcome.incident.is_none());
    assert!(outcome.decision.is_none());
    assert_eq!(r.storage.incident_count(), 0);
    assert_eq!(r.storage.case_count(), 0);
}
