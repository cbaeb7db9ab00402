//! Auto-escalation evaluator: activity -> pending incident.

use crate::tables::ESCALATION_RULES;
use chrono::Utc;
use uuid::Uuid;
use vigil_core::{Activity, Incident, IncidentStatus, IncidentType};

/// Apply the escalation rules to a validated activity.
///
/// Returns the pending incident when a rule triggers, `None` otherwise.
/// The returned incident always starts `Pending` with `requires_validation`
/// and `dismissible` set: auto-creation requires human-in-the-loop
/// confirmation before the incident can become active. Side effects on
/// trigger (the `auto-generated` tag, audit entry, `incident.auto_created`
/// event) are the caller's responsibility, after this pure evaluation.
pub fn evaluate(activity: &Activity) -> Option<Incident> {
    let rule = ESCALATION_RULES
        .iter()
        .find(|r| r.activity_type == activity.activity_type)?;

    if !rule.condition.matches(activity) {
        return None;
    }

    let now = Utc::now();
    Some(Incident {
        incident_id: Uuid::now_v7(),
        incident_type: IncidentType::from(activity.activity_type),
        status: IncidentStatus::Pending,
        priority: activity.priority,
        trigger_activity_id: activity.activity_id,
        requires_validation: true,
        dismissible: true,
        created_at: now,
        updated_at: now,
    })
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
    use vigil_core::{ActivityStatus, ActivityType, ActorClass, Priority};

    fn any_type() -> impl Strategy<Value = ActivityType> {
        proptest::sample::select(ActivityType::ALL.to_vec())
    }

    fn any_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Low),
            Just(Priority::Medium),
            Just(Priority::High),
            Just(Priority::Critical),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Every non-patrol/evidence type yields a pending incident;
        /// patrol and evidence never yield one.
        #[test]
        fn prop_escalation_policy(activity_type in any_type(), priority in any_priority()) {
            let now = chrono::Utc::now();
            let activity = Activity {
                activity_id: uuid::Uuid::now_v7(),
                activity_type,
                title: "p".to_string(),
                description: None,
                priority,
                status: ActivityStatus::Detecting,
                location: "x".to_string(),
                site: None,
                source: ActorClass::Integration,
                confidence: 0.4,
                system_tags: Vec::new(),
                user_tags: Vec::new(),
                incident_ids: Vec::new(),
                retention_deadline: now,
                archived: false,
                created_at: now,
                updated_at: now,
            };

            match evaluate(&activity) {
                Some(incident) => {
                    prop_assert!(!matches!(
                        activity_type,
                        ActivityType::Patrol | ActivityType::Evidence
                    ));
                    prop_assert_eq!(incident.status, IncidentStatus::Pending);
                    prop_assert!(incident.requires_validation);
                }
                None => {
                    prop_assert!(matches!(
                        activity_type,
                        ActivityType::Patrol | ActivityType::Evidence
                    ));
                }
            }
        }
    }
}
