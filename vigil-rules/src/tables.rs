//! Declarative rule tables. Pure data, no behavior beyond predicate matching.
//!
//! Rule conditions are a closed set of tagged variants so every rule kind is
//! checked exhaustively at compile time. Transition rules carry explicit role
//! membership lists; nothing is inferred from a role hierarchy.

use once_cell::sync::Lazy;
use vigil_core::{Activity, ActivityStatus, ActivityType, ActorRole, CaseStatus, Priority};

// ============================================================================
// TRANSITION RULES
// ============================================================================

/// One role-gated status transition rule.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRule<S> {
    pub from: S,
    pub to: S,
    /// Every role allowed to perform this transition, enumerated explicitly.
    pub roles: &'static [ActorRole],
    pub requires_approval: bool,
}

const ALL_ROLES: &[ActorRole] = &[ActorRole::Officer, ActorRole::Supervisor, ActorRole::Admin];
const ELEVATED_ROLES: &[ActorRole] = &[ActorRole::Supervisor, ActorRole::Admin];

/// Status transition table for activities.
///
/// Normal roles move forward only; supervisors and admins may also move
/// backward, and any transition leaving `resolved` requires approval.
pub static ACTIVITY_TRANSITIONS: Lazy<Vec<TransitionRule<ActivityStatus>>> = Lazy::new(|| {
    use ActivityStatus::*;
    let mut rules = vec![
        // Forward chain, open to every role.
        TransitionRule { from: Detecting, to: Assigned, roles: ALL_ROLES, requires_approval: false },
        TransitionRule { from: Assigned, to: Responding, roles: ALL_ROLES, requires_approval: false },
        TransitionRule { from: Responding, to: Resolved, roles: ALL_ROLES, requires_approval: false },
    ];
    // Backward corrections, elevated roles only.
    for (from, to) in [
        (Assigned, Detecting),
        (Responding, Assigned),
        (Responding, Detecting),
        (Resolved, Responding),
        (Resolved, Assigned),
        (Resolved, Detecting),
    ] {
        rules.push(TransitionRule {
            from,
            to,
            roles: ELEVATED_ROLES,
            requires_approval: from == Resolved,
        });
    }
    rules
});

/// Status transition table for cases.
///
/// Forward chain for every role, with `evidence_collection -> analysis`
/// flagged for approval; reopen paths are restricted to elevated roles with
/// rule-specific approval flags.
pub static CASE_TRANSITIONS: Lazy<Vec<TransitionRule<CaseStatus>>> = Lazy::new(|| {
    use CaseStatus::*;
    vec![
        TransitionRule { from: Open, to: Investigating, roles: ALL_ROLES, requires_approval: false },
        TransitionRule { from: Investigating, to: EvidenceCollection, roles: ALL_ROLES, requires_approval: false },
        TransitionRule { from: EvidenceCollection, to: Analysis, roles: ALL_ROLES, requires_approval: true },
        TransitionRule { from: Analysis, to: Closed, roles: ALL_ROLES, requires_approval: false },
        // Reopen paths.
        TransitionRule { from: Closed, to: Analysis, roles: ELEVATED_ROLES, requires_approval: true },
        TransitionRule { from: Analysis, to: Investigating, roles: ELEVATED_ROLES, requires_approval: true },
        TransitionRule { from: Investigating, to: Open, roles: ELEVATED_ROLES, requires_approval: false },
    ]
});

// ============================================================================
// ESCALATION RULES
// ============================================================================

/// A single field predicate inside a conditional escalation rule.
/// Predicates in one condition are matched as a conjunction.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate {
    PriorityAtLeast(Priority),
    ConfidenceAtLeast(f64),
    LocationEquals(String),
}

impl FieldPredicate {
    /// Evaluate this predicate against an activity.
    pub fn matches(&self, activity: &Activity) -> bool {
        match self {
            FieldPredicate::PriorityAtLeast(p) => activity.priority >= *p,
            FieldPredicate::ConfidenceAtLeast(c) => activity.confidence >= *c,
            FieldPredicate::LocationEquals(loc) => activity.location == *loc,
        }
    }
}

/// Condition attached to an escalation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    Always,
    Never,
    Conditional(Vec<FieldPredicate>),
}

impl RuleCondition {
    /// Evaluate this condition against an activity.
    pub fn matches(&self, activity: &Activity) -> bool {
        match self {
            RuleCondition::Always => true,
            RuleCondition::Never => false,
            RuleCondition::Conditional(predicates) => {
                predicates.iter().all(|p| p.matches(activity))
            }
        }
    }
}

/// One auto-escalation rule: activity type -> condition.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationRule {
    pub activity_type: ActivityType,
    pub condition: RuleCondition,
}

/// Universal escalation policy: every activity type except `patrol` and
/// `evidence` always triggers incident creation.
pub static ESCALATION_RULES: Lazy<Vec<EscalationRule>> = Lazy::new(|| {
    ActivityType::ALL
        .iter()
        .map(|&activity_type| EscalationRule {
            activity_type,
            condition: match activity_type {
                ActivityType::Patrol | ActivityType::Evidence => RuleCondition::Never,
                _ => RuleCondition::Always,
            },
        })
        .collect()
});

// ============================================================================
// TYPE -> PRIORITY LOOKUP
// ============================================================================

/// Default priority for an activity type when the reporter left it unset.
pub fn default_priority_for(activity_type: ActivityType) -> Priority {
    match activity_type {
        ActivityType::Medical => Priority::Critical,
        ActivityType::SecurityBreach | ActivityType::BolEvent => Priority::High,
        ActivityType::Alert | ActivityType::PropertyDamage => Priority::Medium,
        ActivityType::Patrol | ActivityType::Evidence => Priority::Low,
        // Everything else falls through to the default bucket.
        ActivityType::Tailgating
        | ActivityType::SuspiciousBehavior
        | ActivityType::UnauthorizedAccess => Priority::Medium,
    }
}

/// Resolve the effective priority of a draft: the reporter's explicit value
/// wins, otherwise the type table decides.
pub fn resolve_priority(explicit: Option<Priority>, activity_type: ActivityType) -> Priority {
    explicit.unwrap_or_else(|| default_priority_for(activity_type))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use vigil_core::ActorClass;

    fn activity(priority: Priority, confidence: f64) -> Activity {
        let now = Utc::now();
        Activity {
            activity_id: Uuid::now_v7(),
            activity_type: ActivityType::Alert,
            title: "perimeter alert".to_string(),
            description: None,
            priority,
            status: ActivityStatus::Detecting,
            location: "dock 4".to_string(),
            site: None,
            source: ActorClass::Ambient,
            confidence,
            system_tags: Vec::new(),
            user_tags: Vec::new(),
            incident_ids: Vec::new(),
            retention_deadline: now,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_escalation_table_covers_every_type() {
        assert_eq!(ESCALATION_RULES.len(), ActivityType::ALL.len());
        for t in ActivityType::ALL {
            assert!(ESCALATION_RULES.iter().any(|r| r.activity_type == t));
        }
    }

    #[test]
    fn test_patrol_and_evidence_never_escalate() {
        for rule in ESCALATION_RULES.iter() {
            match rule.activity_type {
                ActivityType::Patrol | ActivityType::Evidence => {
                    assert_eq!(rule.condition, RuleCondition::Never)
                }
                _ => assert_eq!(rule.condition, RuleCondition::Always),
            }
        }
    }

    #[test]
    fn test_priority_table() {
        assert_eq!(default_priority_for(ActivityType::Medical), Priority::Critical);
        assert_eq!(default_priority_for(ActivityType::SecurityBreach), Priority::High);
        assert_eq!(default_priority_for(ActivityType::BolEvent), Priority::High);
        assert_eq!(default_priority_for(ActivityType::Alert), Priority::Medium);
        assert_eq!(default_priority_for(ActivityType::PropertyDamage), Priority::Medium);
        assert_eq!(default_priority_for(ActivityType::Patrol), Priority::Low);
        assert_eq!(default_priority_for(ActivityType::Evidence), Priority::Low);
        assert_eq!(default_priority_for(ActivityType::Tailgating), Priority::Medium);
    }

    #[test]
    fn test_resolve_priority_prefers_explicit() {
        assert_eq!(
            resolve_priority(Some(Priority::Low), ActivityType::Medical),
            Priority::Low
        );
        assert_eq!(resolve_priority(None, ActivityType::Medical), Priority::Critical);
    }

    #[test]
    fn test_conditional_predicates_are_conjunctive() {
        let condition = RuleCondition::Conditional(vec![
            FieldPredicate::PriorityAtLeast(Priority::High),
            FieldPredicate::ConfidenceAtLeast(0.7),
        ]);
        assert!(condition.matches(&activity(Priority::High, 0.9)));
        assert!(!condition.matches(&activity(Priority::High, 0.5)));
        assert!(!condition.matches(&activity(Priority::Low, 0.9)));
    }

    #[test]
    fn test_location_predicate() {
        let condition =
            RuleCondition::Conditional(vec![FieldPredicate::LocationEquals("dock 4".to_string())]);
        assert!(condition.matches(&activity(Priority::Low, 0.0)));
    }

    #[test]
    fn test_resolved_backward_rules_require_approval() {
        for rule in ACTIVITY_TRANSITIONS.iter() {
            if rule.from == ActivityStatus::Resolved {
                assert!(rule.requires_approval, "{:?} -> {:?}", rule.from, rule.to);
                assert_eq!(rule.roles, ELEVATED_ROLES);
            }
        }
    }

    #[test]
    fn test_case_forward_chain_present_for_all_roles() {
        use CaseStatus::*;
        for (from, to) in [
            (Open, Investigating),
            (Investigating, EvidenceCollection),
            (EvidenceCollection, Analysis),
            (Analysis, Closed),
        ] {
            let rule = CASE_TRANSITIONS
                .iter()
                .find(|r| r.from == from && r.to == to)
                .unwrap();
            assert_eq!(rule.roles, ALL_ROLES);
        }
    }
}
