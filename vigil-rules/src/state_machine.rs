//! Role-gated status state machine shared by activities and cases.
//!
//! A pure table lookup: absence of a matching rule is denial, never a
//! default-allow. Callers treat denial as a policy violation, not a
//! retryable condition.

use crate::tables::{TransitionRule, ACTIVITY_TRANSITIONS, CASE_TRANSITIONS};
use vigil_core::{ActivityStatus, ActorRole, CaseStatus};

/// Answer to a transition query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDecision {
    pub allowed: bool,
    /// The transition may proceed but is not final until approval is
    /// separately recorded.
    pub requires_approval: bool,
}

impl TransitionDecision {
    pub const DENIED: Self = Self {
        allowed: false,
        requires_approval: false,
    };
}

fn lookup<S: PartialEq + Copy>(
    rules: &[TransitionRule<S>],
    from: S,
    to: S,
    role: ActorRole,
) -> TransitionDecision {
    rules
        .iter()
        .find(|r| r.from == from && r.to == to && r.roles.contains(&role))
        .map(|r| TransitionDecision {
            allowed: true,
            requires_approval: r.requires_approval,
        })
        .unwrap_or(TransitionDecision::DENIED)
}

/// Check whether `role` may move an activity from `from` to `to`.
pub fn can_transition_activity(
    from: ActivityStatus,
    to: ActivityStatus,
    role: ActorRole,
) -> TransitionDecision {
    lookup(&ACTIVITY_TRANSITIONS, from, to, role)
}

/// Check whether `role` may move a case from `from` to `to`.
pub fn can_transition_case(from: CaseStatus, to: CaseStatus, role: ActorRole) -> TransitionDecision {
    lookup(&CASE_TRANSITIONS, from, to, role)
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
