//! VIGIL Rules - rule tables and the pure decision functions over them.
//!
//! Everything in this crate is non-blocking computation: table lookups,
//! predicate evaluation, and deterministic derivations. Side effects (audit,
//! events, persistence) belong to the service layer.

pub mod escalation;
pub mod retention;
pub mod state_machine;
pub mod tables;
pub mod tags;
pub mod validator;

pub use escalation::evaluate;
pub use retention::{activity_retention_deadline, case_retention_deadline, case_retention_years};
pub use state_machine::{can_transition_activity, can_transition_case, TransitionDecision};
pub use tables::{
    default_priority_for, resolve_priority, EscalationRule, FieldPredicate, RuleCondition,
    TransitionRule, ACTIVITY_TRANSITIONS, CASE_TRANSITIONS, ESCALATION_RULES,
};
pub use tags::{apply_system_tags, system_tags_for, AUTO_GENERATED_TAG};
pub use validator::{
    validate_new_activity, validate_new_case, validate_new_evidence, MAX_DESCRIPTION_LEN,
    MAX_NOTES_LEN, MAX_TITLE_LEN,
};
