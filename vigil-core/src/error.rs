//! Error types for VIGIL operations

use crate::enums::{ActorRole, EntityKind};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors. Always caller-correctable and surfaced field-by-field.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Length bound exceeded for {field}: max {max}, got {got}")]
    LengthExceeded { field: String, max: usize, got: usize },
}

/// Authorization/policy errors. Never retried automatically; surfaced to the
/// actor as a rejected action.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PolicyError {
    #[error("Transition {from} -> {to} denied for role {role} on {entity_kind:?}")]
    TransitionDenied {
        entity_kind: EntityKind,
        from: String,
        to: String,
        role: ActorRole,
    },

    #[error("Case closure blocked: {}", reasons.join("; "))]
    ClosureBlocked { reasons: Vec<String> },

    #[error("Incident {incident_id} is {status}, expected pending")]
    IncidentNotPending { incident_id: Uuid, status: String },

    #[error("Incident {incident_id} is not dismissible")]
    NotDismissible { incident_id: Uuid },

    #[error("Role {role} may not approve transitions on case {case_id}")]
    ApprovalDenied { case_id: Uuid, role: ActorRole },

    #[error("Case {case_id} has no transition awaiting approval")]
    NothingToApprove { case_id: Uuid },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_kind:?} with id {id}")]
    NotFound { entity_kind: EntityKind, id: Uuid },

    #[error("Insert failed for {entity_kind:?}: {reason}")]
    InsertFailed { entity_kind: EntityKind, reason: String },

    #[error("Update failed for {entity_kind:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_kind: EntityKind,
        id: Uuid,
        reason: String,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Handler routing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("No registered handler can process incident {incident_id}")]
    NoHandler { incident_id: Uuid },

    #[error("Capability already registered: {capability}")]
    DuplicateCapability { capability: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all VIGIL errors.
#[derive(Debug, Clone, Error)]
pub enum VigilError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A batch of field-level validation failures, reported together.
    #[error("Validation failed with {} error(s)", .0.len())]
    ValidationBatch(Vec<ValidationError>),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for VIGIL operations.
pub type VigilResult<T> = Result<T, VigilError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            entity_kind: EntityKind::Case,
            id: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Case"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_policy_error_display_transition_denied() {
        let err = PolicyError::TransitionDenied {
            entity_kind: EntityKind::Activity,
            from: "resolved".to_string(),
            to: "detecting".to_string(),
            role: ActorRole::Officer,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("resolved -> detecting"));
        assert!(msg.contains("officer"));
    }

    #[test]
    fn test_policy_error_display_closure_blocked() {
        let err = PolicyError::ClosureBlocked {
            reasons: vec![
                "conclusion is empty".to_string(),
                "1 evidence item(s) not processed".to_string(),
            ],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("conclusion is empty; 1 evidence item(s) not processed"));
    }

    #[test]
    fn test_routing_error_display() {
        let err = RoutingError::DuplicateCapability {
            capability: "medical-emergency".to_string(),
        };
        assert!(format!("{}", err).contains("medical-emergency"));
    }

    #[test]
    fn test_vigil_error_from_variants() {
        let validation = VigilError::from(ValidationError::RequiredFieldMissing {
            field: "title".to_string(),
        });
        assert!(matches!(validation, VigilError::Validation(_)));

        let policy = VigilError::from(PolicyError::ClosureBlocked { reasons: vec![] });
        assert!(matches!(policy, VigilError::Policy(_)));

        let storage = VigilError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, VigilError::Storage(_)));

        let routing = VigilError::from(RoutingError::NoHandler {
            incident_id: Uuid::nil(),
        });
        assert!(matches!(routing, VigilError::Routing(_)));

        let config = VigilError::from(ConfigError::MissingRequired {
            field: "business_hours_start".to_string(),
        });
        assert!(matches!(config, VigilError::Config(_)));
    }
}
