//! VIGIL Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub mod audit;
pub mod config;
pub mod entities;
pub mod enums;
pub mod error;

pub use audit::AuditContext;
pub use config::VigilConfig;
pub use entities::{
    Activity, Case, CaseStatusChange, CustodyLogEntry, Decision, EvidenceItem, FileRef, Incident,
    NewActivity, NewCase, NewEvidence, ProcessingResult,
};
pub use enums::{
    ActivityStatus, ActivityStatusParseError, ActivityType, ActivityTypeParseError, ActorClass,
    ActorRole, ActorRoleParseError, CaseOutcome, CaseStatus, CaseStatusParseError, CaseType,
    Classification, CustodyAction, DecisionAction, DecisionOutcome, EntityKind, EvidenceCondition,
    EvidenceType, IncidentStatus, IncidentStatusParseError, IncidentType, Priority,
    PriorityParseError, ProcessingStatus, ProcessingStatusParseError,
};
pub use error::{
    ConfigError, PolicyError, RoutingError, StorageError, ValidationError, VigilError, VigilResult,
};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 hash of an evidence file's bytes.
/// The bytes themselves are owned by the external storage collaborator;
/// this engine only ever sees the reference.
pub type FileHash = [u8; 32];

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Compute SHA-256 hash of file content.
pub fn compute_file_hash(content: &[u8]) -> FileHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Render a file hash as lowercase hex for storage and display.
pub fn hash_to_hex(hash: &FileHash) -> String {
    hex::encode(hash)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_id_is_v7() {
        let id = new_entity_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_entity_ids_are_sortable() {
        let id1 = new_entity_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = new_entity_id();
        assert!(id1.to_string() < id2.to_string());
    }

    #[test]
    fn test_file_hash_is_deterministic() {
        let content = b"body-cam footage";
        let hash = compute_file_hash(content);
        assert_eq!(hash.len(), 32);
        assert_eq!(hash, compute_file_hash(content));
    }

    #[test]
    fn test_hash_to_hex_round_trip() {
        let hash = compute_file_hash(b"x");
        let hex_str = hash_to_hex(&hash);
        assert_eq!(hex_str.len(), 64);
        assert_eq!(hex::decode(&hex_str).unwrap(), hash.to_vec());
    }
}
