//! Retention deadline derivation.
//!
//! Activities are retained 30 days (configurable) and then become eligible
//! for archival; they are never hard-deleted. Case retention depends on the
//! case type and spans years.

use chrono::Duration;
use vigil_core::{CaseType, Timestamp, VigilConfig};

/// Deadline after which an activity may be archived.
pub fn activity_retention_deadline(created_at: Timestamp, config: &VigilConfig) -> Timestamp {
    created_at + Duration::days(config.activity_retention_days)
}

/// Retention period in years for a case type.
pub fn case_retention_years(case_type: CaseType) -> i64 {
    match case_type {
        CaseType::SecurityInvestigation => 7,
        CaseType::FraudInvestigation => 10,
        CaseType::SafetyIncident => 5,
        CaseType::PolicyViolation => 3,
        CaseType::General => 3,
    }
}

/// Deadline after which a closed case may be archived.
pub fn case_retention_deadline(case_type: CaseType, created_at: Timestamp) -> Timestamp {
    created_at + Duration::days(365 * case_retention_years(case_type))
}
