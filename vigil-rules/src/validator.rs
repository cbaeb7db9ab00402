//! Field-level validation of incoming drafts.
//!
//! Errors are collected per field and returned together, never
//! short-circuited at the first failure.

use vigil_core::{NewActivity, NewCase, NewEvidence, ValidationError};

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 5000;
/// Maximum notes length, in characters.
pub const MAX_NOTES_LEN: usize = 2000;

fn check_required(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
}

fn check_length(errors: &mut Vec<ValidationError>, field: &str, value: &str, max: usize) {
    let got = value.chars().count();
    if got > max {
        errors.push(ValidationError::LengthExceeded {
            field: field.to_string(),
            max,
            got,
        });
    }
}

/// Validate an activity draft.
pub fn validate_new_activity(draft: &NewActivity) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_required(&mut errors, "title", &draft.title);
    check_length(&mut errors, "title", &draft.title, MAX_TITLE_LEN);
    check_required(&mut errors, "location", &draft.location);

    if let Some(description) = &draft.description {
        check_length(&mut errors, "description", description, MAX_DESCRIPTION_LEN);
    }

    if !(0.0..=1.0).contains(&draft.confidence) {
        errors.push(ValidationError::InvalidValue {
            field: "confidence".to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        });
    }

    for tag in &draft.user_tags {
        if tag.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                field: "user_tags".to_string(),
                reason: "tags must be non-empty".to_string(),
            });
            break;
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a case draft.
pub fn validate_new_case(draft: &NewCase) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if draft.lead_investigator_id.is_nil() {
        errors.push(ValidationError::RequiredFieldMissing {
            field: "lead_investigator_id".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an evidence draft.
pub fn validate_new_evidence(draft: &NewEvidence) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(notes) = &draft.notes {
        check_length(&mut errors, "notes", notes, MAX_NOTES_LEN);
    }

    if let Some(file_ref) = &draft.file_ref {
        check_required(&mut errors, "file_ref.path", &file_ref.path);
        let hash = &file_ref.sha256;
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            errors.push(ValidationError::InvalidValue {
                field: "file_ref.sha256".to_string(),
                reason: "must be 64 hex characters".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// TESTS
// ============================================================================
