//! Deterministic system tag derivation.
//!
//! Tags come from four sources: creation actor class, site metadata,
//! time-of-day bucket, and a confidence tag emitted only when the activity
//! carries a confidence above zero. Application is idempotent.

use vigil_core::{Activity, Timestamp, VigilConfig};
use chrono::Timelike;

/// Tag stamped on activities whose incident was created by the escalation
/// evaluator rather than a human.
pub const AUTO_GENERATED_TAG: &str = "auto-generated";

/// Derive the system tags for an activity at a given instant.
pub fn system_tags_for(activity: &Activity, now: Timestamp, config: &VigilConfig) -> Vec<String> {
    let mut tags = Vec::with_capacity(4);

    tags.push(format!("source:{}", activity.source.tag_value()));

    if let Some(site) = &activity.site {
        if !site.is_empty() {
            tags.push(format!("site:{}", site));
        }
    }

    let hour = now.hour();
    if hour >= config.business_hours_start && hour <= config.business_hours_end {
        tags.push("business-hours".to_string());
    } else {
        tags.push("after-hours".to_string());
    }

    if activity.confidence > 0.0 {
        tags.push(format!("confidence:{}", confidence_bucket(activity.confidence)));
    }

    tags
}

/// Apply the derived system tags to an activity. Re-application never
/// produces duplicates.
pub fn apply_system_tags(activity: &mut Activity, now: Timestamp, config: &VigilConfig) {
    for tag in system_tags_for(activity, now, config) {
        activity.add_system_tag(tag);
    }
}

fn confidence_bucket(confidence: f64) -> &'static str {
    if confidence >= 0.8 {
        "high"
    } else if confidence >= 0.5 {
        "medium"
    } else {
        "low"
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
