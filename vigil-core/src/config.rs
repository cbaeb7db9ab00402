//! Engine configuration.

use crate::error::{ConfigError, VigilError, VigilResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Master configuration for the escalation engine.
/// ALL values are required - no defaults anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VigilConfig {
    /// First hour (0-23) of the business-hours tag bucket, inclusive.
    pub business_hours_start: u32,
    /// Last hour (0-23) of the business-hours tag bucket, inclusive.
    pub business_hours_end: u32,

    /// Days until an activity becomes eligible for archival.
    pub activity_retention_days: i64,

    /// Confidence above which a decision outcome is classified a success.
    pub success_confidence_threshold: f64,

    /// A handler decision slower than this is classified as a failure
    /// outcome and logged. Handlers are pure computation and are not
    /// preempted mid-decision.
    pub decision_timeout: Duration,
}

impl VigilConfig {
    /// The shipped policy values: business hours 09:00-17:00 inclusive,
    /// 30-day activity retention, 0.8 success threshold, 30s decision bound.
    pub fn standard() -> Self {
        Self {
            business_hours_start: 9,
            business_hours_end: 17,
            activity_retention_days: 30,
            success_confidence_threshold: 0.8,
            decision_timeout: Duration::from_secs(30),
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(VigilError::Config) if invalid.
    pub fn validate(&self) -> VigilResult<()> {
        if self.business_hours_start > 23 {
            return Err(VigilError::Config(ConfigError::InvalidValue {
                field: "business_hours_start".to_string(),
                value: self.business_hours_start.to_string(),
                reason: "must be an hour in 0..=23".to_string(),
            }));
        }

        if self.business_hours_end > 23 {
            return Err(VigilError::Config(ConfigError::InvalidValue {
                field: "business_hours_end".to_string(),
                value: self.business_hours_end.to_string(),
                reason: "must be an hour in 0..=23".to_string(),
            }));
        }

        if self.business_hours_start > self.business_hours_end {
            return Err(VigilError::Config(ConfigError::InvalidValue {
                field: "business_hours_start".to_string(),
                value: self.business_hours_start.to_string(),
                reason: "must not be after business_hours_end".to_string(),
            }));
        }

        if self.activity_retention_days <= 0 {
            return Err(VigilError::Config(ConfigError::InvalidValue {
                field: "activity_retention_days".to_string(),
                value: self.activity_retention_days.to_string(),
                reason: "must be positive".to_string(),
            }));
        }

        if !(0.0..=1.0).contains(&self.success_confidence_threshold) {
            return Err(VigilError::Config(ConfigError::InvalidValue {
                field: "success_confidence_threshold".to_string(),
                value: self.success_confidence_threshold.to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            }));
        }

        if self.decision_timeout.is_zero() {
            return Err(VigilError::Config(ConfigError::InvalidValue {
                field: "decision_timeout".to_string(),
                value: format!("{:?}", self.decision_timeout),
                reason: "must be positive".to_string(),
            }));
        }

        Ok(())
    }
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
