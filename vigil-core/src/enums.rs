//! Enum types for VIGIL entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ACTIVITY ENUMS
// ============================================================================

/// Type of a field-reported activity. Closed enumeration: the escalation
/// and priority tables are exhaustive over these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Medical,
    SecurityBreach,
    BolEvent,
    Alert,
    PropertyDamage,
    Tailgating,
    SuspiciousBehavior,
    UnauthorizedAccess,
    Patrol,
    Evidence,
}

impl ActivityType {
    /// All variants, in table order.
    pub const ALL: [ActivityType; 10] = [
        ActivityType::Medical,
        ActivityType::SecurityBreach,
        ActivityType::BolEvent,
        ActivityType::Alert,
        ActivityType::PropertyDamage,
        ActivityType::Tailgating,
        ActivityType::SuspiciousBehavior,
        ActivityType::UnauthorizedAccess,
        ActivityType::Patrol,
        ActivityType::Evidence,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ActivityType::Medical => "medical",
            ActivityType::SecurityBreach => "security-breach",
            ActivityType::BolEvent => "bol-event",
            ActivityType::Alert => "alert",
            ActivityType::PropertyDamage => "property-damage",
            ActivityType::Tailgating => "tailgating",
            ActivityType::SuspiciousBehavior => "suspicious-behavior",
            ActivityType::UnauthorizedAccess => "unauthorized-access",
            ActivityType::Patrol => "patrol",
            ActivityType::Evidence => "evidence",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ActivityTypeParseError> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "medical" => Ok(ActivityType::Medical),
            "security-breach" => Ok(ActivityType::SecurityBreach),
            "bol-event" => Ok(ActivityType::BolEvent),
            "alert" => Ok(ActivityType::Alert),
            "property-damage" => Ok(ActivityType::PropertyDamage),
            "tailgating" => Ok(ActivityType::Tailgating),
            "suspicious-behavior" => Ok(ActivityType::SuspiciousBehavior),
            "unauthorized-access" => Ok(ActivityType::UnauthorizedAccess),
            "patrol" => Ok(ActivityType::Patrol),
            "evidence" => Ok(ActivityType::Evidence),
            _ => Err(ActivityTypeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for ActivityType {
    type Err = ActivityTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid activity type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityTypeParseError(pub String);

impl fmt::Display for ActivityTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid activity type: {}", self.0)
    }
}

impl std::error::Error for ActivityTypeParseError {}

/// Priority level shared by activities, incidents, and cases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, PriorityParseError> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(PriorityParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid priority string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityParseError(pub String);

impl fmt::Display for PriorityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid priority: {}", self.0)
    }
}

impl std::error::Error for PriorityParseError {}

/// Lifecycle status of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActivityStatus {
    /// Initial state for every new activity
    #[default]
    Detecting,
    /// A responder has been assigned
    Assigned,
    /// Response in progress
    Responding,
    /// Activity resolved
    Resolved,
}

impl ActivityStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ActivityStatus::Detecting => "detecting",
            ActivityStatus::Assigned => "assigned",
            ActivityStatus::Responding => "responding",
            ActivityStatus::Resolved => "resolved",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ActivityStatusParseError> {
        match s.to_lowercase().as_str() {
            "detecting" => Ok(ActivityStatus::Detecting),
            "assigned" => Ok(ActivityStatus::Assigned),
            "responding" => Ok(ActivityStatus::Responding),
            "resolved" => Ok(ActivityStatus::Resolved),
            _ => Err(ActivityStatusParseError(s.to_string())),
        }
    }

    /// Ordinal position in the forward lifecycle chain.
    pub const fn ordinal(&self) -> u8 {
        match self {
            ActivityStatus::Detecting => 0,
            ActivityStatus::Assigned => 1,
            ActivityStatus::Responding => 2,
            ActivityStatus::Resolved => 3,
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = ActivityStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid activity status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStatusParseError(pub String);

impl fmt::Display for ActivityStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid activity status: {}", self.0)
    }
}

impl std::error::Error for ActivityStatusParseError {}

/// Who (or what) created an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorClass {
    /// A person filed the report
    Human,
    /// A partner system pushed it over an integration
    Integration,
    /// An ambient sensor/camera adapter detected it
    Ambient,
}

impl ActorClass {
    /// The tag value emitted by the auto-tagging rules.
    pub fn tag_value(&self) -> &'static str {
        match self {
            ActorClass::Human => "human",
            ActorClass::Integration => "integration",
            ActorClass::Ambient => "ambient",
        }
    }
}

// ============================================================================
// INCIDENT ENUMS
// ============================================================================

/// Domain of an escalated incident, mapped from the triggering activity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentType {
    MedicalEmergency,
    SecurityBreach,
    BolEvent,
    Alert,
    PropertyDamage,
    Tailgating,
    SuspiciousBehavior,
    UnauthorizedAccess,
    Other,
}

impl From<ActivityType> for IncidentType {
    fn from(t: ActivityType) -> Self {
        match t {
            ActivityType::Medical => IncidentType::MedicalEmergency,
            ActivityType::SecurityBreach => IncidentType::SecurityBreach,
            ActivityType::BolEvent => IncidentType::BolEvent,
            ActivityType::Alert => IncidentType::Alert,
            ActivityType::PropertyDamage => IncidentType::PropertyDamage,
            ActivityType::Tailgating => IncidentType::Tailgating,
            ActivityType::SuspiciousBehavior => IncidentType::SuspiciousBehavior,
            ActivityType::UnauthorizedAccess => IncidentType::UnauthorizedAccess,
            // Patrol and evidence activities never escalate; the mapping
            // exists only so the conversion stays total.
            ActivityType::Patrol | ActivityType::Evidence => IncidentType::Other,
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IncidentType::MedicalEmergency => "medical-emergency",
            IncidentType::SecurityBreach => "security-breach",
            IncidentType::BolEvent => "bol-event",
            IncidentType::Alert => "alert",
            IncidentType::PropertyDamage => "property-damage",
            IncidentType::Tailgating => "tailgating",
            IncidentType::SuspiciousBehavior => "suspicious-behavior",
            IncidentType::UnauthorizedAccess => "unauthorized-access",
            IncidentType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle status of an incident.
///
/// Auto-created incidents always start `Pending`: human-in-the-loop
/// confirmation is required before an incident becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IncidentStatus {
    #[default]
    Pending,
    Active,
    Resolved,
    Dismissed,
}

impl IncidentStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Active => "active",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Dismissed => "dismissed",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, IncidentStatusParseError> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(IncidentStatus::Pending),
            "active" => Ok(IncidentStatus::Active),
            "resolved" => Ok(IncidentStatus::Resolved),
            "dismissed" => Ok(IncidentStatus::Dismissed),
            _ => Err(IncidentStatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = IncidentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid incident status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentStatusParseError(pub String);

impl fmt::Display for IncidentStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid incident status: {}", self.0)
    }
}

impl std::error::Error for IncidentStatusParseError {}

// ============================================================================
// CASE ENUMS
// ============================================================================

/// Category of a formal investigation. Drives the retention schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseType {
    SecurityInvestigation,
    FraudInvestigation,
    SafetyIncident,
    PolicyViolation,
    General,
}

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CaseStatus {
    #[default]
    Open,
    Investigating,
    EvidenceCollection,
    Analysis,
    Closed,
}

impl CaseStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::Investigating => "investigating",
            CaseStatus::EvidenceCollection => "evidence_collection",
            CaseStatus::Analysis => "analysis",
            CaseStatus::Closed => "closed",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, CaseStatusParseError> {
        match s.to_lowercase().as_str() {
            "open" => Ok(CaseStatus::Open),
            "investigating" => Ok(CaseStatus::Investigating),
            "evidence_collection" | "evidence-collection" => Ok(CaseStatus::EvidenceCollection),
            "analysis" => Ok(CaseStatus::Analysis),
            "closed" => Ok(CaseStatus::Closed),
            _ => Err(CaseStatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for CaseStatus {
    type Err = CaseStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid case status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseStatusParseError(pub String);

impl fmt::Display for CaseStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid case status: {}", self.0)
    }
}

impl std::error::Error for CaseStatusParseError {}

/// Documented outcome of a closed case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseOutcome {
    Substantiated,
    Unsubstantiated,
    Inconclusive,
    Referred,
}

// ============================================================================
// ACTOR ROLES
// ============================================================================

/// Role of the acting user. Transition rules enumerate allowed roles
/// explicitly; no hierarchy is inferred from this enum's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    Officer,
    Supervisor,
    Admin,
}

impl ActorRole {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ActorRole::Officer => "officer",
            ActorRole::Supervisor => "supervisor",
            ActorRole::Admin => "admin",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ActorRoleParseError> {
        match s.to_lowercase().as_str() {
            "officer" => Ok(ActorRole::Officer),
            "supervisor" => Ok(ActorRole::Supervisor),
            "admin" => Ok(ActorRole::Admin),
            _ => Err(ActorRoleParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for ActorRole {
    type Err = ActorRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid actor role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRoleParseError(pub String);

impl fmt::Display for ActorRoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid actor role: {}", self.0)
    }
}

impl std::error::Error for ActorRoleParseError {}

// ============================================================================
// EVIDENCE ENUMS
// ============================================================================

/// Kind of evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceType {
    Photo,
    Video,
    Document,
    Physical,
    Digital,
    WitnessStatement,
    ExpertAnalysis,
}

/// Sensitivity classification of an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Classification {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
}

/// Processing status of an evidence item. Gates case closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProcessingStatus {
    #[default]
    Pending,
    InProgress,
    Processed,
    Rejected,
    RequiresAnalysis,
    Archived,
}

impl ProcessingStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::InProgress => "in_progress",
            ProcessingStatus::Processed => "processed",
            ProcessingStatus::Rejected => "rejected",
            ProcessingStatus::RequiresAnalysis => "requires_analysis",
            ProcessingStatus::Archived => "archived",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ProcessingStatusParseError> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(ProcessingStatus::Pending),
            "in_progress" => Ok(ProcessingStatus::InProgress),
            "processed" => Ok(ProcessingStatus::Processed),
            "rejected" => Ok(ProcessingStatus::Rejected),
            "requires_analysis" => Ok(ProcessingStatus::RequiresAnalysis),
            "archived" => Ok(ProcessingStatus::Archived),
            _ => Err(ProcessingStatusParseError(s.to_string())),
        }
    }

    /// Whether this status releases the owning case for closure.
    pub fn releases_for_closure(&self) -> bool {
        matches!(self, ProcessingStatus::Processed | ProcessingStatus::Archived)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for ProcessingStatus {
    type Err = ProcessingStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid processing status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStatusParseError(pub String);

impl fmt::Display for ProcessingStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid processing status: {}", self.0)
    }
}

impl std::error::Error for ProcessingStatusParseError {}

/// Custody event kind. Every mutation of an evidence item appends one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustodyAction {
    Collected,
    Transferred,
    Processed,
    Verified,
    Archived,
}

impl fmt::Display for CustodyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CustodyAction::Collected => "collected",
            CustodyAction::Transferred => "transferred",
            CustodyAction::Processed => "processed",
            CustodyAction::Verified => "verified",
            CustodyAction::Archived => "archived",
        };
        write!(f, "{}", s)
    }
}

/// Physical condition of evidence recorded at each custody event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceCondition {
    Good,
    Damaged,
    Compromised,
}

// ============================================================================
// DECISION ENUMS
// ============================================================================

/// Action a handler decided on for an activity or incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionAction {
    CreateIncident,
    Escalate,
    Monitor,
    Resolve,
    CreateWorkOrder,
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionAction::CreateIncident => "create-incident",
            DecisionAction::Escalate => "escalate",
            DecisionAction::Monitor => "monitor",
            DecisionAction::Resolve => "resolve",
            DecisionAction::CreateWorkOrder => "create-work-order",
        };
        write!(f, "{}", s)
    }
}

/// Classified outcome of a handler decision, derived from confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionOutcome {
    Success,
    Failure,
}

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Entity type discriminator for polymorphic references and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Activity,
    Incident,
    Case,
    Evidence,
    Handler,
}

// ============================================================================
// TESTS
// ============================================================================
