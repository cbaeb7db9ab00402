//! VIGIL Storage - Storage Trait and Mock Implementation
//!
//! Defines the persistence abstraction consumed by the engine. Production
//! bindings live outside this workspace; the in-memory mock here backs every
//! test and local run.

pub mod async_trait;

pub use crate::async_trait::{AsyncStorage, AsyncStorageTrait};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use vigil_core::{
    Activity, ActivityStatus, ActivityType, Case, CaseStatus, EntityKind, EvidenceItem, Incident,
    IncidentStatus, StorageError, VigilError, VigilResult,
};

// ============================================================================
// LIST OPTIONS
// ============================================================================

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    CreatedAsc,
    CreatedDesc,
}

/// Pagination and ordering applied to list queries.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort: SortOrder,
    pub offset: usize,
    /// No limit means "everything after the offset".
    pub limit: Option<usize>,
}

/// Filter for activity list queries. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub activity_type: Option<ActivityType>,
    pub status: Option<ActivityStatus>,
    pub archived: Option<bool>,
    /// Matches either a system or user tag.
    pub tag: Option<String>,
}

impl ActivityFilter {
    fn matches(&self, activity: &Activity) -> bool {
        if let Some(t) = self.activity_type {
            if activity.activity_type != t {
                return false;
            }
        }
        if let Some(s) = self.status {
            if activity.status != s {
                return false;
            }
        }
        if let Some(archived) = self.archived {
            if activity.archived != archived {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !activity.has_tag(tag) {
                return false;
            }
        }
        true
    }
}

/// Filter for case list queries.
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub lead_investigator_id: Option<Uuid>,
}

impl CaseFilter {
    fn matches(&self, case: &Case) -> bool {
        if let Some(s) = self.status {
            if case.status != s {
                return false;
            }
        }
        if let Some(lead) = self.lead_investigator_id {
            if case.lead_investigator_id != lead {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Partial update payload for activities.
#[derive(Debug, Clone, Default)]
pub struct ActivityUpdate {
    pub status: Option<ActivityStatus>,
    pub archived: Option<bool>,
    pub system_tags: Option<Vec<String>>,
    pub incident_ids: Option<Vec<Uuid>>,
}

/// Partial update payload for incidents.
#[derive(Debug, Clone, Default)]
pub struct IncidentUpdate {
    pub status: Option<IncidentStatus>,
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for VIGIL entities.
///
/// Updates are optimistic last-write-wins; there is no version check. The
/// engine serializes writes per entity through its owning service.
pub trait StorageTrait: Send + Sync {
    // === Activity Operations ===

    /// Insert a new activity.
    fn activity_insert(&self, activity: &Activity) -> VigilResult<()>;

    /// Get an activity by ID.
    fn activity_get(&self, id: Uuid) -> VigilResult<Option<Activity>>;

    /// Apply a partial update to an activity.
    fn activity_update(&self, id: Uuid, update: ActivityUpdate) -> VigilResult<()>;

    /// List activities matching a filter.
    fn activity_list(&self, filter: &ActivityFilter, options: &ListOptions)
        -> VigilResult<Vec<Activity>>;

    // === Incident Operations ===

    /// Insert a new incident.
    fn incident_insert(&self, incident: &Incident) -> VigilResult<()>;

    /// Get an incident by ID.
    fn incident_get(&self, id: Uuid) -> VigilResult<Option<Incident>>;

    /// Apply a partial update to an incident.
    fn incident_update(&self, id: Uuid, update: IncidentUpdate) -> VigilResult<()>;

    /// List incidents in a given status.
    fn incident_list_by_status(&self, status: IncidentStatus) -> VigilResult<Vec<Incident>>;

    // === Case Operations ===

    /// Insert a new case.
    fn case_insert(&self, case: &Case) -> VigilResult<()>;

    /// Get a case by ID.
    fn case_get(&self, id: Uuid) -> VigilResult<Option<Case>>;

    /// Replace a case record (last-write-wins).
    fn case_put(&self, case: &Case) -> VigilResult<()>;

    /// List cases matching a filter.
    fn case_list(&self, filter: &CaseFilter, options: &ListOptions) -> VigilResult<Vec<Case>>;

    /// Next value of the monotonically increasing case-number sequence.
    fn next_case_sequence(&self) -> VigilResult<u64>;

    // === Evidence Operations ===

    /// Insert a new evidence item.
    fn evidence_insert(&self, item: &EvidenceItem) -> VigilResult<()>;

    /// Get an evidence item by ID.
    fn evidence_get(&self, id: Uuid) -> VigilResult<Option<EvidenceItem>>;

    /// Replace an evidence record (last-write-wins).
    fn evidence_put(&self, item: &EvidenceItem) -> VigilResult<()>;

    /// List all evidence owned by a case.
    fn evidence_list_by_case(&self, case_id: Uuid) -> VigilResult<Vec<EvidenceItem>>;
}

// ============================================================================
// MOCK STORAGE
// ============================================================================

/// In-memory storage for tests and local runs.
#[derive(Debug, Default)]
pub struct MockStorage {
    activities: Arc<RwLock<HashMap<Uuid, Activity>>>,
    incidents: Arc<RwLock<HashMap<Uuid, Incident>>>,
    cases: Arc<RwLock<HashMap<Uuid, Case>>>,
    evidence: Arc<RwLock<HashMap<Uuid, EvidenceItem>>>,
    case_sequence: AtomicU64,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.activities.write().unwrap().clear();
        self.incidents.write().unwrap().clear();
        self.cases.write().unwrap().clear();
        self.evidence.write().unwrap().clear();
    }

    /// Get count of stored activities.
    pub fn activity_count(&self) -> usize {
        self.activities.read().unwrap().len()
    }

    /// Get count of stored incidents.
    pub fn incident_count(&self) -> usize {
        self.incidents.read().unwrap().len()
    }

    /// Get count of stored cases.
    pub fn case_count(&self) -> usize {
        self.cases.read().unwrap().len()
    }

    /// Get count of stored evidence items.
    pub fn evidence_count(&self) -> usize {
        self.evidence.read().unwrap().len()
    }
}

fn paginate<T, F>(mut items: Vec<T>, options: &ListOptions, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> vigil_core::Timestamp,
{
    match options.sort {
        SortOrder::CreatedAsc => items.sort_by_key(|i| created_at(i)),
        SortOrder::CreatedDesc => {
            items.sort_by_key(|i| created_at(i));
            items.reverse();
        }
    }
    items
        .into_iter()
        .skip(options.offset)
        .take(options.limit.unwrap_or(usize::MAX))
        .collect()
}

impl StorageTrait for MockStorage {
    // === Activity Operations ===

    fn activity_insert(&self, activity: &Activity) -> VigilResult<()> {
        let mut activities = self.activities.write().unwrap();
        if activities.contains_key(&activity.activity_id) {
            return Err(VigilError::Storage(StorageError::InsertFailed {
                entity_kind: EntityKind::Activity,
                reason: "already exists".to_string(),
            }));
        }
        activities.insert(activity.activity_id, activity.clone());
        Ok(())
    }

    fn activity_get(&self, id: Uuid) -> VigilResult<Option<Activity>> {
        Ok(self.activities.read().unwrap().get(&id).cloned())
    }

    fn activity_update(&self, id: Uuid, update: ActivityUpdate) -> VigilResult<()> {
        let mut activities = self.activities.write().unwrap();
        let activity = activities
            .get_mut(&id)
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Activity,
                id,
            }))?;

        if let Some(status) = update.status {
            activity.status = status;
        }
        if let Some(archived) = update.archived {
            activity.archived = archived;
        }
        if let Some(system_tags) = update.system_tags {
            activity.system_tags = system_tags;
        }
        if let Some(incident_ids) = update.incident_ids {
            activity.incident_ids = incident_ids;
        }
        activity.updated_at = chrono::Utc::now();
        Ok(())
    }

    fn activity_list(
        &self,
        filter: &ActivityFilter,
        options: &ListOptions,
    ) -> VigilResult<Vec<Activity>> {
        let activities = self.activities.read().unwrap();
        let matched: Vec<Activity> = activities
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        Ok(paginate(matched, options, |a| a.created_at))
    }

    // === Incident Operations ===

    fn incident_insert(&self, incident: &Incident) -> VigilResult<()> {
        let mut incidents = self.incidents.write().unwrap();
        if incidents.contains_key(&incident.incident_id) {
            return Err(VigilError::Storage(StorageError::InsertFailed {
                entity_kind: EntityKind::Incident,
                reason: "already exists".to_string(),
            }));
        }
        incidents.insert(incident.incident_id, incident.clone());
        Ok(())
    }

    fn incident_get(&self, id: Uuid) -> VigilResult<Option<Incident>> {
        Ok(self.incidents.read().unwrap().get(&id).cloned())
    }

    fn incident_update(&self, id: Uuid, update: IncidentUpdate) -> VigilResult<()> {
        let mut incidents = self.incidents.write().unwrap();
        let incident = incidents
            .get_mut(&id)
            .ok_or(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Incident,
                id,
            }))?;

        if let Some(status) = update.status {
            incident.status = status;
        }
        incident.updated_at = chrono::Utc::now();
        Ok(())
    }

    fn incident_list_by_status(&self, status: IncidentStatus) -> VigilResult<Vec<Incident>> {
        let incidents = self.incidents.read().unwrap();
        let mut matched: Vec<Incident> = incidents
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect();
        matched.sort_by_key(|i| i.created_at);
        Ok(matched)
    }

    // === Case Operations ===

    fn case_insert(&self, case: &Case) -> VigilResult<()> {
        let mut cases = self.cases.write().unwrap();
        if cases.contains_key(&case.case_id) {
            return Err(VigilError::Storage(StorageError::InsertFailed {
                entity_kind: EntityKind::Case,
                reason: "already exists".to_string(),
            }));
        }
        cases.insert(case.case_id, case.clone());
        Ok(())
    }

    fn case_get(&self, id: Uuid) -> VigilResult<Option<Case>> {
        Ok(self.cases.read().unwrap().get(&id).cloned())
    }

    fn case_put(&self, case: &Case) -> VigilResult<()> {
        let mut cases = self.cases.write().unwrap();
        if !cases.contains_key(&case.case_id) {
            return Err(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Case,
                id: case.case_id,
            }));
        }
        cases.insert(case.case_id, case.clone());
        Ok(())
    }

    fn case_list(&self, filter: &CaseFilter, options: &ListOptions) -> VigilResult<Vec<Case>> {
        let cases = self.cases.read().unwrap();
        let matched: Vec<Case> = cases.values().filter(|c| filter.matches(c)).cloned().collect();
        Ok(paginate(matched, options, |c| c.created_at))
    }

    fn next_case_sequence(&self) -> VigilResult<u64> {
        Ok(self.case_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    // === Evidence Operations ===

    fn evidence_insert(&self, item: &EvidenceItem) -> VigilResult<()> {
        let mut evidence = self.evidence.write().unwrap();
        if evidence.contains_key(&item.evidence_id) {
            return Err(VigilError::Storage(StorageError::InsertFailed {
                entity_kind: EntityKind::Evidence,
                reason: "already exists".to_string(),
            }));
        }
        evidence.insert(item.evidence_id, item.clone());
        Ok(())
    }

    fn evidence_get(&self, id: Uuid) -> VigilResult<Option<EvidenceItem>> {
        Ok(self.evidence.read().unwrap().get(&id).cloned())
    }

    fn evidence_put(&self, item: &EvidenceItem) -> VigilResult<()> {
        let mut evidence = self.evidence.write().unwrap();
        if !evidence.contains_key(&item.evidence_id) {
            return Err(VigilError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::Evidence,
                id: item.evidence_id,
            }));
        }
        evidence.insert(item.evidence_id, item.clone());
        Ok(())
    }

    fn evidence_list_by_case(&self, case_id: Uuid) -> VigilResult<Vec<EvidenceItem>> {
        let evidence = self.evidence.read().unwrap();
        let mut matched: Vec<EvidenceItem> = evidence
            .values()
            .filter(|e| e.case_id == case_id)
            .cloned()
            .collect();
        matched.sort_by_key(|e| e.created_at);
        Ok(matched)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vigil_core::{ActorClass, CaseType, Priority};

    fn sample_activity() -> Activity {
        let now = Utc::now();
        Activity {
            activity_id: Uuid::now_v7(),
            activity_type: ActivityType::Alert,
            title: "alert".to_string(),
            description: None,
            priority: Priority::Medium,
            status: ActivityStatus::Detecting,
            location: "gate".to_string(),
            site: None,
            source: ActorClass::Human,
            confidence: 0.0,
            system_tags: vec!["after-hours".to_string()],
            user_tags: Vec::new(),
            incident_ids: Vec::new(),
            retention_deadline: now,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_case(storage: &MockStorage) -> Case {
        let seq = storage.next_case_sequence().unwrap();
        Case::open(
            format!("CASE-2026-{:06}", seq),
            CaseType::General,
            Priority::Medium,
            Uuid::now_v7(),
            Vec::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_activity_insert_and_get() {
        let storage = MockStorage::new();
        let activity = sample_activity();
        storage.activity_insert(&activity).unwrap();
        let loaded = storage.activity_get(activity.activity_id).unwrap().unwrap();
        assert_eq!(loaded, activity);
    }

    #[test]
    fn test_activity_double_insert_fails() {
        let storage = MockStorage::new();
        let activity = sample_activity();
        storage.activity_insert(&activity).unwrap();
        assert!(storage.activity_insert(&activity).is_err());
    }

    #[test]
    fn test_activity_update_missing_is_not_found() {
        let storage = MockStorage::new();
        let result = storage.activity_update(Uuid::now_v7(), ActivityUpdate::default());
        assert!(matches!(
            result,
            Err(VigilError::Storage(StorageError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_activity_list_filters_by_tag() {
        let storage = MockStorage::new();
        storage.activity_insert(&sample_activity()).unwrap();
        let mut other = sample_activity();
        other.activity_id = Uuid::now_v7();
        other.system_tags = vec!["business-hours".to_string()];
        storage.activity_insert(&other).unwrap();

        let filter = ActivityFilter {
            tag: Some("after-hours".to_string()),
            ..Default::default()
        };
        let listed = storage.activity_list(&filter, &ListOptions::default()).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn test_list_pagination_and_sort() {
        let storage = MockStorage::new();
        for _ in 0..5 {
            let mut a = sample_activity();
            a.activity_id = Uuid::now_v7();
            storage.activity_insert(&a).unwrap();
        }
        let options = ListOptions {
            sort: SortOrder::CreatedDesc,
            offset: 1,
            limit: Some(2),
        };
        let listed = storage
            .activity_list(&ActivityFilter::default(), &options)
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
    }

    #[test]
    fn test_case_sequence_is_monotonic() {
        let storage = MockStorage::new();
        let a = storage.next_case_sequence().unwrap();
        let b = storage.next_case_sequence().unwrap();
        let c = storage.next_case_sequence().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_case_put_replaces_record() {
        let storage = MockStorage::new();
        let mut case = sample_case(&storage);
        storage.case_insert(&case).unwrap();
        case.conclusion = Some("substantiated theft".to_string());
        storage.case_put(&case).unwrap();
        let loaded = storage.case_get(case.case_id).unwrap().unwrap();
        assert_eq!(loaded.conclusion.as_deref(), Some("substantiated theft"));
    }

    #[test]
    fn test_case_put_unknown_is_not_found() {
        let storage = MockStorage::new();
        let case = sample_case(&storage);
        assert!(matches!(
            storage.case_put(&case),
            Err(VigilError::Storage(StorageError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_evidence_list_by_case_sorted() {
        use vigil_core::{Classification, CustodyAction, CustodyLogEntry, EvidenceType};
        let storage = MockStorage::new();
        let case_id = Uuid::now_v7();
        for _ in 0..3 {
            let entry = CustodyLogEntry {
                action: CustodyAction::Collected,
                occurred_at: Utc::now(),
                actor_id: Uuid::now_v7(),
                actor_name: "tech".to_string(),
                location: None,
                condition: None,
                integrity_verified: false,
                notes: None,
            };
            let item = EvidenceItem::collected(
                case_id,
                EvidenceType::Digital,
                Classification::Internal,
                None,
                entry,
            );
            storage.evidence_insert(&item).unwrap();
        }
        let listed = storage.evidence_list_by_case(case_id).unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }
}
