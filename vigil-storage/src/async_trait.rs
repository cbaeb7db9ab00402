//! Async storage trait for asynchronous persistence bindings.
//!
//! An async alternative to the synchronous `StorageTrait`, for production
//! bindings that suspend at I/O. `AsyncStorage` adapts any sync
//! implementation so tests and local runs share one code path.

use crate::{ActivityFilter, ActivityUpdate, CaseFilter, IncidentUpdate, ListOptions, StorageTrait};
use ::async_trait::async_trait;
use uuid::Uuid;
use vigil_core::{Activity, Case, EvidenceItem, Incident, IncidentStatus, VigilResult};

/// Async storage trait for persistence operations.
#[async_trait]
pub trait AsyncStorageTrait: Send + Sync {
    // === Activity Operations ===

    async fn activity_insert(&self, activity: &Activity) -> VigilResult<()>;
    async fn activity_get(&self, id: Uuid) -> VigilResult<Option<Activity>>;
    async fn activity_update(&self, id: Uuid, update: ActivityUpdate) -> VigilResult<()>;
    async fn activity_list(
        &self,
        filter: &ActivityFilter,
        options: &ListOptions,
    ) -> VigilResult<Vec<Activity>>;

    // === Incident Operations ===

    async fn incident_insert(&self, incident: &Incident) -> VigilResult<()>;
    async fn incident_get(&self, id: Uuid) -> VigilResult<Option<Incident>>;
    async fn incident_update(&self, id: Uuid, update: IncidentUpdate) -> VigilResult<()>;
    async fn incident_list_by_status(&self, status: IncidentStatus) -> VigilResult<Vec<Incident>>;

    // === Case Operations ===

    async fn case_insert(&self, case: &Case) -> VigilResult<()>;
    async fn case_get(&self, id: Uuid) -> VigilResult<Option<Case>>;
    async fn case_put(&self, case: &Case) -> VigilResult<()>;
    async fn case_list(&self, filter: &CaseFilter, options: &ListOptions) -> VigilResult<Vec<Case>>;
    async fn next_case_sequence(&self) -> VigilResult<u64>;

    // === Evidence Operations ===

    async fn evidence_insert(&self, item: &EvidenceItem) -> VigilResult<()>;
    async fn evidence_get(&self, id: Uuid) -> VigilResult<Option<EvidenceItem>>;
    async fn evidence_put(&self, item: &EvidenceItem) -> VigilResult<()>;
    async fn evidence_list_by_case(&self, case_id: Uuid) -> VigilResult<Vec<EvidenceItem>>;
}

/// Adapter exposing any sync `StorageTrait` through the async trait.
#[derive(Debug)]
pub struct AsyncStorage<S> {
    inner: S,
}

impl<S: StorageTrait> AsyncStorage<S> {
    /// Wrap a sync storage implementation.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Access the wrapped implementation.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: StorageTrait> AsyncStorageTrait for AsyncStorage<S> {
    async fn activity_insert(&self, activity: &Activity) -> VigilResult<()> {
        self.inner.activity_insert(activity)
    }

    async fn activity_get(&self, id: Uuid) -> VigilResult<Option<Activity>> {
        self.inner.activity_get(id)
    }

    async fn activity_update(&self, id: Uuid, update: ActivityUpdate) -> VigilResult<()> {
        self.inner.activity_update(id, update)
    }

    async fn activity_list(
        &self,
        filter: &ActivityFilter,
        options: &ListOptions,
    ) -> VigilResult<Vec<Activity>> {
        self.inner.activity_list(filter, options)
    }

    async fn incident_insert(&self, incident: &Incident) -> VigilResult<()> {
        self.inner.incident_insert(incident)
    }

    async fn incident_get(&self, id: Uuid) -> VigilResult<Option<Incident>> {
        self.inner.incident_get(id)
    }

    async fn incident_update(&self, id: Uuid, update: IncidentUpdate) -> VigilResult<()> {
        self.inner.incident_update(id, update)
    }

    async fn incident_list_by_status(&self, status: IncidentStatus) -> VigilResult<Vec<Incident>> {
        self.inner.incident_list_by_status(status)
    }

    async fn case_insert(&self, case: &Case) -> VigilResult<()> {
        self.inner.case_insert(case)
    }

    async fn case_get(&self, id: Uuid) -> VigilResult<Option<Case>> {
        self.inner.case_get(id)
    }

    async fn case_put(&self, case: &Case) -> VigilResult<()> {
        self.inner.case_put(case)
    }

    async fn case_list(&self, filter: &CaseFilter, options: &ListOptions) -> VigilResult<Vec<Case>> {
        self.inner.case_list(filter, options)
    }

    async fn next_case_sequence(&self) -> VigilResult<u64> {
        self.inner.next_case_sequence()
    }

    async fn evidence_insert(&self, item: &EvidenceItem) -> VigilResult<()> {
        self.inner.evidence_insert(item)
    }

    async fn evidence_get(&self, id: Uuid) -> VigilResult<Option<EvidenceItem>> {
        self.inner.evidence_get(id)
    }

    async fn evidence_put(&self, item: &EvidenceItem) -> VigilResult<()> {
        self.inner.evidence_put(item)
    }

    async fn evidence_list_by_case(&self, case_id: Uuid) -> VigilResult<Vec<EvidenceItem>> {
        self.inner.evidence_list_by_case(case_id)
    }
}
