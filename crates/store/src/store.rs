use async_trait::async_trait;
use revlens_core::types::{
    AssessmentRecord, BehaviorEvent, BehaviorSession, MilestoneRecord, TimeRange, VisitRecord,
};

use crate::error::{StoreError, StoreResult};
use crate::filter::{AssessmentFilter, EventFilter, VisitFilter};

/// Time-bounded record reads against the five stores. Every method returns
/// records whose `created_at` falls inside the inclusive range.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn visits(&self, range: TimeRange, filter: &VisitFilter)
        -> StoreResult<Vec<VisitRecord>>;

    async fn assessments(
        &self,
        range: TimeRange,
        filter: &AssessmentFilter,
    ) -> StoreResult<Vec<AssessmentRecord>>;

    async fn behavior_events(
        &self,
        range: TimeRange,
        filter: &EventFilter,
    ) -> StoreResult<Vec<BehaviorEvent>>;

    async fn behavior_sessions(&self, range: TimeRange) -> StoreResult<Vec<BehaviorSession>>;

    async fn milestones(&self, range: TimeRange) -> StoreResult<Vec<MilestoneRecord>>;
}

/// Test double whose every read fails, for exercising degraded envelopes.
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn visits(
        &self,
        _range: TimeRange,
        _filter: &VisitFilter,
    ) -> StoreResult<Vec<VisitRecord>> {
        Err(StoreError::Unavailable("visits store offline".into()))
    }

    async fn assessments(
        &self,
        _range: TimeRange,
        _filter: &AssessmentFilter,
    ) -> StoreResult<Vec<AssessmentRecord>> {
        Err(StoreError::Unavailable("assessments store offline".into()))
    }

    async fn behavior_events(
        &self,
        _range: TimeRange,
        _filter: &EventFilter,
    ) -> StoreResult<Vec<BehaviorEvent>> {
        Err(StoreError::Unavailable("events store offline".into()))
    }

    async fn behavior_sessions(&self, _range: TimeRange) -> StoreResult<Vec<BehaviorSession>> {
        Err(StoreError::Unavailable("sessions store offline".into()))
    }

    async fn milestones(&self, _range: TimeRange) -> StoreResult<Vec<MilestoneRecord>> {
        Err(StoreError::Unavailable("milestones store offline".into()))
    }
}
