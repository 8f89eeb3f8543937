//! In-memory reference implementation of the query contract. Backs the
//! test suites and the demo server; production deployments plug a real
//! store client in behind the same trait.
//!
//! This is also the single validation boundary: measurement fields are
//! normalized on insert (negative or non-finite readings dropped to null,
//! scroll depth clamped to [0, 100]) so aggregators never re-check them.

use async_trait::async_trait;
use parking_lot::RwLock;
use revlens_core::types::{
    AssessmentRecord, BehaviorEvent, BehaviorSession, MilestoneRecord, TimeRange, VisitRecord,
};

use crate::error::StoreResult;
use crate::filter::{AssessmentFilter, EventFilter, VisitFilter};
use crate::store::RecordStore;

#[derive(Default)]
pub struct InMemoryStore {
    visits: RwLock<Vec<VisitRecord>>,
    assessments: RwLock<Vec<AssessmentRecord>>,
    events: RwLock<Vec<BehaviorEvent>>,
    sessions: RwLock<Vec<BehaviorSession>>,
    milestones: RwLock<Vec<MilestoneRecord>>,
}

fn sanitize_measurement(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

fn clamp_percentage(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_visit(&self, mut record: VisitRecord) {
        record.time_on_page_secs = sanitize_measurement(record.time_on_page_secs);
        record.scroll_depth_pct = clamp_percentage(record.scroll_depth_pct);
        self.visits.write().push(record);
    }

    pub fn add_assessment(&self, mut record: AssessmentRecord) {
        record.overall_score = clamp_percentage(record.overall_score);
        record.buyer_score = clamp_percentage(record.buyer_score);
        self.assessments.write().push(record);
    }

    pub fn add_event(&self, record: BehaviorEvent) {
        self.events.write().push(record);
    }

    pub fn add_session(&self, mut record: BehaviorSession) {
        record.duration_secs = sanitize_measurement(record.duration_secs);
        self.sessions.write().push(record);
    }

    pub fn add_milestone(&self, record: MilestoneRecord) {
        self.milestones.write().push(record);
    }

    pub fn visit_count(&self) -> usize {
        self.visits.read().len()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn visits(
        &self,
        range: TimeRange,
        filter: &VisitFilter,
    ) -> StoreResult<Vec<VisitRecord>> {
        Ok(self
            .visits
            .read()
            .iter()
            .filter(|r| range.contains(r.created_at) && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn assessments(
        &self,
        range: TimeRange,
        filter: &AssessmentFilter,
    ) -> StoreResult<Vec<AssessmentRecord>> {
        Ok(self
            .assessments
            .read()
            .iter()
            .filter(|r| range.contains(r.created_at) && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn behavior_events(
        &self,
        range: TimeRange,
        filter: &EventFilter,
    ) -> StoreResult<Vec<BehaviorEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|r| range.contains(r.created_at) && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn behavior_sessions(&self, range: TimeRange) -> StoreResult<Vec<BehaviorSession>> {
        Ok(self
            .sessions
            .read()
            .iter()
            .filter(|r| range.contains(r.created_at))
            .cloned()
            .collect())
    }

    async fn milestones(&self, range: TimeRange) -> StoreResult<Vec<MilestoneRecord>> {
        Ok(self
            .milestones
            .read()
            .iter()
            .filter(|r| range.contains(r.created_at))
            .cloned()
            .collect())
    }
}
