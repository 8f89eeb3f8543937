//! Aggregator boundary: issues the store reads, degrades failures into
//! empty-data envelopes, and never lets a store error escape as a panic or
//! exception past this layer.

use std::sync::Arc;

use tracing::error;

use revlens_core::response::{Envelope, ResponseMeta};
use revlens_core::types::{BehaviorEventType, TimeRange};
use revlens_store::{EventFilter, RecordStore, StoreError, VisitFilter};

use crate::assessment::{
    assessment_stats, score_distribution, top_companies, AssessmentStats, CompanyStats,
    ScoreBucket,
};
use crate::cta::{aggregate_ctas, CtaStats};
use crate::pages::{aggregate_pages, PageStats};
use crate::platform::{platform_usage, PlatformUsage};
use crate::utm::{aggregate_utm, UtmStats};

#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn RecordStore>,
}

fn degraded<T>(aggregator: &'static str, data: T, err: &StoreError) -> Envelope<T> {
    error!(aggregator, error = %err, "Store read failed, returning degraded envelope");
    metrics::counter!("analytics.store_errors", "aggregator" => aggregator).increment(1);
    Envelope::degraded(data, err.to_string())
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn page_performance(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Envelope<Vec<PageStats>> {
        match self.store.visits(range, &VisitFilter::default()).await {
            Ok(visits) => {
                let rows = aggregate_pages(&visits, limit);
                let meta = ResponseMeta::new(visits.len() as u64, rows.len() as u64, &range);
                Envelope::ok(rows, meta)
            }
            Err(e) => degraded("page_performance", Vec::new(), &e),
        }
    }

    pub async fn cta_performance(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Envelope<Vec<CtaStats>> {
        match self.store.visits(range, &VisitFilter::default()).await {
            Ok(visits) => {
                let rows = aggregate_ctas(&visits, limit);
                let meta = ResponseMeta::new(visits.len() as u64, rows.len() as u64, &range);
                Envelope::ok(rows, meta)
            }
            Err(e) => degraded("cta_performance", Vec::new(), &e),
        }
    }

    pub async fn utm_attribution(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Envelope<Vec<UtmStats>> {
        match self.store.visits(range, &VisitFilter::default()).await {
            Ok(visits) => {
                let rows = aggregate_utm(&visits, limit);
                let meta = ResponseMeta::new(visits.len() as u64, rows.len() as u64, &range);
                Envelope::ok(rows, meta)
            }
            Err(e) => degraded("utm_attribution", Vec::new(), &e),
        }
    }

    pub async fn assessment_overview(&self, range: TimeRange) -> Envelope<AssessmentStats> {
        match self.store.assessments(range, &Default::default()).await {
            Ok(records) => {
                let stats = assessment_stats(&records);
                let meta = ResponseMeta::new(records.len() as u64, records.len() as u64, &range);
                Envelope::ok(stats, meta)
            }
            Err(e) => degraded("assessment_overview", AssessmentStats::default(), &e),
        }
    }

    pub async fn score_distribution(&self, range: TimeRange) -> Envelope<Vec<ScoreBucket>> {
        match self.store.assessments(range, &Default::default()).await {
            Ok(records) => {
                let buckets = score_distribution(&records);
                let meta = ResponseMeta::new(records.len() as u64, buckets.len() as u64, &range);
                Envelope::ok(buckets, meta)
            }
            // Degraded payload keeps the fixed five-bucket shape.
            Err(e) => degraded("score_distribution", ScoreBucket::zeroed(), &e),
        }
    }

    pub async fn top_companies(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Envelope<Vec<CompanyStats>> {
        match self.store.assessments(range, &Default::default()).await {
            Ok(records) => {
                let rows = top_companies(&records, limit);
                let meta = ResponseMeta::new(records.len() as u64, rows.len() as u64, &range);
                Envelope::ok(rows, meta)
            }
            Err(e) => degraded("top_companies", Vec::new(), &e),
        }
    }

    pub async fn platform_usage(&self, range: TimeRange, limit: usize) -> Envelope<PlatformUsage> {
        let filter = EventFilter::with_event_type(BehaviorEventType::ToolUse);
        let (sessions, events) = tokio::join!(
            self.store.behavior_sessions(range),
            self.store.behavior_events(range, &filter),
        );
        match (sessions, events) {
            (Ok(sessions), Ok(events)) => {
                let usage = platform_usage(&sessions, &events, limit);
                let meta = ResponseMeta::new(
                    (sessions.len() + events.len()) as u64,
                    usage.tools.len() as u64,
                    &range,
                );
                Envelope::ok(usage, meta)
            }
            (Err(e), _) | (_, Err(e)) => {
                degraded("platform_usage", PlatformUsage::default(), &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use revlens_core::types::VisitRecord;
    use revlens_store::{FailingStore, InMemoryStore};
    use uuid::Uuid;

    fn range() -> TimeRange {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        TimeRange::new(start, start + Duration::days(30)).unwrap()
    }

    fn visit(page: &str, actor: &str) -> VisitRecord {
        VisitRecord {
            id: Uuid::new_v4(),
            actor_id: actor.to_string(),
            user_id: None,
            page_path: page.to_string(),
            time_on_page_secs: Some(30.0),
            scroll_depth_pct: None,
            cta_text: None,
            cta_location: None,
            clicked_cta: false,
            converted: false,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            created_at: Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_success_envelope_carries_metadata() {
        let store = Arc::new(InMemoryStore::new());
        store.add_visit(visit("/pricing", "a"));
        store.add_visit(visit("/pricing", "b"));

        let service = AnalyticsService::new(store);
        let envelope = service.page_performance(range(), 10).await;
        assert!(envelope.success);
        assert_eq!(envelope.data.len(), 1);
        let meta = envelope.metadata.unwrap();
        assert_eq!(meta.total_count, 2);
        assert_eq!(meta.filtered_count, 1);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_not_panics() {
        let service = AnalyticsService::new(Arc::new(FailingStore));

        let pages = service.page_performance(range(), 10).await;
        assert!(!pages.success);
        assert!(pages.data.is_empty());
        assert!(pages.error.unwrap().contains("offline"));

        let overview = service.assessment_overview(range()).await;
        assert!(!overview.success);
        assert_eq!(overview.data.total_started, 0);
    }

    #[tokio::test]
    async fn test_degraded_score_distribution_keeps_bucket_shape() {
        let service = AnalyticsService::new(Arc::new(FailingStore));
        let envelope = service.score_distribution(range()).await;
        assert!(!envelope.success);
        assert_eq!(envelope.data.len(), 5);
        assert!(envelope.data.iter().all(|b| b.count == 0));
    }

    #[tokio::test]
    async fn test_idempotent_recomputation() {
        let store = Arc::new(InMemoryStore::new());
        store.add_visit(visit("/pricing", "a"));
        let service = AnalyticsService::new(store);

        let first = service.page_performance(range(), 10).await;
        let second = service.page_performance(range(), 10).await;
        assert_eq!(
            serde_json::to_string(&first.data).unwrap(),
            serde_json::to_string(&second.data).unwrap()
        );
    }
}
