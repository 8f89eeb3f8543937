//! Store boundary for journey analysis.

use std::sync::Arc;

use tracing::error;

use revlens_core::response::{Envelope, ResponseMeta};
use revlens_core::types::{BehaviorEventType, TimeRange};
use revlens_store::{EventFilter, RecordStore, StoreError};

use crate::navigation::{build_navigation_graph, NavigationEdge};
use crate::patterns::{mine_journey_patterns, JourneyPattern};

#[derive(Clone)]
pub struct JourneyService {
    store: Arc<dyn RecordStore>,
}

fn degraded<T>(aggregator: &'static str, data: T, err: &StoreError) -> Envelope<T> {
    error!(aggregator, error = %err, "Store read failed, returning degraded envelope");
    metrics::counter!("journey.store_errors", "aggregator" => aggregator).increment(1);
    Envelope::degraded(data, err.to_string())
}

impl JourneyService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn navigation_graph(
        &self,
        range: TimeRange,
        limit: usize,
    ) -> Envelope<Vec<NavigationEdge>> {
        let filter = EventFilter::with_event_type(BehaviorEventType::Navigation);
        match self.store.behavior_events(range, &filter).await {
            Ok(events) => {
                let edges = build_navigation_graph(&events, limit);
                let meta = ResponseMeta::new(events.len() as u64, edges.len() as u64, &range);
                Envelope::ok(edges, meta)
            }
            Err(e) => degraded("navigation_graph", Vec::new(), &e),
        }
    }

    pub async fn journey_patterns(
        &self,
        range: TimeRange,
        min_occurrences: usize,
        limit: usize,
    ) -> Envelope<Vec<JourneyPattern>> {
        let filter = EventFilter::with_event_type(BehaviorEventType::Navigation);
        match self.store.behavior_events(range, &filter).await {
            Ok(events) => {
                let patterns = mine_journey_patterns(&events, min_occurrences, limit);
                let meta = ResponseMeta::new(events.len() as u64, patterns.len() as u64, &range);
                Envelope::ok(patterns, meta)
            }
            Err(e) => degraded("journey_patterns", Vec::new(), &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use revlens_core::types::BehaviorEvent;
    use revlens_store::{FailingStore, InMemoryStore};
    use uuid::Uuid;

    fn range() -> TimeRange {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        TimeRange::new(start, start + Duration::days(30)).unwrap()
    }

    fn nav(actor: &str, page: &str, offset_secs: i64) -> BehaviorEvent {
        BehaviorEvent {
            id: Uuid::new_v4(),
            actor_id: actor.to_string(),
            event_type: BehaviorEventType::Navigation,
            tool_id: None,
            page_path: Some(page.to_string()),
            metadata: Default::default(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_navigation_graph_end_to_end() {
        let store = Arc::new(InMemoryStore::new());
        store.add_event(nav("a", "/pricing", 0));
        store.add_event(nav("a", "/tools/persona-builder", 45));

        let service = JourneyService::new(store);
        let envelope = service.navigation_graph(range(), 10).await;
        assert!(envelope.success);
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].conversions, 1);
    }

    #[tokio::test]
    async fn test_degraded_on_store_failure() {
        let service = JourneyService::new(Arc::new(FailingStore));
        let envelope = service.journey_patterns(range(), 1, 10).await;
        assert!(!envelope.success);
        assert!(envelope.data.is_empty());
    }
}
