//! Four-read fan-in for the acquisition funnel. The reads are independent
//! of each other; composition proceeds only once all four resolve, and any
//! single failure zeroes the whole funnel rather than serving a partially
//! correct one.

use std::sync::Arc;

use tracing::error;

use revlens_core::response::{Envelope, ResponseMeta};
use revlens_core::types::{AssessmentStatus, TimeRange};
use revlens_store::{AssessmentFilter, RecordStore, VisitFilter};

use crate::{compose_funnel, FunnelReport};

#[derive(Clone)]
pub struct FunnelService {
    store: Arc<dyn RecordStore>,
}

impl FunnelService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn acquisition_funnel(&self, range: TimeRange) -> Envelope<FunnelReport> {
        let visit_filter = VisitFilter::default();
        let assessment_filter = AssessmentFilter::default();
        let linked_filter = AssessmentFilter::with_status(AssessmentStatus::Linked);
        let (visits, assessments, linked, milestones) = tokio::join!(
            self.store.visits(range, &visit_filter),
            self.store.assessments(range, &assessment_filter),
            self.store.assessments(range, &linked_filter),
            self.store.milestones(range),
        );

        match (visits, assessments, linked, milestones) {
            (Ok(visits), Ok(assessments), Ok(linked), Ok(milestones)) => {
                let report = compose_funnel(&visits, &assessments, &linked, &milestones);
                let total =
                    (visits.len() + assessments.len() + linked.len() + milestones.len()) as u64;
                let meta = ResponseMeta::new(total, report.stages.len() as u64, &range);
                Envelope::ok(report, meta)
            }
            (visits, assessments, linked, milestones) => {
                let err = [
                    visits.err(),
                    assessments.err(),
                    linked.err(),
                    milestones.err(),
                ]
                .into_iter()
                .flatten()
                .next()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown store failure".to_string());

                error!(error = %err, "Funnel read failed, zeroing all stages");
                metrics::counter!("funnel.store_errors").increment(1);
                Envelope::degraded(FunnelReport::zeroed(), err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use revlens_store::FailingStore;

    #[tokio::test]
    async fn test_any_failure_zeroes_whole_funnel() {
        let service = FunnelService::new(Arc::new(FailingStore));
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let range = TimeRange::new(start, start + Duration::days(30)).unwrap();

        let envelope = service.acquisition_funnel(range).await;
        assert!(!envelope.success);
        assert_eq!(envelope.data.stages.len(), 4);
        assert!(envelope.data.stages.iter().all(|s| s.entered == 0));
        assert!(envelope.error.is_some());
    }
}
