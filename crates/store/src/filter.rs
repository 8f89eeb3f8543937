//! Typed predicates applied on top of the time-range bound.

use revlens_core::types::{
    AssessmentRecord, AssessmentStatus, BehaviorEvent, BehaviorEventType, VisitRecord,
};

#[derive(Debug, Clone, Default)]
pub struct VisitFilter {
    /// Prefix match on `page_path`.
    pub page_prefix: Option<String>,
    pub actor_id: Option<String>,
}

impl VisitFilter {
    pub fn matches(&self, record: &VisitRecord) -> bool {
        if let Some(prefix) = &self.page_prefix {
            if !record.page_path.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(actor) = &self.actor_id {
            if &record.actor_id != actor {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentFilter {
    pub status: Option<AssessmentStatus>,
}

impl AssessmentFilter {
    pub fn with_status(status: AssessmentStatus) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn matches(&self, record: &AssessmentRecord) -> bool {
        self.status.map_or(true, |s| record.status == s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<BehaviorEventType>,
    pub actor_id: Option<String>,
}

impl EventFilter {
    pub fn with_event_type(event_type: BehaviorEventType) -> Self {
        Self {
            event_type: Some(event_type),
            actor_id: None,
        }
    }

    pub fn matches(&self, record: &BehaviorEvent) -> bool {
        if let Some(et) = self.event_type {
            if record.event_type != et {
                return false;
            }
        }
        if let Some(actor) = &self.actor_id {
            if &record.actor_id != actor {
                return false;
            }
        }
        true
    }
}
