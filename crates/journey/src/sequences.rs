//! Per-actor sequence reconstruction from unordered navigation events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use revlens_core::types::{BehaviorEvent, BehaviorEventType};

/// One timestamped page label in an actor's journey.
#[derive(Debug, Clone)]
pub struct PageStep {
    pub page: String,
    pub at: DateTime<Utc>,
}

/// Group navigation events by actor into time-ordered page sequences.
/// Non-navigation events are ignored; events without page metadata get the
/// literal `"unknown"` label. Ties on timestamp are broken by event id so
/// the reconstruction is independent of input ordering.
pub fn actor_sequences(events: &[BehaviorEvent]) -> HashMap<String, Vec<PageStep>> {
    let mut grouped: HashMap<String, Vec<&BehaviorEvent>> = HashMap::new();
    for event in events {
        if event.event_type == BehaviorEventType::Navigation {
            grouped.entry(event.actor_id.clone()).or_default().push(event);
        }
    }

    grouped
        .into_iter()
        .map(|(actor, mut events)| {
            events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            let steps = events
                .into_iter()
                .map(|e| PageStep {
                    page: e
                        .page_path
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                    at: e.created_at,
                })
                .collect();
            (actor, steps)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn nav(actor: &str, page: Option<&str>, offset_secs: i64) -> BehaviorEvent {
        BehaviorEvent {
            id: Uuid::new_v4(),
            actor_id: actor.to_string(),
            event_type: BehaviorEventType::Navigation,
            tool_id: None,
            page_path: page.map(str::to_string),
            metadata: Default::default(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_reorders_unordered_events() {
        let events = vec![
            nav("a", Some("/c"), 120),
            nav("a", Some("/a"), 0),
            nav("a", Some("/b"), 60),
        ];
        let sequences = actor_sequences(&events);
        let pages: Vec<&str> = sequences["a"].iter().map(|s| s.page.as_str()).collect();
        assert_eq!(pages, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_missing_page_becomes_unknown() {
        let events = vec![nav("a", None, 0)];
        let sequences = actor_sequences(&events);
        assert_eq!(sequences["a"][0].page, "unknown");
    }

    #[test]
    fn test_non_navigation_events_ignored() {
        let mut action = nav("a", Some("/x"), 0);
        action.event_type = BehaviorEventType::Action;
        let sequences = actor_sequences(&[action]);
        assert!(sequences.is_empty());
    }
}
