//! Journey pattern mining — canonicalizes each actor's full ordered page
//! sequence and counts exact repeats across actors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use revlens_core::numeric::{safe_average, safe_percentage};
use revlens_core::types::BehaviorEvent;

use crate::goals::is_goal_page;
use crate::sequences::actor_sequences;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyPattern {
    pub pages: Vec<String>,
    pub occurrences: u64,
    pub avg_duration_secs: f64,
    pub conversions: u64,
    pub conversion_rate: f64,
    /// Most frequent terminal page among non-converting instances.
    pub top_dropout_page: Option<String>,
}

#[derive(Default)]
struct PatternAcc {
    occurrences: u64,
    duration_sum: f64,
    conversions: u64,
    dropout_pages: HashMap<String, u64>,
}

/// Mine repeated journeys. Two actors merge only when their sequences
/// match exactly, order included. Patterns seen fewer than
/// `min_occurrences` times are discarded; survivors are ranked by
/// occurrence count descending and truncated to `limit`.
pub fn mine_journey_patterns(
    events: &[BehaviorEvent],
    min_occurrences: usize,
    limit: usize,
) -> Vec<JourneyPattern> {
    let sequences = actor_sequences(events);
    let mut patterns: HashMap<Vec<String>, PatternAcc> = HashMap::new();

    for steps in sequences.values() {
        let Some(last) = steps.last() else { continue };
        let Some(first) = steps.first() else { continue };

        let pages: Vec<String> = steps.iter().map(|s| s.page.clone()).collect();
        let acc = patterns.entry(pages).or_default();
        acc.occurrences += 1;

        let duration = (last.at - first.at).num_seconds();
        if duration > 0 {
            acc.duration_sum += duration as f64;
        }

        if is_goal_page(&last.page) {
            acc.conversions += 1;
        } else {
            *acc.dropout_pages.entry(last.page.clone()).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<JourneyPattern> = patterns
        .into_iter()
        .filter(|(_, acc)| acc.occurrences >= min_occurrences as u64)
        .map(|(pages, acc)| {
            let top_dropout_page = acc
                .dropout_pages
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(page, _)| page.clone());
            JourneyPattern {
                pages,
                avg_duration_secs: safe_average(acc.duration_sum, acc.occurrences as usize),
                conversions: acc.conversions,
                conversion_rate: safe_percentage(acc.conversions as f64, acc.occurrences as f64),
                occurrences: acc.occurrences,
                top_dropout_page,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.pages.cmp(&b.pages))
    });
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use revlens_core::types::BehaviorEventType;
    use uuid::Uuid;

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

    fn journey(actor: &str, pages: &[&str]) -> Vec<BehaviorEvent> {
        pages
            .iter()
            .enumerate()
            .map(|(i, page)| nav(actor, page, i as i64 * 60))
            .collect()
    }

    #[test]
    fn test_exact_sequences_merge() {
        let mut events = journey("a", &["/pricing", "/features", "/dashboard"]);
        events.extend(journey("b", &["/pricing", "/features", "/dashboard"]));
        events.extend(journey("c", &["/pricing", "/dashboard"]));

        let patterns = mine_journey_patterns(&events, 1, 10);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].occurrences, 2);
        assert_eq!(patterns[0].pages, vec!["/pricing", "/features", "/dashboard"]);
        assert_eq!(patterns[0].conversions, 2);
        assert_eq!(patterns[0].conversion_rate, 100.0);
        assert_eq!(patterns[0].avg_duration_secs, 120.0);
    }

    #[test]
    fn test_min_occurrence_threshold() {
        let mut events = journey("a", &["/pricing", "/features"]);
        events.extend(journey("b", &["/pricing", "/features"]));
        events.extend(journey("c", &["/pricing", "/blog"]));

        let patterns = mine_journey_patterns(&events, 2, 10);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pages, vec!["/pricing", "/features"]);
    }

    #[test]
    fn test_top_dropout_page() {
        let mut events = journey("a", &["/pricing", "/blog"]);
        events.extend(journey("b", &["/pricing", "/blog"]));

        let patterns = mine_journey_patterns(&events, 1, 10);
        assert_eq!(patterns[0].conversions, 0);
        assert_eq!(patterns[0].top_dropout_page.as_deref(), Some("/blog"));
    }

    #[test]
    fn test_mining_is_order_independent() {
        let mut forward = journey("a", &["/pricing", "/features", "/dashboard"]);
        forward.extend(journey("b", &["/pricing", "/features", "/dashboard"]));
        forward.extend(journey("c", &["/pricing", "/blog"]));
        forward.extend(journey("d", &["/pricing", "/blog"]));

        let mut reversed: Vec<BehaviorEvent> = forward.clone();
        reversed.reverse();

        let a = mine_journey_patterns(&forward, 1, 10);
        let b = mine_journey_patterns(&reversed, 1, 10);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
