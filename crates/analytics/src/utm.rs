//! UTM attribution rollup keyed by (source, medium, campaign).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use revlens_core::numeric::{safe_average, safe_percentage};
use revlens_core::types::VisitRecord;

use crate::rollup::{rank, rollup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtmStats {
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
    pub visits: u64,
    pub unique_visitors: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
    pub avg_time_on_site_secs: f64,
}

#[derive(Default)]
struct UtmAcc {
    visits: u64,
    actors: HashSet<String>,
    converted_actors: HashSet<String>,
    time_sum: f64,
    time_count: usize,
}

/// Group visits by UTM tuple, ranked by conversions descending. Untagged
/// traffic lands under ("direct", "none", "none"). Conversions are deduped
/// per visitor so the rate against unique visitors stays within [0, 100].
pub fn aggregate_utm(visits: &[VisitRecord], limit: usize) -> Vec<UtmStats> {
    let rows = rollup(
        visits,
        |v| {
            Some((
                v.utm_source.clone().unwrap_or_else(|| "direct".to_string()),
                v.utm_medium.clone().unwrap_or_else(|| "none".to_string()),
                v.utm_campaign.clone().unwrap_or_else(|| "none".to_string()),
            ))
        },
        |acc: &mut UtmAcc, v| {
            acc.visits += 1;
            acc.actors.insert(v.actor_id.clone());
            if v.converted {
                acc.converted_actors.insert(v.actor_id.clone());
            }
            if let Some(t) = v.time_on_page_secs {
                acc.time_sum += t;
                acc.time_count += 1;
            }
        },
        |(utm_source, utm_medium, utm_campaign), acc| {
            let unique = acc.actors.len() as u64;
            let conversions = acc.converted_actors.len() as u64;
            UtmStats {
                utm_source,
                utm_medium,
                utm_campaign,
                visits: acc.visits,
                unique_visitors: unique,
                conversions,
                conversion_rate: safe_percentage(conversions as f64, unique as f64),
                avg_time_on_site_secs: safe_average(acc.time_sum, acc.time_count),
            }
        },
    );

    rank(
        rows,
        |a, b| {
            b.conversions
                .cmp(&a.conversions)
                .then_with(|| b.visits.cmp(&a.visits))
                .then_with(|| a.utm_source.cmp(&b.utm_source))
                .then_with(|| a.utm_campaign.cmp(&b.utm_campaign))
        },
        limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn utm_visit(
        source: Option<&str>,
        campaign: Option<&str>,
        actor: &str,
        converted: bool,
    ) -> VisitRecord {
        VisitRecord {
            id: Uuid::new_v4(),
            actor_id: actor.to_string(),
            user_id: None,
            page_path: "/".to_string(),
            time_on_page_secs: Some(45.0),
            scroll_depth_pct: None,
            cta_text: None,
            cta_location: None,
            clicked_cta: false,
            converted,
            utm_source: source.map(str::to_string),
            utm_medium: source.map(|_| "cpc".to_string()),
            utm_campaign: campaign.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_untagged_traffic_is_direct() {
        let visits = vec![
            utm_visit(None, None, "a", false),
            utm_visit(Some("google"), Some("launch"), "b", true),
        ];
        let stats = aggregate_utm(&visits, 10);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().any(|s| s.utm_source == "direct"));
        // The converting campaign ranks first.
        assert_eq!(stats[0].utm_source, "google");
    }

    #[test]
    fn test_conversions_deduped_per_visitor() {
        // One visitor converts twice; the rate must not exceed 100%.
        let visits = vec![
            utm_visit(Some("google"), Some("launch"), "a", true),
            utm_visit(Some("google"), Some("launch"), "a", true),
        ];
        let stats = aggregate_utm(&visits, 10);
        assert_eq!(stats[0].visits, 2);
        assert_eq!(stats[0].unique_visitors, 1);
        assert_eq!(stats[0].conversions, 1);
        assert_eq!(stats[0].conversion_rate, 100.0);
    }

    #[test]
    fn test_conversion_rate_over_unique_visitors() {
        let visits = vec![
            utm_visit(Some("google"), Some("launch"), "a", true),
            utm_visit(Some("google"), Some("launch"), "b", false),
            utm_visit(Some("google"), Some("launch"), "c", false),
            utm_visit(Some("google"), Some("launch"), "d", false),
        ];
        let stats = aggregate_utm(&visits, 10);
        assert_eq!(stats[0].conversion_rate, 25.0);
        assert_eq!(stats[0].avg_time_on_site_secs, 45.0);
    }
}
