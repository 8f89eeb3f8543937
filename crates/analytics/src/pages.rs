//! Page performance rollup — per-path visit totals, engagement means, and
//! CTA/conversion rates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use revlens_core::numeric::{safe_average, safe_percentage};
use revlens_core::types::VisitRecord;

use crate::rollup::{rank, rollup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageStats {
    pub page_path: String,
    pub total_visits: u64,
    pub unique_visitors: u64,
    pub avg_time_on_page_secs: f64,
    pub avg_scroll_depth_pct: f64,
    pub cta_clicks: u64,
    pub cta_click_rate: f64,
    pub conversions: u64,
    pub conversion_rate: f64,
}

#[derive(Default)]
struct PageAcc {
    visits: u64,
    actors: HashSet<String>,
    time_sum: f64,
    time_count: usize,
    scroll_sum: f64,
    scroll_count: usize,
    cta_clicks: u64,
    conversions: u64,
}

/// Group visits by page path, ranked by total visits descending.
/// Null engagement readings are excluded from the means, not zeroed.
pub fn aggregate_pages(visits: &[VisitRecord], limit: usize) -> Vec<PageStats> {
    let rows = rollup(
        visits,
        |v| Some(v.page_path.clone()),
        |acc: &mut PageAcc, v| {
            acc.visits += 1;
            acc.actors.insert(v.actor_id.clone());
            if let Some(t) = v.time_on_page_secs {
                acc.time_sum += t;
                acc.time_count += 1;
            }
            if let Some(s) = v.scroll_depth_pct {
                acc.scroll_sum += s;
                acc.scroll_count += 1;
            }
            if v.clicked_cta {
                acc.cta_clicks += 1;
            }
            if v.converted {
                acc.conversions += 1;
            }
        },
        |page_path, acc| PageStats {
            page_path,
            total_visits: acc.visits,
            unique_visitors: acc.actors.len() as u64,
            avg_time_on_page_secs: safe_average(acc.time_sum, acc.time_count),
            avg_scroll_depth_pct: safe_average(acc.scroll_sum, acc.scroll_count),
            cta_clicks: acc.cta_clicks,
            cta_click_rate: safe_percentage(acc.cta_clicks as f64, acc.visits as f64),
            conversions: acc.conversions,
            conversion_rate: safe_percentage(acc.conversions as f64, acc.visits as f64),
        },
    );

    rank(
        rows,
        |a, b| {
            b.total_visits
                .cmp(&a.total_visits)
                .then_with(|| a.page_path.cmp(&b.page_path))
        },
        limit,
    )
}
