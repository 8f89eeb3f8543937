//! CTA performance rollup keyed by (text, placement).
//!
//! Conversion rate is conditioned on having clicked: conversions / clicks,
//! not conversions / impressions. A CTA that converts 2 of 10 clickers is a
//! 20% converter even at 100 impressions.

use serde::{Deserialize, Serialize};

use revlens_core::numeric::safe_percentage;
use revlens_core::types::VisitRecord;

use crate::rollup::{rank, rollup};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtaStats {
    pub cta_text: String,
    pub cta_location: String,
    pub impressions: u64,
    pub clicks: u64,
    pub click_through_rate: f64,
    pub conversions: u64,
    pub conversion_rate: f64,
}

#[derive(Default)]
struct CtaAcc {
    impressions: u64,
    clicks: u64,
    conversions: u64,
}

/// Group visits by CTA identity, ranked by click-through rate descending.
/// Visits with no CTA rendered are skipped; conversions are counted among
/// clicking visits only, keeping the rate within [0, 100].
pub fn aggregate_ctas(visits: &[VisitRecord], limit: usize) -> Vec<CtaStats> {
    let rows = rollup(
        visits,
        |v| {
            v.cta_text.as_ref().map(|text| {
                (
                    text.clone(),
                    v.cta_location.clone().unwrap_or_else(|| "unknown".to_string()),
                )
            })
        },
        |acc: &mut CtaAcc, v| {
            acc.impressions += 1;
            if v.clicked_cta {
                acc.clicks += 1;
                if v.converted {
                    acc.conversions += 1;
                }
            }
        },
        |(cta_text, cta_location), acc| CtaStats {
            cta_text,
            cta_location,
            impressions: acc.impressions,
            clicks: acc.clicks,
            click_through_rate: safe_percentage(acc.clicks as f64, acc.impressions as f64),
            conversions: acc.conversions,
            conversion_rate: safe_percentage(acc.conversions as f64, acc.clicks as f64),
        },
    );

    rank(
        rows,
        |a, b| {
            b.click_through_rate
                .total_cmp(&a.click_through_rate)
                .then_with(|| a.cta_text.cmp(&b.cta_text))
                .then_with(|| a.cta_location.cmp(&b.cta_location))
        },
        limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn cta_visit(text: &str, location: &str, clicked: bool, converted: bool) -> VisitRecord {
        VisitRecord {
            id: Uuid::new_v4(),
            actor_id: "actor".to_string(),
            user_id: None,
            page_path: "/".to_string(),
            time_on_page_secs: None,
            scroll_depth_pct: None,
            cta_text: Some(text.to_string()),
            cta_location: Some(location.to_string()),
            clicked_cta: clicked,
            converted,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            created_at: Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_conversion_rate_conditioned_on_clicks() {
        // 100 impressions, 10 clicks, 2 conversions → CTR 10%, CVR 20%.
        let mut visits = Vec::new();
        for i in 0..100 {
            let clicked = i < 10;
            let converted = i < 2;
            visits.push(cta_visit("Start Assessment", "hero", clicked, converted));
        }

        let stats = aggregate_ctas(&visits, 10);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].impressions, 100);
        assert_eq!(stats[0].clicks, 10);
        assert_eq!(stats[0].click_through_rate, 10.0);
        assert_eq!(stats[0].conversions, 2);
        assert_eq!(stats[0].conversion_rate, 20.0);
    }

    #[test]
    fn test_visits_without_cta_are_skipped() {
        let mut plain = cta_visit("x", "hero", false, false);
        plain.cta_text = None;
        let visits = vec![plain, cta_visit("Book Demo", "footer", true, false)];

        let stats = aggregate_ctas(&visits, 10);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].cta_text, "Book Demo");
    }

    #[test]
    fn test_same_text_different_location_are_distinct() {
        let visits = vec![
            cta_visit("Book Demo", "hero", true, false),
            cta_visit("Book Demo", "footer", false, false),
        ];
        let stats = aggregate_ctas(&visits, 10);
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn test_zero_clicks_yields_zero_rates() {
        let visits = vec![cta_visit("Book Demo", "hero", false, false)];
        let stats = aggregate_ctas(&visits, 10);
        assert_eq!(stats[0].click_through_rate, 0.0);
        assert_eq!(stats[0].conversion_rate, 0.0);
    }
}
