//! Acquisition funnel composer — joins four disjoint record stores into a
//! strictly-ordered Visit → Assessment → Signup → Payment pipeline.
//!
//! The stores share no foreign key; the only bridge between anonymous
//! visits and milestones is the opportunistic `user_id` on visit rows, so
//! the time-to-convert join is best-effort by construction.

pub mod service;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use revlens_core::numeric::{safe_average, safe_percentage};
use revlens_core::types::{AssessmentRecord, MilestoneRecord, VisitRecord};

pub use service::FunnelService;

/// Actors whose visit→milestone delta falls outside (0, 30 days] are
/// excluded from the time-to-convert mean.
const CONVERSION_WINDOW_DAYS: i64 = 30;

pub const STAGE_NAMES: [&str; 4] = ["visit", "assessment", "signup", "payment"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunnelStage {
    pub stage: String,
    pub entered: u64,
    pub completed: u64,
    pub dropped: u64,
    pub completion_rate: f64,
    pub drop_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunnelReport {
    pub stages: Vec<FunnelStage>,
    pub overall_conversion_rate: f64,
    /// Mean hours from first visit to milestone over correlated actors;
    /// 0.0 when no actor correlates.
    pub avg_time_to_convert_hours: f64,
    pub correlated_actors: u64,
}

impl FunnelReport {
    /// Fully-populated all-zero skeleton. A funnel with one missing stage
    /// is misleading by construction, so any read failure yields this.
    pub fn zeroed() -> Self {
        Self {
            stages: STAGE_NAMES
                .iter()
                .map(|name| FunnelStage {
                    stage: (*name).to_string(),
                    ..FunnelStage::default()
                })
                .collect(),
            overall_conversion_rate: 0.0,
            avg_time_to_convert_hours: 0.0,
            correlated_actors: 0,
        }
    }
}

/// Compose the four stage counts into a monotone funnel. Each stage enters
/// with the previous stage's completions; raw counts are capped by the
/// stage above so no stage reports more actors than could have reached it.
pub fn compose_funnel(
    visits: &[VisitRecord],
    assessments: &[AssessmentRecord],
    linked: &[AssessmentRecord],
    milestones: &[MilestoneRecord],
) -> FunnelReport {
    let visit_actors: HashSet<&str> = visits.iter().map(|v| v.actor_id.as_str()).collect();
    let assessment_identities: HashSet<String> = assessments
        .iter()
        .map(|a| a.user_email.trim().to_ascii_lowercase())
        .collect();
    let signup_count = linked.len() as u64;
    let payment_count = milestones.iter().filter(|m| m.is_founding_member).count() as u64;

    let raw_counts = [
        visit_actors.len() as u64,
        assessment_identities.len() as u64,
        signup_count,
        payment_count,
    ];

    let mut stages = Vec::with_capacity(raw_counts.len());
    let mut entered = raw_counts[0];
    for (i, name) in STAGE_NAMES.iter().enumerate() {
        let completed = match raw_counts.get(i + 1) {
            Some(next) => (*next).min(entered),
            None => entered,
        };
        let dropped = entered - completed;
        stages.push(FunnelStage {
            stage: (*name).to_string(),
            entered,
            completed,
            dropped,
            completion_rate: safe_percentage(completed as f64, entered as f64),
            drop_rate: safe_percentage(dropped as f64, entered as f64),
        });
        entered = completed;
    }

    let (avg_hours, correlated) = time_to_convert(visits, milestones);

    FunnelReport {
        overall_conversion_rate: safe_percentage(
            stages[3].entered as f64,
            stages[0].entered as f64,
        ),
        avg_time_to_convert_hours: avg_hours,
        correlated_actors: correlated,
        stages,
    }
}

/// Weak identity correlation between visit rows and milestone rows:
/// earliest visit per opportunistic `user_id` vs. earliest qualifying
/// milestone, restricted to a positive delta inside the conversion window.
fn time_to_convert(visits: &[VisitRecord], milestones: &[MilestoneRecord]) -> (f64, u64) {
    let mut first_visit: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for visit in visits {
        if let Some(user_id) = visit.user_id.as_deref() {
            first_visit
                .entry(user_id)
                .and_modify(|at| *at = (*at).min(visit.created_at))
                .or_insert(visit.created_at);
        }
    }

    let mut first_milestone: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for milestone in milestones {
        if milestone.is_founding_member {
            first_milestone
                .entry(milestone.actor_id.as_str())
                .and_modify(|at| *at = (*at).min(milestone.created_at))
                .or_insert(milestone.created_at);
        }
    }

    let window = Duration::days(CONVERSION_WINDOW_DAYS);
    let mut sum_hours = 0.0;
    let mut count = 0usize;
    for (actor, milestone_at) in &first_milestone {
        if let Some(visit_at) = first_visit.get(actor) {
            let delta = *milestone_at - *visit_at;
            if delta > Duration::zero() && delta <= window {
                sum_hours += delta.num_seconds() as f64 / 3600.0;
                count += 1;
            }
        }
    }

    (safe_average(sum_hours, count), count as u64)
}
