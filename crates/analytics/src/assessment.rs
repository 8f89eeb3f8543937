//! Assessment-session aggregates: completion stats, score distribution,
//! and top submitting companies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revlens_core::numeric::{safe_average, safe_percentage};
use revlens_core::types::{AssessmentRecord, AssessmentStatus};

use crate::rollup::{rank, rollup};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentStats {
    pub total_started: u64,
    pub total_completed: u64,
    pub total_abandoned: u64,
    pub total_signed_up: u64,
    pub completion_rate: f64,
    pub avg_overall_score: f64,
    pub avg_buyer_score: f64,
    pub avg_completion_secs: f64,
}

/// Partition sessions by status and compute completion/score means.
/// Score means cover completed sessions with a score only; completion
/// duration covers strictly positive (updated_at − created_at) only.
pub fn assessment_stats(records: &[AssessmentRecord]) -> AssessmentStats {
    let total_started = records.len() as u64;
    let mut completed = 0u64;
    let mut abandoned = 0u64;
    let mut signed_up = 0u64;
    let mut overall_sum = 0.0;
    let mut overall_count = 0usize;
    let mut buyer_sum = 0.0;
    let mut buyer_count = 0usize;
    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;

    for record in records {
        if record.status.is_completed() {
            completed += 1;
            if let Some(score) = record.overall_score {
                overall_sum += score;
                overall_count += 1;
            }
            if let Some(score) = record.buyer_score {
                buyer_sum += score;
                buyer_count += 1;
            }
            let secs = (record.updated_at - record.created_at).num_seconds();
            if secs > 0 {
                duration_sum += secs as f64;
                duration_count += 1;
            }
        } else if record.status == AssessmentStatus::Abandoned {
            abandoned += 1;
        }
        if record.user_id.is_some() {
            signed_up += 1;
        }
    }

    AssessmentStats {
        total_started,
        total_completed: completed,
        total_abandoned: abandoned,
        total_signed_up: signed_up,
        completion_rate: safe_percentage(completed as f64, total_started as f64),
        avg_overall_score: safe_average(overall_sum, overall_count),
        avg_buyer_score: safe_average(buyer_sum, buyer_count),
        avg_completion_secs: safe_average(duration_sum, duration_count),
    }
}

// ─── Score Distribution ─────────────────────────────────────────────────

const BUCKET_LABELS: [&str; 5] = ["0-20", "21-40", "41-60", "61-80", "81-100"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub label: String,
    pub count: u64,
    pub percentage: f64,
}

impl ScoreBucket {
    /// The fixed five-bucket skeleton with zero counts, used both as the
    /// degraded payload and as the base for live counting.
    pub fn zeroed() -> Vec<ScoreBucket> {
        BUCKET_LABELS
            .iter()
            .map(|label| ScoreBucket {
                label: (*label).to_string(),
                count: 0,
                percentage: 0.0,
            })
            .collect()
    }
}

fn bucket_index(score: f64) -> usize {
    if score <= 20.0 {
        0
    } else if score <= 40.0 {
        1
    } else if score <= 60.0 {
        2
    } else if score <= 80.0 {
        3
    } else {
        4
    }
}

/// Bucket non-null overall scores into five fixed ranges. Buckets are
/// exhaustive and disjoint over [0, 100]; sessions without a score are
/// excluded from both counts and percentages.
pub fn score_distribution(records: &[AssessmentRecord]) -> Vec<ScoreBucket> {
    let mut buckets = ScoreBucket::zeroed();
    let mut scored = 0u64;

    for record in records {
        if let Some(score) = record.overall_score {
            buckets[bucket_index(score)].count += 1;
            scored += 1;
        }
    }

    for bucket in &mut buckets {
        bucket.percentage = safe_percentage(bucket.count as f64, scored as f64);
    }
    buckets
}

// ─── Top Companies ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyStats {
    pub company_name: String,
    pub assessment_count: u64,
    pub avg_score: f64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct CompanyAcc {
    count: u64,
    score_sum: f64,
    score_count: usize,
    latest: Option<DateTime<Utc>>,
}

/// Group assessments by company, ranked by submission count descending.
pub fn top_companies(records: &[AssessmentRecord], limit: usize) -> Vec<CompanyStats> {
    let rows = rollup(
        records,
        |r| r.company_name.clone(),
        |acc: &mut CompanyAcc, r| {
            acc.count += 1;
            if let Some(score) = r.overall_score {
                acc.score_sum += score;
                acc.score_count += 1;
            }
            acc.latest = match acc.latest {
                Some(prev) if prev >= r.created_at => Some(prev),
                _ => Some(r.created_at),
            };
        },
        |company_name, acc| CompanyStats {
            company_name,
            assessment_count: acc.count,
            avg_score: safe_average(acc.score_sum, acc.score_count),
            last_submission_at: acc.latest,
        },
    );

    rank(
        rows,
        |a, b| {
            b.assessment_count
                .cmp(&a.assessment_count)
                .then_with(|| a.company_name.cmp(&b.company_name))
        },
        limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn session(
        status: AssessmentStatus,
        score: Option<f64>,
        company: Option<&str>,
        completion_secs: i64,
    ) -> AssessmentRecord {
        let created = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        AssessmentRecord {
            session_id: Uuid::new_v4(),
            user_email: "lead@example.com".to_string(),
            user_id: None,
            company_name: company.map(str::to_string),
            overall_score: score,
            buyer_score: None,
            status,
            created_at: created,
            updated_at: created + Duration::seconds(completion_secs),
        }
    }

    #[test]
    fn test_completion_scenario() {
        // Statuses [completed, completed, abandoned, linked], scores
        // [80, 60, null, 90] → 4 started, 3 completed, 75% completion,
        // mean score 76.67.
        let records = vec![
            session(AssessmentStatus::Completed, Some(80.0), None, 120),
            session(AssessmentStatus::Completed, Some(60.0), None, 180),
            session(AssessmentStatus::Abandoned, None, None, 0),
            session(AssessmentStatus::Linked, Some(90.0), None, 240),
        ];

        let stats = assessment_stats(&records);
        assert_eq!(stats.total_started, 4);
        assert_eq!(stats.total_completed, 3);
        assert_eq!(stats.total_abandoned, 1);
        assert_eq!(stats.completion_rate, 75.0);
        assert_eq!(stats.avg_overall_score, 76.67);
        assert_eq!(stats.avg_completion_secs, 180.0);
    }

    #[test]
    fn test_non_positive_durations_excluded() {
        let mut backdated = session(AssessmentStatus::Completed, Some(50.0), None, 60);
        backdated.updated_at = backdated.created_at - Duration::seconds(30);
        let records = vec![
            backdated,
            session(AssessmentStatus::Completed, Some(50.0), None, 90),
        ];
        let stats = assessment_stats(&records);
        assert_eq!(stats.avg_completion_secs, 90.0);
    }

    #[test]
    fn test_empty_input_is_all_zeros() {
        let stats = assessment_stats(&[]);
        assert_eq!(stats.total_started, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.avg_overall_score, 0.0);
    }

    #[test]
    fn test_buckets_exhaustive_and_disjoint() {
        // Boundary scores land in exactly one bucket each.
        let scores = [0.0, 20.0, 21.0, 40.0, 41.0, 60.0, 61.0, 80.0, 81.0, 100.0];
        let records: Vec<_> = scores
            .iter()
            .map(|s| session(AssessmentStatus::Completed, Some(*s), None, 60))
            .collect();

        let buckets = score_distribution(&records);
        assert_eq!(buckets.len(), 5);
        let total: u64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, scores.len() as u64);
        for bucket in &buckets {
            assert_eq!(bucket.count, 2);
            assert_eq!(bucket.percentage, 20.0);
        }
    }

    #[test]
    fn test_unscored_sessions_excluded_from_distribution() {
        let records = vec![
            session(AssessmentStatus::Completed, Some(90.0), None, 60),
            session(AssessmentStatus::Abandoned, None, None, 0),
        ];
        let buckets = score_distribution(&records);
        let total: u64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 1);
        assert_eq!(buckets[4].percentage, 100.0);
    }

    #[test]
    fn test_top_companies_ranking() {
        let records = vec![
            session(AssessmentStatus::Completed, Some(80.0), Some("Acme"), 60),
            session(AssessmentStatus::Completed, Some(60.0), Some("Acme"), 60),
            session(AssessmentStatus::Completed, Some(90.0), Some("Globex"), 60),
            session(AssessmentStatus::Completed, None, None, 60),
        ];
        let companies = top_companies(&records, 5);
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].company_name, "Acme");
        assert_eq!(companies[0].assessment_count, 2);
        assert_eq!(companies[0].avg_score, 70.0);
        assert_eq!(companies[1].company_name, "Globex");
    }
}
