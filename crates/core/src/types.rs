use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

// ─── Time Ranges ────────────────────────────────────────────────────────

/// Inclusive analysis window applied to every store read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Named shortcuts for common dashboard windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    Today,
    Last7Days,
    Last30Days,
    Last90Days,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> EngineResult<Self> {
        if end < start {
            return Err(EngineError::Validation(format!(
                "time range end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Resolve a preset against the supplied clock.
    pub fn from_preset(preset: RangePreset, now: DateTime<Utc>) -> Self {
        let start = match preset {
            RangePreset::Today => now - Duration::days(1),
            RangePreset::Last7Days => now - Duration::days(7),
            RangePreset::Last30Days => now - Duration::days(30),
            RangePreset::Last90Days => now - Duration::days(90),
        };
        Self { start, end: now }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Render as an ISO interval for response metadata.
    pub fn label(&self) -> String {
        format!("{}/{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

// ─── Visit Records ──────────────────────────────────────────────────────

/// One page view by an anonymous or authenticated actor. `user_id` is
/// recorded opportunistically when the visitor is already signed in; it is
/// the only bridge between visit rows and milestone rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    pub id: Uuid,
    pub actor_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub page_path: String,
    #[serde(default)]
    pub time_on_page_secs: Option<f64>,
    #[serde(default)]
    pub scroll_depth_pct: Option<f64>,
    #[serde(default)]
    pub cta_text: Option<String>,
    #[serde(default)]
    pub cta_location: Option<String>,
    #[serde(default)]
    pub clicked_cta: bool,
    #[serde(default)]
    pub converted: bool,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ─── Assessment Records ─────────────────────────────────────────────────

/// One completion attempt of the lead-scoring questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub session_id: Uuid,
    pub user_email: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub buyer_score: Option<f64>,
    pub status: AssessmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Started,
    InProgress,
    Completed,
    CompletedAwaitingSignup,
    Linked,
    Abandoned,
}

impl AssessmentStatus {
    /// Statuses counted as a finished assessment. `Linked` means the
    /// session was later claimed by an authenticated account.
    pub fn is_completed(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedAwaitingSignup | Self::Linked
        )
    }
}

// ─── Behavior Records ───────────────────────────────────────────────────

/// One in-product action by an authenticated actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub id: Uuid,
    pub actor_id: String,
    pub event_type: BehaviorEventType,
    #[serde(default)]
    pub tool_id: Option<String>,
    #[serde(default)]
    pub page_path: Option<String>,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorEventType {
    Navigation,
    Action,
    Export,
    ToolUse,
    ContentInteraction,
}

/// One authenticated usage session. Absent duration/export counts are
/// treated as zero in sums, never null-propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSession {
    pub id: Uuid,
    pub actor_id: String,
    #[serde(default)]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub events_count: u64,
    #[serde(default)]
    pub exports_generated: u64,
    #[serde(default)]
    pub primary_tool: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ─── Milestone Records ──────────────────────────────────────────────────

/// Durable achievement flag; `is_founding_member` is the proxy for the
/// payment stage of the acquisition funnel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub id: Uuid,
    pub actor_id: String,
    pub is_founding_member: bool,
    pub created_at: DateTime<Utc>,
}
