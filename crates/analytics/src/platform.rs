//! Platform/tool usage aggregates — session totals plus a per-tool rollup
//! over `tool_use` behavior events, cross-referenced against sessions'
//! primary tool for an estimated time-spent figure.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use revlens_core::numeric::{safe_average, safe_number, safe_percentage};
use revlens_core::types::{BehaviorEvent, BehaviorEventType, BehaviorSession};

use crate::rollup::{rank, rollup};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformUsage {
    pub total_sessions: u64,
    pub unique_actors: u64,
    pub avg_session_secs: f64,
    /// Summed time across sessions; absent durations count as zero here
    /// but are excluded from the mean above.
    pub total_duration_secs: f64,
    pub total_events: u64,
    pub total_exports: u64,
    pub tools: Vec<ToolStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStats {
    pub tool_id: String,
    pub uses: u64,
    pub unique_users: u64,
    pub usage_share_pct: f64,
    pub avg_time_spent_secs: f64,
}

#[derive(Default)]
struct ToolAcc {
    uses: u64,
    users: HashSet<String>,
}

/// Aggregate behavior sessions and tool-use events into one usage summary.
/// Absent session durations are excluded from the mean; absent event and
/// export counts are already zero on the record.
pub fn platform_usage(
    sessions: &[BehaviorSession],
    events: &[BehaviorEvent],
    limit: usize,
) -> PlatformUsage {
    let mut actors = HashSet::new();
    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;
    let mut total_duration = 0.0;
    let mut total_events = 0u64;
    let mut total_exports = 0u64;

    // Per-tool dwell estimate: mean duration of sessions anchored to that
    // tool as their primary tool.
    let mut primary_durations: HashMap<&str, (f64, usize)> = HashMap::new();

    for session in sessions {
        actors.insert(session.actor_id.clone());
        total_duration += safe_number(session.duration_secs, 0.0);
        if let Some(secs) = session.duration_secs {
            duration_sum += secs;
            duration_count += 1;
            if let Some(tool) = session.primary_tool.as_deref() {
                let entry = primary_durations.entry(tool).or_insert((0.0, 0));
                entry.0 += secs;
                entry.1 += 1;
            }
        }
        total_events += session.events_count;
        total_exports += session.exports_generated;
    }

    let tool_rows = rollup(
        events,
        |e| match e.event_type {
            BehaviorEventType::ToolUse => e.tool_id.clone(),
            _ => None,
        },
        |acc: &mut ToolAcc, e| {
            acc.uses += 1;
            acc.users.insert(e.actor_id.clone());
        },
        |tool_id, acc| (tool_id, acc),
    );

    let total_uses: u64 = tool_rows.iter().map(|(_, acc)| acc.uses).sum();
    let tools = tool_rows
        .into_iter()
        .map(|(tool_id, acc)| {
            let (sum, count) = primary_durations
                .get(tool_id.as_str())
                .copied()
                .unwrap_or((0.0, 0));
            ToolStats {
                usage_share_pct: safe_percentage(acc.uses as f64, total_uses as f64),
                avg_time_spent_secs: safe_average(sum, count),
                uses: acc.uses,
                unique_users: acc.users.len() as u64,
                tool_id,
            }
        })
        .collect();

    PlatformUsage {
        total_sessions: sessions.len() as u64,
        unique_actors: actors.len() as u64,
        avg_session_secs: safe_average(duration_sum, duration_count),
        total_duration_secs: total_duration,
        total_events,
        total_exports,
        tools: rank(
            tools,
            |a, b| {
                b.uses
                    .cmp(&a.uses)
                    .then_with(|| a.tool_id.cmp(&b.tool_id))
            },
            limit,
        ),
    }
}
