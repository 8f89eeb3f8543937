//! Weighted page-transition graph built from reconstructed journeys.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use revlens_core::numeric::safe_average;
use revlens_core::types::BehaviorEvent;

use crate::goals::is_goal_page;
use crate::sequences::actor_sequences;

/// Inter-page deltas above this are treated as a session boundary and
/// excluded from edge timing.
const MAX_TRANSITION_GAP_SECS: i64 = 1800;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationEdge {
    pub from_page: String,
    pub to_page: String,
    pub transitions: u64,
    pub unique_actors: u64,
    pub avg_transition_secs: f64,
    pub conversions: u64,
    pub dropouts: u64,
}

#[derive(Default)]
struct EdgeAcc {
    transitions: u64,
    actors: HashSet<String>,
    delta_sum: f64,
    delta_count: usize,
    conversions: u64,
    dropouts: u64,
}

/// Build the directed transition graph: one edge per consecutive page pair
/// per actor. A journey whose final page is a goal page credits every edge
/// it traversed with a conversion; otherwise every edge takes a dropout.
/// Edges are ranked by transition count descending, truncated to `limit`.
pub fn build_navigation_graph(events: &[BehaviorEvent], limit: usize) -> Vec<NavigationEdge> {
    let sequences = actor_sequences(events);
    let mut edges: HashMap<(String, String), EdgeAcc> = HashMap::new();

    for (actor, steps) in &sequences {
        let converted = steps.last().is_some_and(|s| is_goal_page(&s.page));

        for pair in steps.windows(2) {
            let key = (pair[0].page.clone(), pair[1].page.clone());
            let acc = edges.entry(key).or_default();
            acc.transitions += 1;
            acc.actors.insert(actor.clone());

            let delta = (pair[1].at - pair[0].at).num_seconds();
            if delta > 0 && delta <= MAX_TRANSITION_GAP_SECS {
                acc.delta_sum += delta as f64;
                acc.delta_count += 1;
            }

            if converted {
                acc.conversions += 1;
            } else {
                acc.dropouts += 1;
            }
        }
    }

    let mut rows: Vec<NavigationEdge> = edges
        .into_iter()
        .map(|((from_page, to_page), acc)| NavigationEdge {
            from_page,
            to_page,
            transitions: acc.transitions,
            unique_actors: acc.actors.len() as u64,
            avg_transition_secs: safe_average(acc.delta_sum, acc.delta_count),
            conversions: acc.conversions,
            dropouts: acc.dropouts,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.transitions
            .cmp(&a.transitions)
            .then_with(|| a.from_page.cmp(&b.from_page))
            .then_with(|| a.to_page.cmp(&b.to_page))
    });
    rows.truncate(limit);
    rows
}
