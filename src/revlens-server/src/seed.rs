//! Demo telemetry generator for local development: a few weeks of visits,
//! assessments, behavior events/sessions, and milestones so every
//! dashboard endpoint has data to aggregate.

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use revlens_core::types::{
    AssessmentRecord, AssessmentStatus, BehaviorEvent, BehaviorEventType, BehaviorSession,
    MilestoneRecord, VisitRecord,
};
use revlens_store::InMemoryStore;

const PAGES: [&str; 8] = [
    "/",
    "/pricing",
    "/features",
    "/assessment",
    "/blog/revenue-playbook",
    "/dashboard",
    "/tools/persona-builder",
    "/icp",
];

const UTM_SOURCES: [&str; 3] = ["google", "linkedin", "newsletter"];
const CTA_TEXTS: [&str; 3] = ["Start Assessment", "Book Demo", "See Pricing"];
const TOOLS: [&str; 3] = ["persona-builder", "icp-generator", "deal-scorer"];
const COMPANIES: [&str; 4] = ["Acme Corp", "Globex", "Initech", "Stark Industries"];

pub fn seed_demo(store: &InMemoryStore) -> usize {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut records = 0usize;

    // Anonymous visit traffic, some of it attributed and converting.
    for i in 0..400 {
        let actor = format!("session-{}", i % 120);
        let signed_in = i % 10 == 0;
        let has_cta = rng.gen_bool(0.4);
        let clicked = has_cta && rng.gen_bool(0.3);
        store.add_visit(VisitRecord {
            id: Uuid::new_v4(),
            actor_id: actor,
            user_id: signed_in.then(|| format!("user-{}", i % 40)),
            page_path: (*PAGES.choose(&mut rng).unwrap()).to_string(),
            time_on_page_secs: rng.gen_bool(0.8).then(|| rng.gen_range(5.0..300.0)),
            scroll_depth_pct: rng.gen_bool(0.7).then(|| rng.gen_range(10.0..100.0)),
            cta_text: has_cta.then(|| (*CTA_TEXTS.choose(&mut rng).unwrap()).to_string()),
            cta_location: has_cta.then(|| "hero".to_string()),
            clicked_cta: clicked,
            converted: clicked && rng.gen_bool(0.25),
            utm_source: rng
                .gen_bool(0.5)
                .then(|| (*UTM_SOURCES.choose(&mut rng).unwrap()).to_string()),
            utm_medium: Some("cpc".to_string()),
            utm_campaign: Some("q3-launch".to_string()),
            created_at: now - Duration::minutes(rng.gen_range(0..40_000)),
        });
        records += 1;
    }

    // Assessment sessions across the status lifecycle.
    let statuses = [
        AssessmentStatus::Completed,
        AssessmentStatus::Completed,
        AssessmentStatus::CompletedAwaitingSignup,
        AssessmentStatus::Linked,
        AssessmentStatus::Abandoned,
        AssessmentStatus::InProgress,
    ];
    for i in 0..60 {
        let status = *statuses.choose(&mut rng).unwrap();
        let created = now - Duration::minutes(rng.gen_range(0..40_000));
        store.add_assessment(AssessmentRecord {
            session_id: Uuid::new_v4(),
            user_email: format!("lead{}@example.com", i),
            user_id: (status == AssessmentStatus::Linked).then(|| format!("user-{}", i % 40)),
            company_name: rng
                .gen_bool(0.7)
                .then(|| (*COMPANIES.choose(&mut rng).unwrap()).to_string()),
            overall_score: status
                .is_completed()
                .then(|| rng.gen_range(10.0..100.0)),
            buyer_score: status.is_completed().then(|| rng.gen_range(10.0..100.0)),
            status,
            created_at: created,
            updated_at: created + Duration::seconds(rng.gen_range(60..1200)),
        });
        records += 1;
    }

    // Authenticated product usage: navigation trails and tool events.
    for i in 0..40 {
        let actor = format!("user-{}", i);
        let mut at = now - Duration::minutes(rng.gen_range(0..40_000));
        let hops = rng.gen_range(2..6);
        for _ in 0..hops {
            store.add_event(BehaviorEvent {
                id: Uuid::new_v4(),
                actor_id: actor.clone(),
                event_type: BehaviorEventType::Navigation,
                tool_id: None,
                page_path: Some((*PAGES.choose(&mut rng).unwrap()).to_string()),
                metadata: Default::default(),
                created_at: at,
            });
            at += Duration::seconds(rng.gen_range(10..600));
            records += 1;
        }
        for _ in 0..rng.gen_range(0..4) {
            store.add_event(BehaviorEvent {
                id: Uuid::new_v4(),
                actor_id: actor.clone(),
                event_type: BehaviorEventType::ToolUse,
                tool_id: Some((*TOOLS.choose(&mut rng).unwrap()).to_string()),
                page_path: None,
                metadata: Default::default(),
                created_at: at,
            });
            records += 1;
        }
        store.add_session(BehaviorSession {
            id: Uuid::new_v4(),
            actor_id: actor.clone(),
            duration_secs: rng.gen_bool(0.9).then(|| rng.gen_range(120.0..3600.0)),
            events_count: hops as u64,
            exports_generated: rng.gen_range(0..3),
            primary_tool: rng
                .gen_bool(0.6)
                .then(|| (*TOOLS.choose(&mut rng).unwrap()).to_string()),
            created_at: now - Duration::minutes(rng.gen_range(0..40_000)),
        });
        records += 1;
    }

    // A handful of founding members for the payment stage.
    for i in 0..8 {
        store.add_milestone(MilestoneRecord {
            id: Uuid::new_v4(),
            actor_id: format!("user-{}", i * 5),
            is_founding_member: true,
            created_at: now - Duration::minutes(rng.gen_range(0..20_000)),
        });
        records += 1;
    }

    records
}
