//! REST API handlers for the analytics aggregators and operational
//! endpoints. Aggregator failures surface as `success=false` envelopes
//! with HTTP 200; only malformed requests produce a 400.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

use revlens_analytics::{
    AnalyticsService, AssessmentStats, CompanyStats, CtaStats, PageStats, PlatformUsage,
    ScoreBucket, UtmStats,
};
use revlens_core::config::AnalyticsConfig;
use revlens_core::response::Envelope;
use revlens_core::types::{RangePreset, TimeRange};
use revlens_funnel::{FunnelReport, FunnelService};
use revlens_journey::{JourneyPattern, JourneyService, NavigationEdge};

/// Upper bound on caller-supplied top-N truncation.
const MAX_LIMIT: usize = 100;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub analytics: AnalyticsService,
    pub journey: JourneyService,
    pub funnel: FunnelService,
    pub defaults: AnalyticsConfig,
    pub node_id: String,
    pub start_time: Instant,
}

/// Time-range selection shared by every aggregator endpoint: either an
/// explicit `[start, end]` pair or a named preset, defaulting to the last
/// 30 days.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub preset: Option<RangePreset>,
    pub limit: Option<usize>,
    pub min_occurrences: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type BadRequest = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> BadRequest {
    let message = message.into();
    warn!(error = %message, "Rejected aggregator request");
    metrics::counter!("api.validation_errors").increment(1);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_range".to_string(),
            message,
        }),
    )
}

fn resolve_range(query: &RangeQuery) -> Result<TimeRange, BadRequest> {
    match (query.start, query.end) {
        (Some(start), Some(end)) => {
            TimeRange::new(start, end).map_err(|e| bad_request(e.to_string()))
        }
        (None, None) => Ok(TimeRange::from_preset(
            query.preset.unwrap_or(RangePreset::Last30Days),
            Utc::now(),
        )),
        _ => Err(bad_request(
            "both 'start' and 'end' are required when either is given",
        )),
    }
}

fn resolve_limit(query: &RangeQuery, defaults: &AnalyticsConfig) -> usize {
    query.limit.unwrap_or(defaults.default_limit).min(MAX_LIMIT)
}

/// GET /v1/analytics/pages
pub async fn page_performance(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<PageStats>>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    Ok(Json(state.analytics.page_performance(range, limit).await))
}

/// GET /v1/analytics/ctas
pub async fn cta_performance(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<CtaStats>>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    Ok(Json(state.analytics.cta_performance(range, limit).await))
}

/// GET /v1/analytics/utm
pub async fn utm_attribution(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<UtmStats>>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    Ok(Json(state.analytics.utm_attribution(range, limit).await))
}

/// GET /v1/analytics/assessments
pub async fn assessment_overview(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<AssessmentStats>>, BadRequest> {
    let range = resolve_range(&query)?;
    Ok(Json(state.analytics.assessment_overview(range).await))
}

/// GET /v1/analytics/scores
pub async fn score_distribution(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<ScoreBucket>>>, BadRequest> {
    let range = resolve_range(&query)?;
    Ok(Json(state.analytics.score_distribution(range).await))
}

/// GET /v1/analytics/companies
pub async fn top_companies(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<CompanyStats>>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    Ok(Json(state.analytics.top_companies(range, limit).await))
}

/// GET /v1/analytics/platform
pub async fn platform_usage(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<PlatformUsage>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    Ok(Json(state.analytics.platform_usage(range, limit).await))
}

/// GET /v1/journeys/navigation
pub async fn navigation_graph(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<NavigationEdge>>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    Ok(Json(state.journey.navigation_graph(range, limit).await))
}

/// GET /v1/journeys/patterns
pub async fn journey_patterns(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<Vec<JourneyPattern>>>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    let min_occurrences = query
        .min_occurrences
        .unwrap_or(state.defaults.default_min_occurrences)
        .max(1);
    Ok(Json(
        state
            .journey
            .journey_patterns(range, min_occurrences, limit)
            .await,
    ))
}

/// GET /v1/funnel
pub async fn acquisition_funnel(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Envelope<FunnelReport>>, BadRequest> {
    let range = resolve_range(&query)?;
    Ok(Json(state.funnel.acquisition_funnel(range).await))
}

/// Full dashboard view: every aggregator computed concurrently. Each
/// envelope fails in isolation; siblings are unaffected.
#[derive(Serialize)]
pub struct DashboardOverview {
    pub pages: Envelope<Vec<PageStats>>,
    pub ctas: Envelope<Vec<CtaStats>>,
    pub utm: Envelope<Vec<UtmStats>>,
    pub assessments: Envelope<AssessmentStats>,
    pub scores: Envelope<Vec<ScoreBucket>>,
    pub companies: Envelope<Vec<CompanyStats>>,
    pub platform: Envelope<PlatformUsage>,
    pub navigation: Envelope<Vec<NavigationEdge>>,
    pub patterns: Envelope<Vec<JourneyPattern>>,
    pub funnel: Envelope<FunnelReport>,
}

/// GET /v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardOverview>, BadRequest> {
    let range = resolve_range(&query)?;
    let limit = resolve_limit(&query, &state.defaults);
    let min_occurrences = query
        .min_occurrences
        .unwrap_or(state.defaults.default_min_occurrences)
        .max(1);

    metrics::counter!("api.dashboard_requests").increment(1);

    let (pages, ctas, utm, assessments, scores, companies, platform, navigation, patterns, funnel) = tokio::join!(
        state.analytics.page_performance(range, limit),
        state.analytics.cta_performance(range, limit),
        state.analytics.utm_attribution(range, limit),
        state.analytics.assessment_overview(range),
        state.analytics.score_distribution(range),
        state.analytics.top_companies(range, limit),
        state.analytics.platform_usage(range, limit),
        state.journey.navigation_graph(range, limit),
        state.journey.journey_patterns(range, min_occurrences, limit),
        state.funnel.acquisition_funnel(range),
    );

    Ok(Json(DashboardOverview {
        pages,
        ctas,
        utm,
        assessments,
        scores,
        companies,
        platform,
        navigation,
        patterns,
        funnel,
    }))
}

// ─── Operational Endpoints ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.start_time.elapsed().as_secs() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
