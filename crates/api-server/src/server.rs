//! API server — wires the aggregator services into the HTTP router and
//! starts the metrics exporter.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use revlens_analytics::AnalyticsService;
use revlens_core::config::AppConfig;
use revlens_funnel::FunnelService;
use revlens_journey::JourneyService;
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    analytics: AnalyticsService,
    journey: JourneyService,
    funnel: FunnelService,
}

impl ApiServer {
    pub fn new(
        config: AppConfig,
        analytics: AnalyticsService,
        journey: JourneyService,
        funnel: FunnelService,
    ) -> Self {
        Self {
            config,
            analytics,
            journey,
            funnel,
        }
    }

    /// Start the HTTP REST server (blocks until shutdown).
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            analytics: self.analytics.clone(),
            journey: self.journey.clone(),
            funnel: self.funnel.clone(),
            defaults: self.config.analytics.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        };

        let app = Router::new()
            // Aggregator endpoints
            .route("/v1/analytics/pages", get(rest::page_performance))
            .route("/v1/analytics/ctas", get(rest::cta_performance))
            .route("/v1/analytics/utm", get(rest::utm_attribution))
            .route("/v1/analytics/assessments", get(rest::assessment_overview))
            .route("/v1/analytics/scores", get(rest::score_distribution))
            .route("/v1/analytics/companies", get(rest::top_companies))
            .route("/v1/analytics/platform", get(rest::platform_usage))
            .route("/v1/journeys/navigation", get(rest::navigation_graph))
            .route("/v1/journeys/patterns", get(rest::journey_patterns))
            .route("/v1/funnel", get(rest::acquisition_funnel))
            .route("/v1/dashboard", get(rest::dashboard))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the handle alive
        std::mem::forget(handle);
        Ok(())
    }
}
