//! Grouping/rollup aggregators — reduce raw telemetry record streams to
//! ranked summary rows. Every aggregate is a pure function of its input
//! slice, recomputed fresh per call; nothing here persists state.

pub mod assessment;
pub mod cta;
pub mod pages;
pub mod platform;
pub mod rollup;
pub mod service;
pub mod utm;

pub use assessment::{
    assessment_stats, score_distribution, top_companies, AssessmentStats, CompanyStats,
    ScoreBucket,
};
pub use cta::{aggregate_ctas, CtaStats};
pub use pages::{aggregate_pages, PageStats};
pub use platform::{platform_usage, PlatformUsage, ToolStats};
pub use service::AnalyticsService;
pub use utm::{aggregate_utm, UtmStats};
