//! Uniform response envelope wrapping every aggregator result.
//!
//! A failed aggregation still carries a fully-shaped, zero-valued `data`
//! payload so consumers branch on `success` and never null-check structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TimeRange;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub total_count: u64,
    pub filtered_count: u64,
    pub date_range: String,
    pub generated_at: DateTime<Utc>,
}

impl ResponseMeta {
    pub fn new(total_count: u64, filtered_count: u64, range: &TimeRange) -> Self {
        Self {
            total_count,
            filtered_count,
            date_range: range.label(),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, metadata: ResponseMeta) -> Self {
        Self {
            success: true,
            data,
            metadata: Some(metadata),
            error: None,
        }
    }

    /// Failure envelope carrying a zero-valued payload of the same shape.
    pub fn degraded(data: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            metadata: None,
            error: Some(error.into()),
        }
    }
}
