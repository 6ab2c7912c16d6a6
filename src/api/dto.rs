//! Data Transfer Objects
//!
//! Query parameters and response envelopes for the API endpoints.
//! Report bodies themselves are the view types from `crate::report`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::report::{parse_bound, Bound};
use crate::store::SharpenKind;

// ============================================
// QUERY PARAMETERS
// ============================================

/// `?since=&until=` window bounds
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
}

impl WindowParams {
    /// Parse both bounds; absent or empty values stay `None`
    pub fn bounds(&self) -> ApiResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        Ok((
            optional_bound(self.since.as_deref(), Bound::Start)?,
            optional_bound(self.until.as_deref(), Bound::End)?,
        ))
    }
}

/// `?code=` blade search
#[derive(Debug, Default, Deserialize)]
pub struct BladeSearchParams {
    #[serde(default)]
    pub code: Option<String>,
}

/// `?name=` client search
#[derive(Debug, Default, Deserialize)]
pub struct ClientSearchParams {
    #[serde(default)]
    pub name: Option<String>,
}

/// `?from=&to=&kind=` history search
#[derive(Debug, Default, Deserialize)]
pub struct HistorySearchParams {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl HistorySearchParams {
    pub fn kind(&self) -> ApiResult<Option<SharpenKind>> {
        match non_empty(self.kind.as_deref()) {
            Some(raw) => raw.parse().map(Some).map_err(ApiError::invalid),
            None => Ok(None),
        }
    }
}

/// Parse an optional query bound, treating an empty value as absent
pub fn optional_bound(raw: Option<&str>, bound: Bound) -> ApiResult<Option<DateTime<Utc>>> {
    match non_empty(raw) {
        Some(s) => Ok(Some(parse_bound(s, bound)?)),
        None => Ok(None),
    }
}

/// Parse a numeric path id
pub fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::invalid(format!("{} id must be an integer, got '{}'", what, raw)))
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

// ============================================
// RESPONSES
// ============================================

/// Search results with a count
#[derive(Debug, Serialize)]
pub struct SearchResponse<T: Serialize> {
    pub total: usize,
    pub results: Vec<T>,
}

impl<T: Serialize> From<Vec<T>> for SearchResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            total: results.len(),
            results,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Record store status: "ok" or "error"
    pub store: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// API version
    pub version: String,
}
