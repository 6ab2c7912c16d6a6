//! Dashboard Routes
//!
//! - GET /api/v1/dashboard-summary - Today, this week, this month, blades needing attention

use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::auth::Caller;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::DashboardSummary;

/// GET /api/v1/dashboard-summary
pub async fn dashboard_summary(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = state.engine.dashboard_summary(Utc::now()).await?;
    Ok(Json(summary))
}
