//! Statistics Routes
//!
//! - GET /api/v1/statistics?since=&until= - Aggregate statistics (managers only)
//!
//! Without `since` the window is the calendar month before `until`; without
//! `until` it ends now.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::auth::Caller;
use crate::api::dto::WindowParams;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::{ReportWindow, Statistics};

/// GET /api/v1/statistics
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<Statistics>> {
    caller.require_manager()?;

    let window = ReportWindow::resolve(
        params.since.as_deref().filter(|s| !s.trim().is_empty()),
        params.until.as_deref().filter(|s| !s.trim().is_empty()),
        Utc::now(),
    )?;

    tracing::info!(
        operator_id = caller.operator().id,
        since = %window.since,
        until = %window.until,
        "Statistics requested"
    );

    Ok(Json(state.engine.statistics(window).await?))
}
