//! Report Routes
//!
//! - GET /api/v1/report/blade/:id - Blade with full history
//! - GET /api/v1/report/client/:id - Client with active blades and histories
//! - GET /api/v1/report/client/:id/blades - Client blades with freshness status

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::auth::Caller;
use crate::api::dto::{parse_id, WindowParams};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::{BladeReport, ClientBladesView, ClientReport};

/// GET /api/v1/report/blade/:id
pub async fn blade_report(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<BladeReport>> {
    let id = parse_id(&id, "Blade")?;
    Ok(Json(state.engine.blade_report(id).await?))
}

/// GET /api/v1/report/client/:id
pub async fn client_report(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<ClientReport>> {
    let id = parse_id(&id, "Client")?;
    Ok(Json(state.engine.client_report(id).await?))
}

/// GET /api/v1/report/client/:id/blades
///
/// Optional `since`/`until` bound the blades' last sharpening date.
pub async fn client_blades(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<Json<ClientBladesView>> {
    let id = parse_id(&id, "Client")?;
    let (since, until) = params.bounds()?;

    let view = state
        .engine
        .client_blades(id, since, until, Utc::now())
        .await?;
    Ok(Json(view))
}
