//! Search Routes
//!
//! - GET /api/v1/search/blades?code= - Active blades by code fragment
//! - GET /api/v1/search/clients?name= - Clients by name fragment
//! - GET /api/v1/search/history?from=&to=&kind= - Sharpening history

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::auth::Caller;
use crate::api::dto::{
    optional_bound, BladeSearchParams, ClientSearchParams, HistorySearchParams, SearchResponse,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::report::{BladeSummary, Bound, HistorySearchHit};
use crate::store::Client;

/// GET /api/v1/search/blades
pub async fn search_blades(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Query(params): Query<BladeSearchParams>,
) -> ApiResult<Json<SearchResponse<BladeSummary>>> {
    let blades = state.engine.search_blades(params.code.as_deref()).await?;
    Ok(Json(blades.into()))
}

/// GET /api/v1/search/clients
pub async fn search_clients(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Query(params): Query<ClientSearchParams>,
) -> ApiResult<Json<SearchResponse<Client>>> {
    let clients = state.engine.search_clients(params.name.as_deref()).await?;
    Ok(Json(clients.into()))
}

/// GET /api/v1/search/history
pub async fn search_history(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Query(params): Query<HistorySearchParams>,
) -> ApiResult<Json<SearchResponse<HistorySearchHit>>> {
    let from = optional_bound(params.from.as_deref(), Bound::Start)?;
    let to = optional_bound(params.to.as_deref(), Bound::End)?;
    let kind = params.kind()?;

    let hits = state.engine.search_history(from, to, kind).await?;
    Ok(Json(hits.into()))
}
