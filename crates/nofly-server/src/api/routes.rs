//! REST API routes.

use axum::{
    extract::{Query, State},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use nofly_core::{
    interchange, CancellationFlag, Ellipsoid, Feature, RouteOptions, RouteRequest, SearchStrategy,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::api::{request_id, zones};
use crate::runner::run_blocking;
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/v1/routes", post(plan_route))
        .route("/v1/zones", post(zones::create_zone))
        .route("/v1/zones", get(zones::list_zones))
        .route("/v1/zones/:id", get(zones::get_zone))
        .route("/v1/zones/:id", delete(zones::delete_zone))
        .route("/v1/zones/:id/route", post(zones::route_through_zone))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    pub ellipsoid: Option<String>,
    pub strategy: Option<SearchStrategy>,
}

/// Ellipsoid named in a request, or the server default.
pub(crate) fn resolve_ellipsoid(
    state: &AppState,
    name: Option<&str>,
) -> Result<Ellipsoid, ApiError> {
    match name {
        Some(name) => Ok(name.parse()?),
        None => Ok(state.config().default_ellipsoid),
    }
}

pub(crate) fn route_options(
    state: &AppState,
    ellipsoid: Ellipsoid,
    strategy: Option<SearchStrategy>,
    cancellation: CancellationFlag,
) -> RouteOptions {
    RouteOptions {
        ellipsoid,
        strategy: strategy.unwrap_or_default(),
        max_vertices: state.config().max_vertices,
        cancellation,
        ..RouteOptions::default()
    }
}

// === Handlers ===

async fn plan_route(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RouteQuery>,
    body: String,
) -> Result<Json<Feature>, ApiError> {
    let request = RouteRequest::from_json(&body)?;
    let ellipsoid = resolve_ellipsoid(&state, query.ellipsoid.as_deref())?;
    let flag = CancellationFlag::new();
    let options = route_options(&state, ellipsoid, query.strategy, flag.clone());

    let path = run_blocking(state.config().route_timeout, flag, move || {
        request.route(&options)
    })
    .await?;

    tracing::info!(
        points = path.points.len(),
        distance_m = path.distance_m,
        direct = path.is_direct(),
        "planned route"
    );
    Ok(Json(interchange::route_feature(&path)))
}
