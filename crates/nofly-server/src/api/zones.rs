//! Zone registry endpoints.
//!
//! Zones posted here are validated and buffered once; routes against them
//! skip the preprocessing step.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use nofly_core::{
    interchange, plan_with_zones, preprocess, CancellationFlag, Feature, Position, SearchStrategy,
    ZoneGeometry,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::routes::{resolve_ellipsoid, route_options};
use crate::runner::run_blocking;
use crate::state::{AppState, StoredZone, ZoneSummary};

#[derive(Debug, Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub geometry: ZoneGeometry,
    pub buffer_m: Option<f64>,
    pub ellipsoid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ZoneRouteRequest {
    pub start: Position,
    pub finish: Position,
    pub strategy: Option<SearchStrategy>,
}

/// Preprocess and store a zone.
pub async fn create_zone(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<(StatusCode, Json<ZoneSummary>), ApiError> {
    let req: CreateZoneRequest = serde_json::from_str(&body)?;
    let ellipsoid = resolve_ellipsoid(&state, req.ellipsoid.as_deref())?;
    let geometry = req.geometry.clone();
    let buffer_m = req.buffer_m;
    let zones = run_blocking(state.config().route_timeout, CancellationFlag::new(), move || {
        preprocess(&geometry, buffer_m, ellipsoid)
    })
    .await?;

    let zone = state.add_zone(StoredZone {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        geometry: req.geometry,
        buffer_m: req.buffer_m,
        ellipsoid,
        zones,
        created_at: Utc::now(),
    });
    tracing::info!("Created zone '{}' ({})", zone.name, zone.id);

    Ok((StatusCode::CREATED, Json(zone.summary())))
}

pub async fn list_zones(State(state): State<Arc<AppState>>) -> Json<Vec<ZoneSummary>> {
    Json(state.list_zones())
}

pub async fn get_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ZoneSummary>, ApiError> {
    state
        .get_zone(&id)
        .map(|zone| Json(zone.summary()))
        .ok_or(ApiError::ZoneNotFound(id))
}

pub async fn delete_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.remove_zone(&id) {
        tracing::info!("Deleted zone {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::ZoneNotFound(id))
    }
}

/// Route between two points around a stored zone.
pub async fn route_through_zone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<Feature>, ApiError> {
    let req: ZoneRouteRequest = serde_json::from_str(&body)?;
    let zone = state.get_zone(&id).ok_or(ApiError::ZoneNotFound(id))?;
    let flag = CancellationFlag::new();
    let options = route_options(&state, zone.ellipsoid, req.strategy, flag.clone());

    let path = run_blocking(state.config().route_timeout, flag, move || {
        plan_with_zones(req.start, req.finish, &zone.zones, &options)
    })
    .await?;

    Ok(Json(interchange::route_feature(&path)))
}
