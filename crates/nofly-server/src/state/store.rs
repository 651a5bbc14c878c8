//! In-memory registry of preprocessed zones using DashMap.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nofly_core::{Ellipsoid, ForbiddenZones, ZoneGeometry};
use serde::Serialize;

use crate::config::Config;

/// A zone validated and buffered once, then reused for many routes.
#[derive(Debug)]
pub struct StoredZone {
    pub id: String,
    pub name: String,
    pub geometry: ZoneGeometry,
    pub buffer_m: Option<f64>,
    pub ellipsoid: Ellipsoid,
    pub zones: ForbiddenZones,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneSummary {
    pub id: String,
    pub name: String,
    pub buffer_m: Option<f64>,
    pub ellipsoid: Ellipsoid,
    pub polygons: usize,
    pub vertices: usize,
    pub created_at: DateTime<Utc>,
}

impl StoredZone {
    pub fn summary(&self) -> ZoneSummary {
        ZoneSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            buffer_m: self.buffer_m,
            ellipsoid: self.ellipsoid,
            polygons: self.zones.len(),
            vertices: self.zones.exterior_vertex_count(),
            created_at: self.created_at,
        }
    }
}

/// Application state shared by all handlers.
pub struct AppState {
    config: Config,
    zones: DashMap<String, Arc<StoredZone>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            zones: DashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn add_zone(&self, zone: StoredZone) -> Arc<StoredZone> {
        let zone = Arc::new(zone);
        self.zones.insert(zone.id.clone(), zone.clone());
        zone
    }

    pub fn get_zone(&self, id: &str) -> Option<Arc<StoredZone>> {
        self.zones.get(id).map(|entry| entry.value().clone())
    }

    /// All zones, oldest first.
    pub fn list_zones(&self) -> Vec<ZoneSummary> {
        let mut zones: Vec<ZoneSummary> = self
            .zones
            .iter()
            .map(|entry| entry.value().summary())
            .collect();
        zones.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        zones
    }

    pub fn remove_zone(&self, id: &str) -> bool {
        self.zones.remove(id).is_some()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}
