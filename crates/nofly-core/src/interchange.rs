//! GeoJSON request and response documents.
//!
//! A request is a `FeatureCollection` whose features are told apart by their
//! `properties.name`: `start_point` and `finish_point` (Point, required) and
//! `restricted_polygons` (Polygon or MultiPolygon, optional, with an optional
//! `buffer_distance` property in metres). The response is a single
//! `LineString` feature named `optimal_route`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::RouteOptions;
use crate::error::RouteError;
use crate::models::{PolygonRings, Position, RoutePath, ZoneGeometry};
use crate::planner;

pub const START_POINT: &str = "start_point";
pub const FINISH_POINT: &str = "finish_point";
pub const RESTRICTED_POLYGONS: &str = "restricted_polygons";
pub const OPTIMAL_ROUTE: &str = "optimal_route";
pub const BUFFER_DISTANCE: &str = "buffer_distance";

#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("malformed GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature collection must contain a '{0}' feature")]
    MissingFeature(&'static str),

    #[error("feature '{feature}' must have {expected} geometry, got {found}")]
    UnexpectedGeometry {
        feature: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid {kind}: {reason}")]
    InvalidGeometry {
        kind: &'static str,
        reason: String,
    },

    #[error("invalid bbox: {0}")]
    InvalidBBox(String),

    #[error("'buffer_distance' must be a number of metres, got {0}")]
    InvalidBufferDistance(Value),
}

/// `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub fn validate(&self) -> Result<(), InterchangeError> {
        if self.min_lat > self.max_lat {
            return Err(InterchangeError::InvalidBBox(format!(
                "min latitude {} is greater than max latitude {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon > self.max_lon {
            return Err(InterchangeError::InvalidBBox(format!(
                "min longitude {} is greater than max longitude {}",
                self.min_lon, self.max_lon
            )));
        }
        Ok(())
    }
}

impl From<[f64; 4]> for BBox {
    fn from([min_lon, min_lat, max_lon, max_lat]: [f64; 4]) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }
}

impl From<BBox> for [f64; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: PolygonRings },
    MultiPolygon { coordinates: Vec<PolygonRings> },
    GeometryCollection { geometries: Vec<Geometry> },
}

const MIN_LINE_POSITIONS: usize = 2;

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "Point",
            Self::MultiPoint { .. } => "MultiPoint",
            Self::LineString { .. } => "LineString",
            Self::MultiLineString { .. } => "MultiLineString",
            Self::Polygon { .. } => "Polygon",
            Self::MultiPolygon { .. } => "MultiPolygon",
            Self::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    /// Structural checks serde cannot express: line strings need two
    /// positions. Ring shape is checked when zones are normalized.
    pub fn validate(&self) -> Result<(), InterchangeError> {
        let short_line = |line: &Vec<Position>| line.len() < MIN_LINE_POSITIONS;
        match self {
            Self::LineString { coordinates } if short_line(coordinates) => {
                Err(InterchangeError::InvalidGeometry {
                    kind: self.kind(),
                    reason: format!(
                        "{} positions, at least {MIN_LINE_POSITIONS} required",
                        coordinates.len()
                    ),
                })
            }
            Self::MultiLineString { coordinates } => {
                let Some(index) = coordinates.iter().position(short_line) else {
                    return Ok(());
                };
                Err(InterchangeError::InvalidGeometry {
                    kind: self.kind(),
                    reason: format!(
                        "line {index} has {} positions, at least {MIN_LINE_POSITIONS} required",
                        coordinates[index].len()
                    ),
                })
            }
            Self::GeometryCollection { geometries } => {
                geometries.iter().try_for_each(Geometry::validate)
            }
            _ => Ok(()),
        }
    }
}

impl From<ZoneGeometry> for Geometry {
    fn from(zone: ZoneGeometry) -> Self {
        match zone {
            ZoneGeometry::Polygon(coordinates) => Self::Polygon { coordinates },
            ZoneGeometry::MultiPolygon(coordinates) => Self::MultiPolygon { coordinates },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            kind: FeatureType::Feature,
            id: None,
            bbox: None,
            properties,
            geometry,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            bbox: None,
            features,
        }
    }

    /// Last feature carrying `properties.name == name`.
    pub fn named(&self, name: &str) -> Option<&Feature> {
        self.features.iter().rev().find(|feature| feature.name() == Some(name))
    }
}

/// Typed routing inputs pulled out of a request collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: Position,
    pub finish: Position,
    pub zones: Option<ZoneGeometry>,
    pub buffer_distance_m: Option<f64>,
}

impl RouteRequest {
    pub fn from_json(json: &str) -> Result<Self, InterchangeError> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        Self::from_collection(&collection)
    }

    pub fn from_collection(collection: &FeatureCollection) -> Result<Self, InterchangeError> {
        validate_bboxes(collection)?;
        collection
            .features
            .iter()
            .try_for_each(|feature| feature.geometry.validate())?;

        let start = point_of(collection, START_POINT)?;
        let finish = point_of(collection, FINISH_POINT)?;
        let (zones, buffer_distance_m) = match collection.named(RESTRICTED_POLYGONS) {
            Some(feature) => (Some(zones_of(feature)?), buffer_of(feature)?),
            None => (None, None),
        };

        Ok(Self {
            start,
            finish,
            zones,
            buffer_distance_m,
        })
    }

    /// Run the planner on these inputs.
    pub fn route(&self, options: &RouteOptions) -> Result<RoutePath, RouteError> {
        planner::find_route(
            self.start,
            self.finish,
            self.zones.as_ref(),
            self.buffer_distance_m,
            options,
        )
    }
}

fn validate_bboxes(collection: &FeatureCollection) -> Result<(), InterchangeError> {
    collection
        .bbox
        .iter()
        .chain(collection.features.iter().filter_map(|f| f.bbox.as_ref()))
        .try_for_each(BBox::validate)
}

fn point_of(
    collection: &FeatureCollection,
    name: &'static str,
) -> Result<Position, InterchangeError> {
    let feature = collection
        .named(name)
        .ok_or(InterchangeError::MissingFeature(name))?;
    match &feature.geometry {
        Geometry::Point { coordinates } => Ok(*coordinates),
        other => Err(InterchangeError::UnexpectedGeometry {
            feature: name,
            expected: "Point",
            found: other.kind(),
        }),
    }
}

fn zones_of(feature: &Feature) -> Result<ZoneGeometry, InterchangeError> {
    match &feature.geometry {
        Geometry::Polygon { coordinates } => Ok(ZoneGeometry::Polygon(coordinates.clone())),
        Geometry::MultiPolygon { coordinates } => {
            Ok(ZoneGeometry::MultiPolygon(coordinates.clone()))
        }
        other => Err(InterchangeError::UnexpectedGeometry {
            feature: RESTRICTED_POLYGONS,
            expected: "Polygon or MultiPolygon",
            found: other.kind(),
        }),
    }
}

fn buffer_of(feature: &Feature) -> Result<Option<f64>, InterchangeError> {
    match feature.properties.get(BUFFER_DISTANCE) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| InterchangeError::InvalidBufferDistance(value.clone())),
    }
}

/// Response feature for a computed route.
pub fn route_feature(path: &RoutePath) -> Feature {
    let mut properties = Map::new();
    properties.insert("name".to_string(), Value::from(OPTIMAL_ROUTE));
    properties.insert("distance_m".to_string(), Value::from(path.distance_m));
    properties.insert("direct".to_string(), Value::from(path.is_direct()));
    Feature::new(
        Geometry::LineString {
            coordinates: path.points.clone(),
        },
        properties,
    )
}
