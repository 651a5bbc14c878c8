//! Core data models for the routing system.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// A geographic position in decimal degrees.
///
/// Serialized as a `[lon, lat]` pair. Equality is exact coordinate equality,
/// which is what vertex deduplication relies on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Reject NaN/infinite values and anything outside the lon/lat range.
    pub fn validate(&self) -> Result<()> {
        let finite = self.lon.is_finite() && self.lat.is_finite();
        if !finite || self.lon.abs() > 180.0 || self.lat.abs() > 90.0 {
            return Err(RouteError::InvalidPosition {
                lon: self.lon,
                lat: self.lat,
            });
        }
        Ok(())
    }
}

impl From<[f64; 2]> for Position {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.lon, position.lat]
    }
}

impl From<Position> for Coord<f64> {
    fn from(position: Position) -> Self {
        Coord {
            x: position.lon,
            y: position.lat,
        }
    }
}

impl From<Coord<f64>> for Position {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lon: coord.x,
            lat: coord.y,
        }
    }
}

/// Closed ring of positions; first and last must be identical.
pub type Ring = Vec<Position>;

/// Exterior ring followed by zero or more holes.
pub type PolygonRings = Vec<Ring>;

/// Forbidden-region input geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum ZoneGeometry {
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
}

impl ZoneGeometry {
    /// Number of polygons described by the geometry.
    pub fn polygon_count(&self) -> usize {
        match self {
            Self::Polygon(_) => 1,
            Self::MultiPolygon(polygons) => polygons.len(),
        }
    }
}

/// How a route was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Straight geodesic from start to finish.
    Direct,
    /// Path around the forbidden zones through boundary vertices.
    Detour,
}

/// An ordered start-to-finish path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<Position>,
    /// Cumulative geodesic length in metres.
    pub distance_m: f64,
    pub kind: RouteKind,
}

impl RoutePath {
    pub fn start(&self) -> Option<Position> {
        self.points.first().copied()
    }

    pub fn finish(&self) -> Option<Position> {
        self.points.last().copied()
    }

    pub fn is_direct(&self) -> bool {
        self.kind == RouteKind::Direct
    }

    /// Consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serializes_as_lon_lat_pair() {
        let json = serde_json::to_string(&Position::new(10.5, -3.25)).unwrap();
        assert_eq!(json, "[10.5,-3.25]");
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Position::new(10.5, -3.25));
    }

    #[test]
    fn position_validation_rejects_out_of_range() {
        assert!(Position::new(0.0, 0.0).validate().is_ok());
        assert!(Position::new(180.0, -90.0).validate().is_ok());
        assert!(Position::new(180.1, 0.0).validate().is_err());
        assert!(Position::new(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn zone_geometry_uses_geojson_shape() {
        let json = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#;
        let geometry: ZoneGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.polygon_count(), 1);
        match geometry {
            ZoneGeometry::Polygon(rings) => assert_eq!(rings[0].len(), 4),
            ZoneGeometry::MultiPolygon(_) => panic!("expected polygon"),
        }
    }

    #[test]
    fn route_segments_pair_consecutive_points() {
        let path = RoutePath {
            points: vec![
                Position::new(0.0, 0.0),
                Position::new(1.0, 1.0),
                Position::new(2.0, 0.0),
            ],
            distance_m: 0.0,
            kind: RouteKind::Detour,
        };
        let segments: Vec<_> = path.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].1, Position::new(2.0, 0.0));
        assert!(!path.is_direct());
    }
}
