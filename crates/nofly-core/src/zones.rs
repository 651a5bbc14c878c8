//! Forbidden-zone preprocessing and the geometric predicates shared by the
//! fast path and the visibility graph.

use geo::algorithm::buffer::{BufferStyle, LineJoin};
use geo::algorithm::coordinate_position::{CoordPos, CoordinatePosition};
use geo::algorithm::dimensions::Dimensions;
use geo::{
    BoundingRect, Buffer, Centroid, Coord, Intersects, Line, LineString, MultiPolygon, Polygon,
    Rect, Relate, Validation,
};
use tracing::debug;

use crate::error::{Result, RouteError};
use crate::geodesic::Ellipsoid;
use crate::models::{PolygonRings, Position, Ring, ZoneGeometry};
use crate::projection::AzimuthalEquidistant;

/// Mitre length limit, as a multiple of the buffer distance.
pub const MITRE_RATIO: f64 = 5.0;

/// Smallest corner angle, in radians, that is still mitred instead of
/// bevelled. A corner of angle `a` has mitre ratio `1 / sin(a / 2)`.
pub fn mitre_min_angle() -> f64 {
    2.0 * (1.0 / MITRE_RATIO).asin()
}

const MIN_RING_POSITIONS: usize = 4;

/// Wrap the input into a multipolygon, checking ring shape on the way.
///
/// Closure is checked on the raw rings because the geometry library closes
/// open rings silently.
pub fn normalize(geometry: &ZoneGeometry) -> Result<MultiPolygon<f64>> {
    match geometry {
        ZoneGeometry::Polygon(rings) => Ok(MultiPolygon::new(vec![build_polygon(0, rings)?])),
        ZoneGeometry::MultiPolygon(polygons) => polygons
            .iter()
            .enumerate()
            .map(|(index, rings)| build_polygon(index, rings))
            .collect::<Result<Vec<_>>>()
            .map(MultiPolygon::new),
    }
}

fn build_polygon(index: usize, rings: &PolygonRings) -> Result<Polygon<f64>> {
    let Some((exterior, holes)) = rings.split_first() else {
        return Err(RouteError::GeometryInvalid(format!(
            "polygon {index} has no exterior ring"
        )));
    };
    let exterior = build_ring(index, 0, exterior)?;
    let holes = holes
        .iter()
        .enumerate()
        .map(|(ring, hole)| build_ring(index, ring + 1, hole))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, holes))
}

fn build_ring(polygon: usize, ring: usize, positions: &Ring) -> Result<LineString<f64>> {
    if positions.len() < MIN_RING_POSITIONS {
        return Err(RouteError::GeometryInvalid(format!(
            "polygon {polygon} ring {ring} has {} positions, a closed ring needs at least {MIN_RING_POSITIONS}",
            positions.len()
        )));
    }
    if let Some(bad) = positions
        .iter()
        .find(|p| !(p.lon.is_finite() && p.lat.is_finite()))
    {
        return Err(RouteError::GeometryInvalid(format!(
            "polygon {polygon} ring {ring} has a non-finite position [{}, {}]",
            bad.lon, bad.lat
        )));
    }
    if positions.first() != positions.last() {
        return Err(RouteError::GeometryInvalid(format!(
            "polygon {polygon} ring {ring} is not closed: first and last positions differ"
        )));
    }
    Ok(positions.iter().copied().map(Coord::from).collect())
}

/// Check simple-feature validity (ring simplicity, holes inside shells,
/// disjoint interiors).
pub fn validate(zones: MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
    zones
        .check_validation()
        .map_err(|err| RouteError::GeometryInvalid(err.to_string()))?;
    Ok(zones)
}

/// Grow every boundary outward by `distance_m` metres with mitred corners.
///
/// The buffer is computed in an azimuthal-equidistant frame centred on the
/// zone centroid, so the margin is metric at any latitude. A distance of zero
/// leaves the zones untouched; a negative one shrinks them.
pub fn buffer(
    zones: &MultiPolygon<f64>,
    distance_m: f64,
    ellipsoid: Ellipsoid,
) -> Result<MultiPolygon<f64>> {
    if !distance_m.is_finite() {
        return Err(RouteError::InvalidBufferDistance(distance_m));
    }
    if distance_m == 0.0 {
        return Ok(zones.clone());
    }
    let Some(centroid) = zones.centroid() else {
        return Ok(zones.clone());
    };

    let projection = AzimuthalEquidistant::new(centroid.0, ellipsoid);
    let local = projection.project(zones);
    let style = BufferStyle::new(distance_m).line_join(LineJoin::Miter(mitre_min_angle()));
    let grown = local.buffer_with_style(style);
    debug!(
        distance_m,
        polygons_in = zones.0.len(),
        polygons_out = grown.0.len(),
        "buffered forbidden zones"
    );
    Ok(projection.unproject(&grown))
}

/// Normalize, validate and optionally buffer the caller's geometry.
pub fn preprocess(
    geometry: &ZoneGeometry,
    buffer_distance_m: Option<f64>,
    ellipsoid: Ellipsoid,
) -> Result<ForbiddenZones> {
    let zones = validate(normalize(geometry)?)?;
    let zones = match buffer_distance_m {
        Some(distance) => buffer(&zones, distance, ellipsoid)?,
        None => zones,
    };
    Ok(ForbiddenZones::new(zones))
}

/// Preprocessed forbidden region with per-polygon bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ForbiddenZones {
    polygons: MultiPolygon<f64>,
    bounds: Vec<Option<Rect<f64>>>,
}

impl ForbiddenZones {
    pub fn new(polygons: MultiPolygon<f64>) -> Self {
        let bounds = polygons.0.iter().map(BoundingRect::bounding_rect).collect();
        Self { polygons, bounds }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.polygons.0.len()
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    pub(crate) fn bounds(&self) -> &[Option<Rect<f64>>] {
        &self.bounds
    }

    /// Number of exterior-ring vertices, closing vertex included.
    pub fn exterior_vertex_count(&self) -> usize {
        self.polygons
            .0
            .iter()
            .map(|polygon| polygon.exterior().0.len())
            .sum()
    }

    /// Exterior-ring vertices in polygon and ring order. Holes are skipped.
    pub fn exterior_vertices(&self) -> impl Iterator<Item = Position> + '_ {
        self.polygons
            .0
            .iter()
            .flat_map(|polygon| polygon.exterior().coords().copied().map(Position::from))
    }

    /// True when `position` lies strictly inside some polygon's interior.
    pub fn strictly_contains(&self, position: Position) -> bool {
        let coord = Coord::from(position);
        self.polygons
            .0
            .iter()
            .zip(&self.bounds)
            .any(|(polygon, bounds)| {
                bounds.is_some_and(|rect| rect.intersects(&coord))
                    && polygon.coordinate_position(&coord) == CoordPos::Inside
            })
    }

    /// True when `position` lies inside or on the boundary of any hole.
    pub fn hole_encloses(&self, position: Position) -> bool {
        let coord = Coord::from(position);
        self.polygons.0.iter().any(|polygon| {
            polygon.interiors().iter().any(|ring| {
                Polygon::new(ring.clone(), Vec::new()).coordinate_position(&coord)
                    != CoordPos::Outside
            })
        })
    }

    /// True when the segment crosses a zone boundary or lies inside a zone.
    pub fn segment_blocked(&self, a: Position, b: Position) -> bool {
        if a == b {
            return self.strictly_contains(a);
        }
        let line = Line::new(Coord::from(a), Coord::from(b));
        self.polygons
            .0
            .iter()
            .zip(&self.bounds)
            .any(|(polygon, bounds)| area_blocks_line(polygon, bounds.as_ref(), &line))
    }
}

/// Whether `line` crosses the boundary of `area` or lies within it.
///
/// Both cases reduce to the open segment meeting the area's interior, so a
/// segment that only touches or runs along the boundary is not blocked.
pub(crate) fn area_blocks_line<A: Relate<f64>>(
    area: &A,
    bounds: Option<&Rect<f64>>,
    line: &Line<f64>,
) -> bool {
    let Some(bounds) = bounds else {
        return false;
    };
    if !bounds.intersects(&line.bounding_rect()) {
        return false;
    }
    area.relate(line).get(CoordPos::Inside, CoordPos::Inside) != Dimensions::Empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ring(points: &[(f64, f64)]) -> Ring {
        points.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Ring {
        ring(&[
            (min_x, min_y),
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
        ])
    }

    #[test]
    fn polygon_is_wrapped_into_multipolygon() {
        let zones = normalize(&ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)])).unwrap();
        assert_eq!(zones.0.len(), 1);
        assert_eq!(zones.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn multipolygon_passes_through() {
        let geometry = ZoneGeometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 1.0, 1.0)],
            vec![square(2.0, 0.0, 3.0, 1.0)],
        ]);
        assert_eq!(normalize(&geometry).unwrap().0.len(), 2);
    }

    #[test]
    fn open_ring_is_rejected() {
        let open = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let err = normalize(&ZoneGeometry::Polygon(vec![open])).unwrap_err();
        assert!(matches!(err, RouteError::GeometryInvalid(ref msg) if msg.contains("not closed")));
    }

    #[test]
    fn short_ring_is_rejected() {
        let short = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        let err = normalize(&ZoneGeometry::Polygon(vec![short])).unwrap_err();
        assert!(matches!(err, RouteError::GeometryInvalid(ref msg) if msg.contains("at least 4")));
    }

    fn square_with_hole() -> ZoneGeometry {
        ZoneGeometry::Polygon(vec![
            square(0.0, 0.0, 10.0, 10.0),
            square(4.0, 4.0, 6.0, 6.0),
        ])
    }

    #[test]
    fn polygon_without_rings_is_rejected() {
        assert!(normalize(&ZoneGeometry::Polygon(Vec::new())).is_err());
    }

    #[test]
    fn bowtie_fails_validation() {
        let bowtie = ring(&[
            (0.0, 0.0),
            (2.0, 2.0),
            (2.0, 0.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ]);
        let zones = normalize(&ZoneGeometry::Polygon(vec![bowtie])).unwrap();
        assert!(matches!(validate(zones), Err(RouteError::GeometryInvalid(_))));
    }

    #[test]
    fn overlapping_polygons_fail_validation() {
        let geometry = ZoneGeometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 2.0, 2.0)],
            vec![square(1.0, 1.0, 3.0, 3.0)],
        ]);
        let zones = normalize(&geometry).unwrap();
        assert!(validate(zones).is_err());
    }

    #[test]
    fn valid_polygon_with_hole_passes() {
        assert!(validate(normalize(&square_with_hole()).unwrap()).is_ok());
    }

    #[test]
    fn buffer_grows_zone_by_metres() {
        let zones = normalize(&ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)])).unwrap();
        let grown = buffer(&zones, 10_000.0, Ellipsoid::Wgs84).unwrap();
        assert!(grown.relate(&zones).is_contains());

        // 10 km beyond the eastern edge at the equator is roughly 0.09 degrees.
        let rect = grown.bounding_rect().unwrap();
        assert!((rect.max().x - 6.0 - 0.0898).abs() < 0.002, "{rect:?}");
        assert!((rect.min().y + 1.0 + 0.0904).abs() < 0.002, "{rect:?}");
    }

    #[test]
    fn mitre_join_keeps_square_corners() {
        let zones = normalize(&ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)])).unwrap();
        let grown = buffer(&zones, 5_000.0, Ellipsoid::Wgs84).unwrap();
        assert_eq!(grown.0.len(), 1);
        // A rounded corner would leave this point ~1.5 km outside.
        let rect = grown.bounding_rect().unwrap();
        let near_corner = Coord {
            x: rect.max().x - 0.005,
            y: rect.max().y - 0.005,
        };
        assert_eq!(grown.coordinate_position(&near_corner), CoordPos::Inside);
    }

    #[test]
    fn mitre_angle_matches_ratio() {
        let angle = mitre_min_angle();
        assert!((angle - 0.4027).abs() < 1e-4, "{angle}");
        assert!((1.0 / (angle / 2.0).sin() - MITRE_RATIO).abs() < 1e-9);
    }

    #[test]
    fn right_angle_corner_is_not_bevelled() {
        let zones = normalize(&ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)])).unwrap();
        let grown = buffer(&zones, 5_000.0, Ellipsoid::Wgs84).unwrap();
        // 4 km east and 4 km north of the north-east corner: inside the
        // mitre square, outside any bevel cut.
        let corner = Coord { x: 6.036, y: 1.036 };
        assert_eq!(grown.coordinate_position(&corner), CoordPos::Inside);
    }

    #[test]
    fn zero_buffer_is_identity() {
        let zones = normalize(&ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)])).unwrap();
        let once = buffer(&zones, 2_000.0, Ellipsoid::Wgs84).unwrap();
        let twice = buffer(&once, 0.0, Ellipsoid::Wgs84).unwrap();
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn non_finite_buffer_is_rejected(#[case] distance: f64) {
        let zones = normalize(&ZoneGeometry::Polygon(vec![square(0.0, 0.0, 1.0, 1.0)])).unwrap();
        assert!(matches!(
            buffer(&zones, distance, Ellipsoid::Wgs84),
            Err(RouteError::InvalidBufferDistance(_))
        ));
    }

    #[test]
    fn buffer_is_larger_in_degrees_near_pole() {
        let near_equator =
            normalize(&ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)])).unwrap();
        let near_pole =
            normalize(&ZoneGeometry::Polygon(vec![square(4.0, 69.0, 6.0, 71.0)])).unwrap();
        let east_growth = |zones: &MultiPolygon<f64>| {
            let grown = buffer(zones, 10_000.0, Ellipsoid::Wgs84).unwrap();
            grown.bounding_rect().unwrap().max().x - 6.0
        };
        assert!(east_growth(&near_pole) > 2.0 * east_growth(&near_equator));
    }

    fn square_zone() -> ForbiddenZones {
        preprocess(
            &ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)]),
            None,
            Ellipsoid::Wgs84,
        )
        .unwrap()
    }

    #[rstest]
    #[case((0.0, 0.0), (10.0, 0.0), true)] // crosses
    #[case((4.5, 0.0), (5.5, 0.0), true)] // inside
    #[case((4.0, -1.0), (6.0, 1.0), true)] // diagonal through interior
    #[case((4.0, -1.0), (6.0, -1.0), false)] // flush with an edge
    #[case((3.0, -1.0), (7.0, -1.0), false)] // overlaps an edge
    #[case((0.0, 5.0), (10.0, 5.0), false)] // clear
    #[case((0.0, 0.0), (4.0, 0.0), false)] // touches the boundary
    fn segment_predicate(#[case] a: (f64, f64), #[case] b: (f64, f64), #[case] blocked: bool) {
        let zones = square_zone();
        let a = Position::new(a.0, a.1);
        let b = Position::new(b.0, b.1);
        assert_eq!(zones.segment_blocked(a, b), blocked);
        assert_eq!(zones.segment_blocked(b, a), blocked);
    }

    #[test]
    fn degenerate_segment_uses_point_position() {
        let zones = square_zone();
        let inside = Position::new(5.0, 0.0);
        let outside = Position::new(0.0, 0.0);
        assert!(zones.segment_blocked(inside, inside));
        assert!(!zones.segment_blocked(outside, outside));
    }

    #[test]
    fn boundary_is_not_strict_interior() {
        let zones = square_zone();
        assert!(zones.strictly_contains(Position::new(5.0, 0.0)));
        assert!(!zones.strictly_contains(Position::new(4.0, 0.0)));
        assert!(!zones.strictly_contains(Position::new(0.0, 0.0)));
    }

    #[test]
    fn hole_membership_includes_boundary() {
        let zones = preprocess(&square_with_hole(), None, Ellipsoid::Wgs84).unwrap();
        assert!(zones.hole_encloses(Position::new(5.0, 5.0)));
        assert!(zones.hole_encloses(Position::new(4.0, 5.0)));
        assert!(!zones.hole_encloses(Position::new(2.0, 2.0)));
        assert!(!zones.strictly_contains(Position::new(5.0, 5.0)));
    }

    #[test]
    fn exterior_vertices_skip_holes() {
        let zones = preprocess(&square_with_hole(), None, Ellipsoid::Wgs84).unwrap();
        let vertices: Vec<_> = zones.exterior_vertices().collect();
        assert_eq!(vertices.len(), 5);
        assert!(!vertices.contains(&Position::new(4.0, 4.0)));
        assert_eq!(zones.exterior_vertex_count(), 5);
    }
}
