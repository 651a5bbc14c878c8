//! Route planning entry points.

use tracing::{debug, info_span};

use crate::config::RouteOptions;
use crate::error::{Result, RouteError};
use crate::fast_path::{self, FastPath};
use crate::geodesic::GeodesicWeigher;
use crate::models::{Position, RouteKind, RoutePath, ZoneGeometry};
use crate::search;
use crate::visibility::{self, FINISH, START};
use crate::zones::{self, ForbiddenZones};

/// Shortest path from `start` to `finish` that stays out of `forbidden`.
///
/// The zones are validated and, when `buffer_distance_m` is given, grown by
/// that many metres before routing. The result is either the direct segment
/// or a detour through zone vertices of minimal geodesic length.
pub fn find_route(
    start: Position,
    finish: Position,
    forbidden: Option<&ZoneGeometry>,
    buffer_distance_m: Option<f64>,
    options: &RouteOptions,
) -> Result<RoutePath> {
    let span = info_span!(
        "find_route",
        ellipsoid = %options.ellipsoid,
        strategy = ?options.strategy,
        buffer_m = buffer_distance_m
    );
    let _guard = span.enter();

    start.validate()?;
    finish.validate()?;
    if let Some(distance) = buffer_distance_m.filter(|d| !d.is_finite()) {
        return Err(RouteError::InvalidBufferDistance(distance));
    }

    let zones = forbidden
        .map(|geometry| zones::preprocess(geometry, buffer_distance_m, options.ellipsoid))
        .transpose()?;
    if let Some(zones) = &zones {
        debug!(
            polygons = zones.len(),
            exterior_vertices = zones.exterior_vertex_count(),
            "preprocessed forbidden zones"
        );
    }
    route_between(start, finish, zones.as_ref(), options)
}

/// Route against zones that were preprocessed earlier, e.g. by a cache.
pub fn plan_with_zones(
    start: Position,
    finish: Position,
    zones: &ForbiddenZones,
    options: &RouteOptions,
) -> Result<RoutePath> {
    let span = info_span!(
        "find_route",
        ellipsoid = %options.ellipsoid,
        strategy = ?options.strategy
    );
    let _guard = span.enter();

    start.validate()?;
    finish.validate()?;
    route_between(start, finish, Some(zones), options)
}

fn route_between(
    start: Position,
    finish: Position,
    zones: Option<&ForbiddenZones>,
    options: &RouteOptions,
) -> Result<RoutePath> {
    let zones = match fast_path::check(zones, start, finish)? {
        FastPath::Direct => {
            let distance_m = GeodesicWeigher::new(options.ellipsoid).weight(start, finish);
            return Ok(RoutePath {
                points: vec![start, finish],
                distance_m,
                kind: RouteKind::Direct,
            });
        }
        // Search is only reported when zones exist.
        FastPath::Search => zones.ok_or(RouteError::NoPathFound)?,
    };

    let graph = visibility::build(zones, start, finish, options)?;
    let found = search::shortest_path(&graph, START, FINISH, options)?;
    let points: Vec<Position> = found
        .vertices
        .iter()
        .map(|&index| graph.vertex(index))
        .collect();
    debug!(
        waypoints = points.len(),
        distance_m = found.cost,
        "detour found"
    );
    Ok(RoutePath {
        points,
        distance_m: found.cost,
        kind: RouteKind::Detour,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchStrategy;
    use crate::models::Ring;
    use rstest::rstest;

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Ring {
        vec![
            Position::new(min_x, min_y),
            Position::new(max_x, min_y),
            Position::new(max_x, max_y),
            Position::new(min_x, max_y),
            Position::new(min_x, min_y),
        ]
    }

    const START_POS: Position = Position::new(0.0, 0.0);
    const FINISH_POS: Position = Position::new(10.0, 0.0);

    #[test]
    fn no_zone_returns_direct_segment() {
        let path = find_route(START_POS, FINISH_POS, None, None, &RouteOptions::default()).unwrap();
        assert_eq!(path.points, vec![START_POS, FINISH_POS]);
        assert!(path.is_direct());
        assert!((path.distance_m - 1_113_194.9).abs() < 1.0);
    }

    #[rstest]
    #[case(SearchStrategy::Dijkstra)]
    #[case(SearchStrategy::AStar)]
    fn square_forces_detour_around_corners(#[case] strategy: SearchStrategy) {
        let zone = ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)]);
        let options = RouteOptions::default().with_strategy(strategy);
        let path = find_route(START_POS, FINISH_POS, Some(&zone), None, &options).unwrap();

        assert_eq!(path.kind, RouteKind::Detour);
        assert_eq!(path.start(), Some(START_POS));
        assert_eq!(path.finish(), Some(FINISH_POS));
        assert_eq!(path.points.len(), 4);
        let lats: Vec<f64> = path.points[1..3].iter().map(|p| p.lat).collect();
        assert!(
            lats == vec![1.0, 1.0] || lats == vec![-1.0, -1.0],
            "{path:?}"
        );

        let direct = GeodesicWeigher::default().weight(START_POS, FINISH_POS);
        assert!(path.distance_m > direct);

        let zones = zones::preprocess(&zone, None, options.ellipsoid).unwrap();
        for (a, b) in path.segments() {
            assert!(!zones.segment_blocked(a, b));
        }
    }

    #[test]
    fn start_inside_zone_is_blocked() {
        let zone = ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)]);
        let err = find_route(
            Position::new(5.0, 0.0),
            FINISH_POS,
            Some(&zone),
            None,
            &RouteOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, RouteError::PointBlocked);
    }

    #[test]
    fn bowtie_is_invalid_geometry() {
        let bowtie = vec![
            Position::new(4.0, -1.0),
            Position::new(6.0, 1.0),
            Position::new(6.0, -1.0),
            Position::new(4.0, 1.0),
            Position::new(4.0, -1.0),
        ];
        let zone = ZoneGeometry::Polygon(vec![bowtie]);
        let options = RouteOptions::default();
        let err = find_route(START_POS, FINISH_POS, Some(&zone), None, &options).unwrap_err();
        assert!(matches!(err, RouteError::GeometryInvalid(_)));
    }

    #[test]
    fn start_in_hole_is_enclosed() {
        let zone = ZoneGeometry::Polygon(vec![
            square(0.0, 0.0, 10.0, 10.0),
            square(4.0, 4.0, 6.0, 6.0),
        ]);
        let err = find_route(
            Position::new(5.0, 5.0),
            Position::new(20.0, 5.0),
            Some(&zone),
            None,
            &RouteOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, RouteError::EnclosedStart);
    }

    #[test]
    fn overlapping_bars_sealing_start_have_no_path() {
        // Separate pieces whose union is a closed ring around the start. They
        // overlap, so this goes through the preprocessed entry point.
        let bars = ZoneGeometry::MultiPolygon(vec![
            vec![square(-3.0, -3.0, 3.0, -2.0)],
            vec![square(-3.0, 2.0, 3.0, 3.0)],
            vec![square(-3.0, -3.0, -2.0, 3.0)],
            vec![square(2.0, -3.0, 3.0, 3.0)],
        ]);
        let zones = ForbiddenZones::new(zones::normalize(&bars).unwrap());
        let err = plan_with_zones(START_POS, FINISH_POS, &zones, &RouteOptions::default())
            .unwrap_err();
        assert_eq!(err, RouteError::NoPathFound);
    }

    #[test]
    fn buffer_pushes_waypoints_outward() {
        let zone = ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)]);
        let options = RouteOptions::default();
        let plain = find_route(START_POS, FINISH_POS, Some(&zone), None, &options).unwrap();
        let buffered =
            find_route(START_POS, FINISH_POS, Some(&zone), Some(20_000.0), &options).unwrap();
        assert!(buffered.distance_m > plain.distance_m);
        assert!(buffered.points[1].lat.abs() > 1.1);
    }

    #[test]
    fn non_finite_buffer_is_rejected() {
        let err = find_route(
            START_POS,
            FINISH_POS,
            None,
            Some(f64::NAN),
            &RouteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::InvalidBufferDistance(_)));
    }

    #[test]
    fn invalid_position_is_rejected() {
        let err = find_route(
            Position::new(200.0, 0.0),
            FINISH_POS,
            None,
            None,
            &RouteOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, RouteError::InvalidPosition { lon: 200.0, lat: 0.0 });
    }

    #[test]
    fn plan_with_zones_matches_find_route() {
        let zone = ZoneGeometry::Polygon(vec![square(4.0, -1.0, 6.0, 1.0)]);
        let options = RouteOptions::default();
        let prepared = zones::preprocess(&zone, None, options.ellipsoid).unwrap();
        let cached = plan_with_zones(START_POS, FINISH_POS, &prepared, &options).unwrap();
        let fresh = find_route(START_POS, FINISH_POS, Some(&zone), None, &options).unwrap();
        assert_eq!(cached, fresh);
    }
}
