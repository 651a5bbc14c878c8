//! Visibility graph over the start, the finish and the zone outlines.
//!
//! Vertices are the two endpoints plus every exterior-ring vertex of every
//! forbidden polygon. Hole vertices never become waypoints: a hole is only
//! reachable through forbidden material. Two vertices are joined when the
//! segment between them keeps clear of every polygon interior, and the edge
//! carries the geodesic length of that segment.

use std::collections::HashSet;

use geo::{Coord, Line, PreparedGeometry};
use tracing::debug;

use crate::config::RouteOptions;
use crate::error::{Result, RouteError};
use crate::geodesic::GeodesicWeigher;
use crate::models::Position;
use crate::zones::{area_blocks_line, ForbiddenZones};

/// Index of the start vertex in every graph built here.
pub const START: usize = 0;

/// Index of the finish vertex in every graph built here.
pub const FINISH: usize = 1;

/// Undirected weighted graph with adjacency lists.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGraph {
    vertices: Vec<Position>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl RouteGraph {
    /// Graph over `vertices` with no edges yet.
    pub fn with_vertices(vertices: Vec<Position>) -> Self {
        let adjacency = vec![Vec::new(); vertices.len()];
        Self {
            vertices,
            adjacency,
        }
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> Position {
        self.vertices[index]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Neighbours of `index` with edge weights.
    pub fn neighbors(&self, index: usize) -> &[(usize, f64)] {
        &self.adjacency[index]
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].iter().any(|&(other, _)| other == b)
    }

    /// Insert an undirected edge. Self loops are ignored.
    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        if a == b {
            return;
        }
        self.adjacency[a].push((b, weight));
        self.adjacency[b].push((a, weight));
    }
}

/// Deduplicated vertex list: start, finish, then exterior vertices in
/// polygon order.
///
/// The start and finish keep their slots even when equal to each other or
/// to a zone vertex, so [`START`] and [`FINISH`] are always valid indices.
/// Runs in linear time and polls the cancellation flag.
pub fn candidate_vertices(
    zones: &ForbiddenZones,
    start: Position,
    finish: Position,
    options: &RouteOptions,
) -> Result<Vec<Position>> {
    let check_every = options.cancel_check_interval.max(1);
    let mut vertices = Vec::with_capacity(zones.exterior_vertex_count() + 2);
    let mut seen = HashSet::with_capacity(zones.exterior_vertex_count() + 2);
    for endpoint in [start, finish] {
        seen.insert(vertex_key(endpoint));
        vertices.push(endpoint);
    }
    for (visited, vertex) in zones.exterior_vertices().enumerate() {
        if visited % check_every == 0 {
            options.cancellation.check()?;
        }
        if seen.insert(vertex_key(vertex)) {
            vertices.push(vertex);
        }
    }
    Ok(vertices)
}

/// Hash key agreeing with `==` on finite coordinates.
fn vertex_key(position: Position) -> (u64, u64) {
    // -0.0 == 0.0 but their bit patterns differ.
    let bits = |value: f64| {
        let value = if value == 0.0 { 0.0 } else { value };
        value.to_bits()
    };
    (bits(position.lon), bits(position.lat))
}

/// Build the visibility graph, filtering all candidate pairs against the
/// zones.
pub fn build(
    zones: &ForbiddenZones,
    start: Position,
    finish: Position,
    options: &RouteOptions,
) -> Result<RouteGraph> {
    let vertices = candidate_vertices(zones, start, finish, options)?;
    if let Some(limit) = options.max_vertices {
        if vertices.len() > limit {
            return Err(RouteError::VertexLimitExceeded {
                vertices: vertices.len(),
                limit,
            });
        }
    }

    let prepared: Vec<_> = zones
        .polygons()
        .0
        .iter()
        .map(PreparedGeometry::from)
        .collect();
    let weigher = GeodesicWeigher::new(options.ellipsoid);
    let check_every = options.cancel_check_interval.max(1);

    let mut graph = RouteGraph::with_vertices(vertices);
    let count = graph.vertex_count();
    let mut pairs = 0usize;
    for i in 0..count {
        for j in (i + 1)..count {
            if pairs % check_every == 0 {
                options.cancellation.check()?;
            }
            pairs += 1;

            let (a, b) = (graph.vertex(i), graph.vertex(j));
            if a == b {
                continue;
            }
            let line = Line::new(Coord::from(a), Coord::from(b));
            let blocked = prepared
                .iter()
                .zip(zones.bounds())
                .any(|(polygon, bounds)| area_blocks_line(polygon, bounds.as_ref(), &line));
            if !blocked {
                graph.add_edge(i, j, weigher.weight(a, b));
            }
        }
    }

    debug!(
        vertices = graph.vertex_count(),
        candidate_pairs = pairs,
        edges = graph.edge_count(),
        "built visibility graph"
    );
    Ok(graph)
}
