//! Minimum-weight path search over a [`RouteGraph`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::debug;

use crate::config::{RouteOptions, SearchStrategy};
use crate::error::{Result, RouteError};
use crate::geodesic::GeodesicWeigher;
use crate::visibility::RouteGraph;

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenVertex {
    f_score: FloatOrd,
    g_score: FloatOrd,
    vertex: usize,
}

impl PartialOrd for OpenVertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenVertex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .cmp(&other.f_score)
            .then_with(|| self.g_score.cmp(&other.g_score))
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

/// A found path as vertex indices plus its total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub vertices: Vec<usize>,
    pub cost: f64,
    pub expanded: usize,
}

/// Cheapest path from `source` to `target`.
///
/// Dijkstra expands by accumulated cost alone; A* adds the geodesic distance
/// to the target, which never overestimates because edge weights are
/// geodesic lengths. Equal keys pop in vertex-index order.
pub fn shortest_path(
    graph: &RouteGraph,
    source: usize,
    target: usize,
    options: &RouteOptions,
) -> Result<SearchResult> {
    let weigher = GeodesicWeigher::new(options.ellipsoid);
    let goal = graph.vertex(target);
    let heuristic = |vertex: usize| match options.strategy {
        SearchStrategy::Dijkstra => 0.0,
        SearchStrategy::AStar => weigher.weight(graph.vertex(vertex), goal),
    };

    let count = graph.vertex_count();
    let mut best = vec![f64::INFINITY; count];
    let mut came_from: Vec<Option<usize>> = vec![None; count];
    let mut closed = vec![false; count];
    let check_every = options.cancel_check_interval.max(1);

    let mut open_set: BinaryHeap<Reverse<OpenVertex>> = BinaryHeap::new();
    best[source] = 0.0;
    open_set.push(Reverse(OpenVertex {
        f_score: FloatOrd(heuristic(source)),
        g_score: FloatOrd(0.0),
        vertex: source,
    }));

    let mut expanded = 0usize;
    while let Some(Reverse(current)) = open_set.pop() {
        let vertex = current.vertex;
        if closed[vertex] || current.g_score.0 > best[vertex] {
            continue;
        }
        if expanded % check_every == 0 {
            options.cancellation.check()?;
        }
        expanded += 1;

        if vertex == target {
            let vertices = reconstruct(&came_from, target);
            debug!(
                expanded,
                cost = best[target],
                hops = vertices.len(),
                "search reached the finish"
            );
            return Ok(SearchResult {
                vertices,
                cost: best[target],
                expanded,
            });
        }
        closed[vertex] = true;

        for &(next, weight) in graph.neighbors(vertex) {
            if closed[next] {
                continue;
            }
            let tentative = best[vertex] + weight;
            if tentative < best[next] {
                best[next] = tentative;
                came_from[next] = Some(vertex);
                open_set.push(Reverse(OpenVertex {
                    f_score: FloatOrd(tentative + heuristic(next)),
                    g_score: FloatOrd(tentative),
                    vertex: next,
                }));
            }
        }
    }

    debug!(expanded, "search exhausted the reachable component");
    Err(RouteError::NoPathFound)
}

fn reconstruct(came_from: &[Option<usize>], target: usize) -> Vec<usize> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(previous) = came_from[current] {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
