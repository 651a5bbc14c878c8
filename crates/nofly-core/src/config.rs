//! Per-request routing options.

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationFlag;
use crate::geodesic::Ellipsoid;

/// Default number of candidate pairs between cancellation checks.
pub const DEFAULT_CANCEL_CHECK_INTERVAL: usize = 256;

/// Shortest-path algorithm used on the visibility graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Uniform-cost search with no heuristic.
    #[default]
    Dijkstra,
    /// Best-first search guided by the geodesic distance to the finish.
    #[serde(alias = "astar")]
    AStar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub ellipsoid: Ellipsoid,
    pub strategy: SearchStrategy,
    /// Reject requests whose visibility graph would exceed this many vertices.
    pub max_vertices: Option<usize>,
    pub cancel_check_interval: usize,
    #[serde(skip)]
    pub cancellation: CancellationFlag,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            ellipsoid: Ellipsoid::Wgs84,
            strategy: SearchStrategy::Dijkstra,
            max_vertices: None,
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
            cancellation: CancellationFlag::new(),
        }
    }
}

impl RouteOptions {
    pub fn with_ellipsoid(mut self, ellipsoid: Ellipsoid) -> Self {
        self.ellipsoid = ellipsoid;
        self
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = Some(max_vertices);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }
}
