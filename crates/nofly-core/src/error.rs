//! Failure taxonomy for route requests.

use thiserror::Error;

/// Convenient result alias for the routing core.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Every way a route request can fail.
///
/// None of these are recovered internally; a failure never comes with a
/// partial path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The forbidden region violates simple-feature validity.
    #[error("forbidden zones are not valid: {0}")]
    GeometryInvalid(String),

    /// Start or finish lies strictly inside a forbidden interior.
    #[error("start and finish points must not lie inside a forbidden zone")]
    PointBlocked,

    /// The start point is sealed inside a polygon hole.
    #[error("cannot build a route: the start point lies inside a hole of a forbidden polygon")]
    EnclosedStart,

    /// The finish point is sealed inside a polygon hole.
    #[error("cannot build a route: the finish point lies inside a hole of a forbidden polygon")]
    EnclosedFinish,

    /// Start and finish are not connected in the visibility graph.
    #[error("cannot build a route: no path between the start and finish points")]
    NoPathFound,

    /// The requested reference ellipsoid is not supported.
    #[error("unknown ellipsoid '{0}'")]
    UnknownEllipsoid(String),

    /// The buffer distance is NaN or infinite.
    #[error("buffer distance must be a finite number of metres, got {0}")]
    InvalidBufferDistance(f64),

    /// A coordinate is not finite or lies outside the geographic range.
    #[error("invalid position [{lon}, {lat}]")]
    InvalidPosition { lon: f64, lat: f64 },

    /// The visibility graph would exceed the configured vertex budget.
    #[error("visibility graph would have {vertices} vertices, limit is {limit}")]
    VertexLimitExceeded { vertices: usize, limit: usize },

    /// The caller raised the cancellation flag.
    #[error("route computation was cancelled")]
    Cancelled,
}

impl RouteError {
    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            Self::GeometryInvalid(_) => "geometry_invalid",
            Self::PointBlocked => "point_blocked",
            Self::EnclosedStart => "enclosed_start",
            Self::EnclosedFinish => "enclosed_finish",
            Self::NoPathFound => "no_path_found",
            Self::UnknownEllipsoid(_) => "unknown_ellipsoid",
            Self::InvalidBufferDistance(_) => "invalid_buffer_distance",
            Self::InvalidPosition { .. } => "invalid_position",
            Self::VertexLimitExceeded { .. } => "vertex_limit_exceeded",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the geometry itself rules out a route, as opposed to a
    /// malformed request.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            Self::PointBlocked | Self::EnclosedStart | Self::EnclosedFinish | Self::NoPathFound
        )
    }
}
