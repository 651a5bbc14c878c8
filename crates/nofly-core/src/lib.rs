pub mod cancel;
pub mod config;
pub mod error;
pub mod fast_path;
pub mod geodesic;
pub mod interchange;
pub mod models;
pub mod planner;
pub mod projection;
pub mod search;
pub mod visibility;
pub mod zones;

pub use cancel::CancellationFlag;
pub use config::{RouteOptions, SearchStrategy, DEFAULT_CANCEL_CHECK_INTERVAL};
pub use error::{Result, RouteError};
pub use fast_path::FastPath;
pub use geodesic::{Ellipsoid, GeodesicWeigher};
pub use interchange::{
    route_feature, Feature, FeatureCollection, Geometry, InterchangeError, RouteRequest,
};
pub use models::{PolygonRings, Position, Ring, RouteKind, RoutePath, ZoneGeometry};
pub use planner::{find_route, plan_with_zones};
pub use projection::AzimuthalEquidistant;
pub use search::SearchResult;
pub use visibility::RouteGraph;
pub use zones::{preprocess, ForbiddenZones};
