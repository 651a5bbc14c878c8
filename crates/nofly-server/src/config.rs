//! Server configuration from environment.

use std::env;
use std::time::Duration;

use nofly_core::Ellipsoid;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub default_ellipsoid: Ellipsoid,
    pub route_timeout: Duration,
    /// `None` disables the vertex guard (`NOFLY_MAX_VERTICES=0`).
    pub max_vertices: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ellipsoid: Ellipsoid::Wgs84,
            route_timeout: Duration::from_millis(30_000),
            max_vertices: Some(5_000),
        }
    }
}

impl Config {
    /// Read `NOFLY_*` variables, falling back to defaults for unset or
    /// unparsable numbers. An unknown ellipsoid name is an error.
    pub fn from_env() -> Result<Self, nofly_core::RouteError> {
        let defaults = Self::default();
        let default_ellipsoid = match env::var("NOFLY_DEFAULT_ELLIPSOID") {
            Ok(name) => name.parse()?,
            Err(_) => defaults.default_ellipsoid,
        };
        Ok(Self {
            server_port: env::var("NOFLY_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            default_ellipsoid,
            route_timeout: env::var("NOFLY_ROUTE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.route_timeout),
            max_vertices: env::var("NOFLY_MAX_VERTICES")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .map(|limit| (limit > 0).then_some(limit))
                .unwrap_or(defaults.max_vertices),
        })
    }
}
