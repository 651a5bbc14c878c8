//! Ellipsoidal distance used as the edge weight of the route graph.
//!
//! Distances come from the inverse geodesic problem (Karney's algorithm),
//! so the weight is symmetric and obeys the triangle inequality. That is what
//! makes the straight geodesic to the finish an admissible heuristic.

use std::fmt;
use std::str::FromStr;

use geographiclib_rs::{Geodesic, InverseGeodesic};
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::models::Position;

/// Supported reference ellipsoids, named as in proj.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ellipsoid {
    #[default]
    Wgs84,
    Wgs72,
    Grs80,
    Clarke1866,
    International1924,
    Krassowsky1940,
    Bessel1841,
    Airy1830,
    /// Authalic sphere of radius 6 370 997 m.
    Sphere,
}

impl Ellipsoid {
    pub const ALL: [Ellipsoid; 9] = [
        Self::Wgs84,
        Self::Wgs72,
        Self::Grs80,
        Self::Clarke1866,
        Self::International1924,
        Self::Krassowsky1940,
        Self::Bessel1841,
        Self::Airy1830,
        Self::Sphere,
    ];

    /// Equatorial radius in metres.
    pub fn semi_major_axis(self) -> f64 {
        match self {
            Self::Wgs84 | Self::Grs80 => 6_378_137.0,
            Self::Wgs72 => 6_378_135.0,
            Self::Clarke1866 => 6_378_206.4,
            Self::International1924 => 6_378_388.0,
            Self::Krassowsky1940 => 6_378_245.0,
            Self::Bessel1841 => 6_377_397.155,
            Self::Airy1830 => 6_377_563.396,
            Self::Sphere => 6_370_997.0,
        }
    }

    /// Flattening `f = (a - b) / a`.
    pub fn flattening(self) -> f64 {
        match self {
            Self::Wgs84 => 1.0 / 298.257_223_563,
            Self::Wgs72 => 1.0 / 298.26,
            Self::Grs80 => 1.0 / 298.257_222_101,
            Self::Clarke1866 => 1.0 / 294.978_698_2,
            Self::International1924 => 1.0 / 297.0,
            Self::Krassowsky1940 => 1.0 / 298.3,
            Self::Bessel1841 => 1.0 / 299.152_812_8,
            Self::Airy1830 => 1.0 / 299.324_964_6,
            Self::Sphere => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wgs84 => "WGS84",
            Self::Wgs72 => "WGS72",
            Self::Grs80 => "GRS80",
            Self::Clarke1866 => "clrk66",
            Self::International1924 => "intl",
            Self::Krassowsky1940 => "krass",
            Self::Bessel1841 => "bessel",
            Self::Airy1830 => "airy",
            Self::Sphere => "sphere",
        }
    }

    pub(crate) fn geodesic(self) -> Geodesic {
        Geodesic::new(self.semi_major_axis(), self.flattening())
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ellipsoid {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|ellipsoid| ellipsoid.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RouteError::UnknownEllipsoid(s.to_string()))
    }
}

impl TryFrom<String> for Ellipsoid {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ellipsoid> for String {
    fn from(ellipsoid: Ellipsoid) -> Self {
        ellipsoid.name().to_string()
    }
}

/// Edge weight: geodesic length in metres on one reference ellipsoid.
pub struct GeodesicWeigher {
    ellipsoid: Ellipsoid,
    geod: Geodesic,
}

impl GeodesicWeigher {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self {
            ellipsoid,
            geod: ellipsoid.geodesic(),
        }
    }

    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    /// Shortest surface distance between `a` and `b` in metres.
    pub fn weight(&self, a: Position, b: Position) -> f64 {
        let s12: f64 = self.geod.inverse(a.lat, a.lon, b.lat, b.lon);
        s12
    }

    /// Cumulative length of a polyline in metres.
    pub fn path_length(&self, points: &[Position]) -> f64 {
        points
            .windows(2)
            .map(|pair| self.weight(pair[0], pair[1]))
            .sum()
    }
}

impl Default for GeodesicWeigher {
    fn default() -> Self {
        Self::new(Ellipsoid::default())
    }
}

impl fmt::Debug for GeodesicWeigher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeodesicWeigher")
            .field("ellipsoid", &self.ellipsoid)
            .finish()
    }
}
