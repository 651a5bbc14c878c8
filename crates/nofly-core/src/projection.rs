//! Local azimuthal-equidistant projection.
//!
//! Degrees are not a uniform metric (a degree of longitude shrinks toward the
//! poles), so zone buffering happens in a plane where one unit is one metre
//! around the zone of interest. The forward mapping places a point at its
//! geodesic distance from the centre along its initial azimuth, which is the
//! ellipsoidal form of proj's `aeqd`.

use geo::{Coord, MapCoords, MultiPolygon};
use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};

use crate::geodesic::Ellipsoid;

pub struct AzimuthalEquidistant {
    center: Coord<f64>,
    geod: Geodesic,
}

impl AzimuthalEquidistant {
    /// Projection centred on `center` (x = lon, y = lat).
    pub fn new(center: Coord<f64>, ellipsoid: Ellipsoid) -> Self {
        Self {
            center,
            geod: ellipsoid.geodesic(),
        }
    }

    pub fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Geographic degrees to planar metres (x east, y north).
    pub fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        let (s12, azi1, _azi2, _a12): (f64, f64, f64, f64) =
            self.geod.inverse(self.center.y, self.center.x, coord.y, coord.x);
        let azimuth = azi1.to_radians();
        Coord {
            x: s12 * azimuth.sin(),
            y: s12 * azimuth.cos(),
        }
    }

    /// Planar metres back to geographic degrees.
    pub fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        let distance = coord.x.hypot(coord.y);
        if distance == 0.0 {
            return self.center;
        }
        let azimuth = coord.x.atan2(coord.y).to_degrees();
        let (lat, lon): (f64, f64) =
            self.geod.direct(self.center.y, self.center.x, azimuth, distance);
        Coord { x: lon, y: lat }
    }

    pub fn project(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|coord| self.forward(coord))
    }

    pub fn unproject(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|coord| self.inverse(coord))
    }
}
