//! Geographic positions on a spherical Earth
//!
//! Epicentral distances are great-circle angles computed from unit position
//! vectors, which stays well conditioned for both tiny and antipodal
//! separations.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Kilometres per degree of great-circle arc (mean Earth radius 6371 km).
pub const KM_PER_DEGREE: f64 = 111.194_926_644_558_73;

/// A point on the Earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (deg, positive north)
    pub latitude: f64,
    /// Longitude (deg, positive east)
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns the unit vector pointing from the Earth's centre to this point.
    pub fn unit_vector(&self) -> Vector3<f64> {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Great-circle distance to `other` in degrees.
    pub fn distance_degrees(&self, other: &GeoPoint) -> f64 {
        let a = self.unit_vector();
        let b = other.unit_vector();
        a.cross(&b).norm().atan2(a.dot(&b)).to_degrees()
    }

    /// Great-circle distance to `other` in kilometres.
    #[inline]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        self.distance_degrees(other) * KM_PER_DEGREE
    }
}

/// Station coordinates as needed by travel-time computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    /// Latitude (deg)
    pub latitude: f64,
    /// Longitude (deg)
    pub longitude: f64,
    /// Elevation above sea level (m)
    #[serde(default)]
    pub elevation: f64,
}

impl StationLocation {
    /// Creates a station location.
    #[inline]
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Surface position of the station.
    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_along_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 45.0);

        assert!((a.distance_degrees(&b) - 45.0).abs() < 1e-10);
        assert!((b.distance_degrees(&a) - 45.0).abs() < 1e-10);
    }

    #[test]
    fn test_distance_pole_to_equator() {
        let pole = GeoPoint::new(90.0, 0.0);
        let equator = GeoPoint::new(0.0, 123.0);

        assert!((pole.distance_degrees(&equator) - 90.0).abs() < 1e-10);
    }

    #[test]
    fn test_distance_antipodal_and_zero() {
        let a = GeoPoint::new(10.0, 20.0);
        let antipode = GeoPoint::new(-10.0, -160.0);

        assert!((a.distance_degrees(&antipode) - 180.0).abs() < 1e-8);
        assert!(a.distance_degrees(&a).abs() < 1e-12);
    }

    #[test]
    fn test_distance_km() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);

        assert!((a.distance_km(&b) - KM_PER_DEGREE).abs() < 1e-6);
    }
}
