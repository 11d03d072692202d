/// Post coordinates
///
/// Uses the WGS84 coordinate system (standard for GPS). A post either has
/// both halves of a coordinate or neither; `GeoPoint` is the only way to hold
/// one, so a half-set coordinate cannot be represented.
use crate::error::{AppError, Result};
use crate::geo::math;
use serde::Serialize;

/// Location data point (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::invalid(
                "latitude must be between -90 and 90",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::invalid(
                "longitude must be between -180 and 180",
            ));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build an optional point from two independently nullable halves.
    ///
    /// Both absent is `Ok(None)`; exactly one present is an error.
    pub fn from_pair(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<Self>> {
        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            _ => Err(AppError::invalid(
                "latitude and longitude must be provided together",
            )),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometers (haversine).
    pub fn distance_km_to(&self, other: &GeoPoint) -> f64 {
        math::distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}
