//! Geographic primitives shared by the lookup client and the map controller.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A WGS84 coordinate.
///
/// Latitude is always within `[-90, 90]` and longitude within `[-180, 180]`;
/// the only ways to obtain a `GeoPoint` are [`GeoPoint::new`] and
/// deserialization, and both reject out-of-range (or NaN) values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = CoreError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Map center used before any search has resolved (Amsterdam).
    pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
        lat: 52.3676,
        lng: 4.9041,
    };

    /// Creates a point after validating both coordinates.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidLatitude`] if `lat` is outside `[-90, 90]`.
    /// - [`CoreError::InvalidLongitude`] if `lng` is outside `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// An axis-aligned lat/lng rectangle.
///
/// Does not model boxes that cross the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl Bounds {
    /// Degenerate bounds containing exactly one point.
    #[must_use]
    pub fn around(point: GeoPoint) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Grows the rectangle so that it also contains `point`.
    #[must_use]
    pub fn extend(self, point: GeoPoint) -> Self {
        Self {
            south_west: GeoPoint {
                lat: self.south_west.lat.min(point.lat),
                lng: self.south_west.lng.min(point.lng),
            },
            north_east: GeoPoint {
                lat: self.north_east.lat.max(point.lat),
                lng: self.north_east.lng.max(point.lng),
            },
        }
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }
}
