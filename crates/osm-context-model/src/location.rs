// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project location and query bounds

use crate::{CoordinateTransform, GeoPoint, ModelError, Result};
use serde::{Deserialize, Serialize};

/// Geographic anchor of the host project, in degrees
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct ProjectLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Angle from grid north to true north
    pub true_north: f64,
}

impl ProjectLocation {
    /// Create a location from degrees
    pub fn new(latitude: f64, longitude: f64, true_north: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
            true_north,
        };
        location.validate()?;
        Ok(location)
    }

    /// Convert a location stored in radians (as host projects record it)
    pub fn from_radians(latitude: f64, longitude: f64, true_north: f64) -> Result<Self> {
        Self::new(
            latitude.to_degrees(),
            longitude.to_degrees(),
            true_north.to_degrees(),
        )
    }

    pub fn geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    fn validate(&self) -> Result<()> {
        if !(self.latitude.is_finite() && self.longitude.is_finite() && self.true_north.is_finite())
        {
            return Err(ModelError::location(
                "latitude, longitude and true north must be finite numbers",
            ));
        }
        if self.latitude.abs() > 90.0 {
            return Err(ModelError::location(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        Ok(())
    }
}

/// Geographic query box (south, west, north, east) in degrees
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Box covering `radius` metres around the transform's local origin
    pub fn around(transform: &dyn CoordinateTransform, radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ModelError::InvalidRadius(radius));
        }

        let corners = [
            transform.unproject(-radius, -radius),
            transform.unproject(radius, -radius),
            transform.unproject(radius, radius),
            transform.unproject(-radius, radius),
        ];

        let mut bbox = Self {
            south: f64::MAX,
            west: f64::MAX,
            north: f64::MIN,
            east: f64::MIN,
        };
        for c in corners {
            bbox.south = bbox.south.min(c.lat);
            bbox.north = bbox.north.max(c.lat);
            bbox.west = bbox.west.min(c.lon);
            bbox.east = bbox.east.max(c.lon);
        }
        Ok(bbox)
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat-earth transform: one degree per 100 km
    struct Scaled;

    impl CoordinateTransform for Scaled {
        fn project(&self, point: GeoPoint) -> (f64, f64) {
            (point.lon * 100_000.0, point.lat * 100_000.0)
        }

        fn unproject(&self, x: f64, y: f64) -> GeoPoint {
            GeoPoint::new(y / 100_000.0, x / 100_000.0)
        }
    }

    #[test]
    fn test_from_radians() {
        let loc = ProjectLocation::from_radians(
            std::f64::consts::FRAC_PI_4,
            std::f64::consts::FRAC_PI_2,
            0.0,
        )
        .unwrap();
        assert!((loc.latitude - 45.0).abs() < 1e-12);
        assert!((loc.longitude - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_location() {
        assert!(ProjectLocation::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(ProjectLocation::new(95.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_bbox_around() {
        let bbox = BoundingBox::around(&Scaled, 500.0).unwrap();
        assert!((bbox.south + 0.005).abs() < 1e-12);
        assert!((bbox.east - 0.005).abs() < 1e-12);
        assert!(bbox.contains(GeoPoint::new(0.001, -0.001)));
        assert!(!bbox.contains(GeoPoint::new(0.01, 0.0)));

        assert_eq!(
            BoundingBox::around(&Scaled, -1.0),
            Err(ModelError::InvalidRadius(-1.0))
        );
    }
}
