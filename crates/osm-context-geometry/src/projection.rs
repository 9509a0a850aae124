// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local transverse Mercator frame
//!
//! Krüger series to third order in the third flattening `n`, which keeps
//! round-trip error far below a millimetre within a few hundred kilometres of
//! the central meridian. Coordinates are metres east/north of the origin.

use osm_context_model::{CoordinateTransform, GeoPoint, ProjectLocation};

/// WGS84 semi-major axis, metres
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Transverse Mercator projection centred on a geographic origin
#[derive(Clone, Debug)]
pub struct TransverseMercator {
    lat0: f64,
    lon0: f64,
    /// Scale factor on the central meridian
    k0: f64,
    /// Rectifying radius times k0
    scaled_a: f64,
    e: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
    /// Northing of the origin latitude on the central meridian
    northing0: f64,
}

impl TransverseMercator {
    /// Projection with unit scale on the central meridian through `origin`
    pub fn new(origin: GeoPoint) -> Self {
        let f = WGS84_F;
        let n = f / (2.0 - f);
        let (n2, n3) = (n * n, n * n * n);
        let k0 = 1.0;

        let rectifying = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let mut projection = Self {
            lat0: origin.lat.to_radians(),
            lon0: origin.lon.to_radians(),
            k0,
            scaled_a: k0 * rectifying,
            e: (f * (2.0 - f)).sqrt(),
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
            northing0: 0.0,
        };
        projection.northing0 = projection.forward(projection.lat0, projection.lon0).1;
        projection
    }

    /// Projection centred on a host project location
    pub fn centered_on(location: &ProjectLocation) -> Self {
        Self::new(location.geo_point())
    }

    /// Geographic origin in degrees
    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.lat0.to_degrees(), self.lon0.to_degrees())
    }

    /// Scale factor on the central meridian
    pub fn scale_factor(&self) -> f64 {
        self.k0
    }

    /// Easting/northing before the origin shift, angles in radians
    fn forward(&self, lat: f64, lon: f64) -> (f64, f64) {
        let sin_lat = lat.sin();
        let d_lon = lon - self.lon0;

        let t = (sin_lat.atanh() - self.e * (self.e * sin_lat).atanh()).sinh();
        let xi_p = t.atan2(d_lon.cos());
        let eta_p = (d_lon.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        (self.scaled_a * eta, self.scaled_a * xi)
    }
}

impl CoordinateTransform for TransverseMercator {
    fn project(&self, point: GeoPoint) -> (f64, f64) {
        let (x, y) = self.forward(point.lat.to_radians(), point.lon.to_radians());
        (x, y - self.northing0)
    }

    fn unproject(&self, x: f64, y: f64) -> GeoPoint {
        let xi = (y + self.northing0) / self.scaled_a;
        let eta = x / self.scaled_a;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let mut lat = chi;
        for (j, delta) in self.delta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            lat += delta * (k * chi).sin();
        }
        let lon = self.lon0 + eta_p.sinh().atan2(xi_p.cos());

        GeoPoint::new(lat.to_degrees(), lon.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_projects_to_zero() {
        let tm = TransverseMercator::new(GeoPoint::new(51.5, -0.12));
        let (x, y) = tm.project(GeoPoint::new(51.5, -0.12));
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip() {
        for (lat0, lon0) in [(51.5, -0.12), (-33.86, 151.2), (0.0, 0.0), (64.1, -21.9)] {
            let tm = TransverseMercator::new(GeoPoint::new(lat0, lon0));
            for (dlat, dlon) in [(0.0, 0.0), (0.01, 0.02), (-0.05, 0.03), (0.2, -0.2)] {
                let p = GeoPoint::new(lat0 + dlat, lon0 + dlon);
                let (x, y) = tm.project(p);
                let back = tm.unproject(x, y);
                assert_relative_eq!(back.lat, p.lat, epsilon = 1e-6);
                assert_relative_eq!(back.lon, p.lon, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_unit_scale_on_central_meridian() {
        let tm = TransverseMercator::new(GeoPoint::new(47.0, 8.0));
        assert_eq!(tm.scale_factor(), 1.0);

        // A short step east at the origin keeps its ground length
        let dlon = 0.0001_f64;
        let (x, _) = tm.project(GeoPoint::new(47.0, 8.0 + dlon));
        let lat = 47.0_f64.to_radians();
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let prime_vertical = WGS84_A / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let ground = prime_vertical * lat.cos() * dlon.to_radians();
        assert_relative_eq!(x, ground * tm.scale_factor(), epsilon = 1e-4);
    }

    #[test]
    fn test_metric_scale() {
        // One arc-minute of latitude is roughly one nautical mile
        let tm = TransverseMercator::new(GeoPoint::new(45.0, 7.0));
        let (_, y) = tm.project(GeoPoint::new(45.0 + 1.0 / 60.0, 7.0));
        assert!((y - 1852.0).abs() < 5.0, "got {}", y);

        let (x, _) = tm.project(GeoPoint::new(45.0, 7.001));
        assert!(x > 0.0);
    }
}
