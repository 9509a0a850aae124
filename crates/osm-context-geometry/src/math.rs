// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane construction and ray/plane intersection

use crate::{Point3, Vector3};

/// Normals shorter than this are treated as zero
pub const NORMAL_EPSILON: f64 = 1e-10;

/// Unit vector in the direction of `v`, or `None` for a zero vector
#[inline]
pub fn normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let len = v.norm();
    if len > NORMAL_EPSILON && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}

/// Infinite plane through `origin` with unit `normal`
///
/// The normal follows the right-hand rule over the points the plane was
/// built from. It is not guaranteed to face outward.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Plane {
    pub origin: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Plane through three points
    ///
    /// Returns `None` when the points are collinear or coincident.
    pub fn from_points(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> Option<Self> {
        let u = normalize(&(p2 - p1))?;
        let normal = normalize(&u.cross(&(p3 - p1)))?;
        Some(Self {
            origin: *p1,
            normal,
        })
    }

    /// Plane of a face loop
    ///
    /// Uses the first three points, falling back to Newell's method when
    /// they are collinear.
    pub fn from_polygon(points: &[Point3<f64>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        Self::from_points(&points[0], &points[1], &points[2]).or_else(|| {
            newell_normal(points).map(|normal| Self {
                origin: points[0],
                normal,
            })
        })
    }

    /// Signed distance from the plane along its normal
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.origin))
    }

    /// Intersection of the line `ray_point + t * direction` with the plane
    ///
    /// `None` when the direction is parallel to the plane within `epsilon`.
    /// The parameter `t` may be negative; callers decide about direction.
    pub fn intersect_ray(
        &self,
        ray_point: &Point3<f64>,
        direction: &Vector3<f64>,
        epsilon: f64,
    ) -> Option<Point3<f64>> {
        let n_dot_d = self.normal.dot(direction);
        if n_dot_d.abs() < epsilon {
            return None;
        }

        let w = ray_point - self.origin;
        let si = -self.normal.dot(&w) / n_dot_d;
        Some(self.origin + w + direction * si)
    }
}

/// Newell normal of a loop, `None` when the loop has no area
fn newell_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let mut normal = Vector3::<f64>::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normalize(&normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 3.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(plane.normal, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_points_fall_back_to_newell() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert!(Plane::from_points(&points[0], &points[1], &points[2]).is_none());

        let plane = Plane::from_polygon(&points).unwrap();
        assert_relative_eq!(plane.normal.y.abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_polygon_has_no_plane() {
        let points = [Point3::new(1.0, 1.0, 1.0); 4];
        assert!(Plane::from_polygon(&points).is_none());
    }

    #[test]
    fn test_intersect_ray() {
        let plane = Plane {
            origin: Point3::origin(),
            normal: Vector3::z(),
        };
        let hit = plane
            .intersect_ray(&Point3::new(0.5, 0.5, 5.0), &Vector3::new(0.0, 0.0, -10.0), 1e-6)
            .unwrap();
        assert_relative_eq!(hit, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);

        // Parallel ray
        assert!(plane
            .intersect_ray(&Point3::new(0.0, 0.0, 1.0), &Vector3::x(), 1e-6)
            .is_none());
    }

    #[test]
    fn test_normalize_zero() {
        assert!(normalize(&Vector3::zeros()).is_none());
        assert_relative_eq!(normalize(&Vector3::new(3.0, 4.0, 0.0)).unwrap().norm(), 1.0);
    }
}
