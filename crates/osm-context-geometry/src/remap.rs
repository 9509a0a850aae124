// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane-aligning remap and planar containment
//!
//! A 3D face and a candidate point are rotated so the face normal lines up
//! with +Z. After that the containment test is a plain 2D point-in-polygon
//! test on the XY coordinates.

use crate::math::{normalize, Plane};
use crate::{Point2, Point3, Vector3};
use nalgebra::{Matrix3, Rotation3, Unit};

/// Cross products shorter than this mean the vectors are (anti)parallel
const PARALLEL_EPSILON: f64 = 1e-12;

/// Which way [`remap_point`] rotates
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RemapDirection {
    /// Plane normal onto +Z
    ToHorizontal,
    /// +Z onto the plane normal
    FromHorizontal,
}

/// Rotation matrix taking direction `from` onto direction `to`
///
/// Closed-form Rodrigues construction: with `v = a × b`, `c = a · b` and
/// `K = [v]×`, `R = I + K + K² (1 - c) / |v|²`. Returns `None` when the
/// vectors are parallel or antiparallel, or either has zero length.
pub fn alignment_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Matrix3<f64>> {
    let a = normalize(from)?;
    let b = normalize(to)?;

    let v = a.cross(&b);
    let s2 = v.norm_squared();
    if s2 < PARALLEL_EPSILON * PARALLEL_EPSILON {
        return None;
    }
    let c = a.dot(&b);

    let k = v.cross_matrix();
    Some(Matrix3::identity() + k + k * k * ((1.0 - c) / s2))
}

/// Rotate a point by the plane's alignment rotation
///
/// If the rotation is undefined (normal already along Z, either sign) the
/// point is returned unchanged.
pub fn remap_point(point: &Point3<f64>, plane: &Plane, direction: RemapDirection) -> Point3<f64> {
    let z = Vector3::z();
    let rotation = match direction {
        RemapDirection::ToHorizontal => alignment_rotation(&plane.normal, &z),
        RemapDirection::FromHorizontal => alignment_rotation(&z, &plane.normal),
    };
    match rotation {
        Some(m) => Point3::from(m * point.coords),
        None => *point,
    }
}

/// Rotate `v` about `axis` by `angle` radians (right-hand rule)
///
/// Returns `v` unchanged for a zero axis.
#[inline]
pub fn rotate_about_axis(v: &Vector3<f64>, axis: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    match normalize(axis) {
        Some(axis) => Rotation3::from_axis_angle(&Unit::new_unchecked(axis), angle) * v,
        None => *v,
    }
}

/// Even-odd point-in-polygon test
///
/// Points exactly on an edge may land on either side.
pub fn point_in_polygon_2d(point: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Face loop flattened into its own plane, ready for repeated containment tests
#[derive(Clone, Debug)]
pub struct PlanarPolygon {
    plane: Plane,
    rotation: Option<Matrix3<f64>>,
    outline: Vec<Point2<f64>>,
}

impl PlanarPolygon {
    /// Build from a 3D face loop, `None` if the loop has no plane
    pub fn new(points: &[Point3<f64>]) -> Option<Self> {
        let plane = Plane::from_polygon(points)?;
        let rotation = alignment_rotation(&plane.normal, &Vector3::z());
        let mut polygon = Self {
            plane,
            rotation,
            outline: Vec::with_capacity(points.len()),
        };
        polygon.outline = points.iter().map(|p| polygon.to_local(p)).collect();
        Some(polygon)
    }

    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Outline in the plane's local XY frame
    pub fn outline(&self) -> &[Point2<f64>] {
        &self.outline
    }

    /// Local XY coordinates of a point
    #[inline]
    pub fn to_local(&self, point: &Point3<f64>) -> Point2<f64> {
        let rotated = match &self.rotation {
            Some(m) => m * point.coords,
            None => point.coords,
        };
        Point2::new(rotated.x, rotated.y)
    }

    /// Whether a point on (or near) the plane lies inside the outline
    #[inline]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point_in_polygon_2d(&self.to_local(point), &self.outline)
    }
}

/// One-off containment test of a point against a 3D face loop
pub fn polygon_contains(point: &Point3<f64>, polygon: &[Point3<f64>]) -> bool {
    PlanarPolygon::new(polygon).is_some_and(|p| p.contains(point))
}
