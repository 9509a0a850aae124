// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray bundles
//!
//! A bundle is a lazy sequence of unit directions arranged in rings around
//! an axis. Ring `c` of a cone sits at elevation `half * c / count`; its
//! azimuth step is `floor(coeff * (count + 1 - c) * step)` degrees with
//! `coeff = 1 - ((count + 1 - c) / (count + 1))^100`, so outer rings are
//! sampled more densely.

use osm_context_geometry::{normalize, rotate_about_axis, Error, Result, Vector3};

/// One ring of directions at a fixed elevation
#[derive(Clone, Copy, PartialEq, Debug)]
struct BundleRing {
    /// Tilt away from the axis, radians
    elevation: f64,
    /// Azimuth of the first direction, degrees
    offset: f64,
    /// Azimuth step, degrees
    step: f64,
    /// Directions in this ring
    count: usize,
}

impl BundleRing {
    /// Azimuths `offset, offset + step, ...` below `offset + 360`
    fn new(elevation: f64, offset: f64, step: f64) -> Self {
        let count = (360.0 / step).ceil() as usize;
        Self {
            elevation,
            offset,
            step,
            count,
        }
    }
}

/// Lazy, finite sequence of unit ray directions around an axis
#[derive(Clone, Debug)]
pub struct RayBundle {
    axis: Vector3<f64>,
    tilt_axis: Vector3<f64>,
    include_axis: bool,
    rings: Vec<BundleRing>,
    ring: usize,
    index: usize,
    remaining: usize,
}

impl RayBundle {
    /// Coarse cone of the given half-angle and elevation step (degrees)
    ///
    /// The first direction is the axis itself.
    pub fn cone(axis: &Vector3<f64>, half_angle_degrees: f64, step_degrees: f64) -> Result<Self> {
        if !(step_degrees.is_finite() && step_degrees > 0.0) {
            return Err(Error::configuration(format!(
                "Bundle step must be positive, got {}",
                step_degrees
            )));
        }
        if !(half_angle_degrees.is_finite() && half_angle_degrees >= 0.0) {
            return Err(Error::configuration(format!(
                "Bundle half-angle must not be negative, got {}",
                half_angle_degrees
            )));
        }

        let count = (half_angle_degrees / step_degrees).floor() as usize;
        let half_angle = half_angle_degrees.to_radians();
        let rings = (1..=count)
            .map(|c| {
                let outer = (count + 1 - c) as f64;
                let coeff = 1.0 - (outer / (count + 1) as f64).powi(100);
                let step = (coeff * outer * step_degrees).floor().max(1.0);
                BundleRing::new(half_angle * c as f64 / count as f64, 0.0, step)
            })
            .collect();

        Self::from_rings(axis, rings, true)
    }

    /// Single ring of `rays` directions at `half_angle_degrees` around the axis
    ///
    /// Used to refine around an earlier hit. `offset_degrees` rotates the
    /// whole ring.
    pub fn refinement(
        axis: &Vector3<f64>,
        half_angle_degrees: f64,
        rays: usize,
        offset_degrees: f64,
    ) -> Result<Self> {
        if rays == 0 || !half_angle_degrees.is_finite() {
            return Err(Error::configuration(format!(
                "Refinement needs rays and a finite angle, got {} rays at {}",
                rays, half_angle_degrees
            )));
        }
        let ring = BundleRing::new(
            half_angle_degrees.to_radians(),
            offset_degrees,
            360.0 / rays as f64,
        );
        // ceil(360 / (360 / rays)) may round up by one
        let ring = BundleRing { count: rays, ..ring };
        Self::from_rings(axis, vec![ring], false)
    }

    fn from_rings(axis: &Vector3<f64>, rings: Vec<BundleRing>, include_axis: bool) -> Result<Self> {
        let axis = normalize(axis).ok_or_else(|| Error::degenerate("Bundle axis has zero length"))?;
        let tilt_axis = normalize(&axis.cross(&Vector3::z()))
            .or_else(|| normalize(&axis.cross(&Vector3::x())))
            .ok_or_else(|| Error::degenerate("No perpendicular to the bundle axis"))?;

        let remaining = usize::from(include_axis) + rings.iter().map(|r| r.count).sum::<usize>();
        Ok(Self {
            axis,
            tilt_axis,
            include_axis,
            rings,
            ring: 0,
            index: 0,
            remaining,
        })
    }

    /// Unit axis of the bundle
    pub fn axis(&self) -> &Vector3<f64> {
        &self.axis
    }
}

impl Iterator for RayBundle {
    type Item = Vector3<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.include_axis {
            self.include_axis = false;
            self.remaining -= 1;
            return Some(self.axis);
        }

        while let Some(ring) = self.rings.get(self.ring) {
            if self.index < ring.count {
                let azimuth = (ring.offset + ring.step * self.index as f64).to_radians();
                self.index += 1;
                self.remaining -= 1;
                let tilted = rotate_about_axis(&self.axis, &self.tilt_axis, ring.elevation);
                return Some(rotate_about_axis(&tilted, &self.axis, azimuth));
            }
            self.ring += 1;
            self.index = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RayBundle {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_half_angle_is_axis_only() {
        let axis = Vector3::new(0.0, 0.0, -2.0);
        let rays: Vec<_> = RayBundle::cone(&axis, 0.0, 10.0).unwrap().collect();
        assert_eq!(rays.len(), 1);
        assert_relative_eq!(rays[0], Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_cone_directions_stay_within_half_angle() {
        let axis = Vector3::new(1.0, 2.0, 0.5);
        let unit = axis.normalize();
        let bundle = RayBundle::cone(&axis, 70.0, 10.0).unwrap();
        let expected = bundle.len();
        let rays: Vec<_> = bundle.collect();
        assert_eq!(rays.len(), expected);

        assert_relative_eq!(rays[0], unit, epsilon = 1e-12);
        let max_angle = 70f64.to_radians() + 1e-9;
        for ray in &rays {
            assert_relative_eq!(ray.norm(), 1.0, epsilon = 1e-12);
            assert!(unit.dot(ray).clamp(-1.0, 1.0).acos() <= max_angle);
        }
    }

    #[test]
    fn test_ring_sizes() {
        // count = 7: ring 1 steps by 69 degrees, ring 7 by 10 degrees
        let rays: Vec<_> = RayBundle::cone(&Vector3::z(), 70.0, 10.0).unwrap().collect();
        let axis = Vector3::z();
        let at = |deg: f64| {
            rays.iter()
                .filter(|r| (axis.dot(*r).acos() - deg.to_radians()).abs() < 1e-9)
                .count()
        };
        assert_eq!(at(10.0), 6);
        assert_eq!(at(70.0), 36);
    }

    #[test]
    fn test_refinement_ring() {
        let axis = Vector3::new(0.0, 1.0, 0.0);
        let rays: Vec<_> = RayBundle::refinement(&axis, 5.0, 6, 3.0).unwrap().collect();
        assert_eq!(rays.len(), 6);
        for ray in &rays {
            assert_relative_eq!(axis.dot(ray), 5f64.to_radians().cos(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_vertical_axis_uses_fallback_perpendicular() {
        let rays: Vec<_> = RayBundle::cone(&Vector3::z(), 20.0, 10.0).unwrap().collect();
        assert!(rays.iter().all(|r| r.z > 0.9));
        assert!(RayBundle::cone(&Vector3::zeros(), 20.0, 10.0).is_err());
        assert!(RayBundle::cone(&Vector3::z(), 20.0, 0.0).is_err());
    }
}
