// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visibility options

use osm_context_geometry::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a plane hit is checked to lie ahead of the ray origin
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionCheck {
    /// `dot(direction, hit - origin) > 0`
    #[default]
    Dot,
    /// Each component of the unit direction and the unit hit offset must
    /// have matching signs. Rejects valid hits when a component is near zero;
    /// kept for reproducing older results.
    ComponentWise,
}

/// Settings for an isovist computation
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityOptions {
    /// Half-angle of the coarse cone, degrees
    pub half_angle_degrees: f64,
    /// Elevation step of the coarse cone, degrees
    pub step_degrees: f64,
    /// Ray/plane parallelism tolerance
    pub epsilon: f64,
    /// Hits this close to the origin are ignored
    pub min_hit_distance: f64,
    pub direction_check: DirectionCheck,
    /// Rays per refinement bundle
    pub refinement_rays: usize,
    /// Upper bound of the random azimuth offset of refinement bundles, degrees
    pub refinement_jitter_degrees: f64,
    /// Refinement half-angles never drop below this, degrees
    pub min_half_angle_degrees: f64,
    /// Refinement passes after the coarse cast
    pub max_passes: usize,
    /// Seed for the refinement jitter; `None` draws from entropy
    pub seed: Option<u64>,
    /// Cast on the rayon pool
    pub parallel: bool,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            half_angle_degrees: 70.0,
            step_degrees: 10.0,
            epsilon: 1e-6,
            min_hit_distance: 1e-5,
            direction_check: DirectionCheck::Dot,
            refinement_rays: 6,
            refinement_jitter_degrees: 10.0,
            min_half_angle_degrees: 1.0,
            max_passes: 3,
            seed: None,
            parallel: true,
        }
    }
}

impl VisibilityOptions {
    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| Error::configuration(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_direction_check(mut self, check: DirectionCheck) -> Self {
        self.direction_check = check;
        self
    }

    pub fn with_cone(mut self, half_angle_degrees: f64, step_degrees: f64) -> Self {
        self.half_angle_degrees = half_angle_degrees;
        self.step_degrees = step_degrees;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Reject values the caster cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("step_degrees", self.step_degrees),
            ("epsilon", self.epsilon),
            ("min_half_angle_degrees", self.min_half_angle_degrees),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::configuration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("half_angle_degrees", self.half_angle_degrees),
            ("min_hit_distance", self.min_hit_distance),
            ("refinement_jitter_degrees", self.refinement_jitter_degrees),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::configuration(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.half_angle_degrees > 180.0 {
            return Err(Error::configuration(format!(
                "half_angle_degrees must be at most 180, got {}",
                self.half_angle_degrees
            )));
        }
        if self.refinement_rays == 0 {
            return Err(Error::configuration("refinement_rays must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(VisibilityOptions::default().validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let options = VisibilityOptions::from_json(
            r#"{"half_angle_degrees": 45, "direction_check": "component_wise", "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(options.half_angle_degrees, 45.0);
        assert_eq!(options.step_degrees, 10.0);
        assert_eq!(options.direction_check, DirectionCheck::ComponentWise);
        assert_eq!(options.seed, Some(7));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            VisibilityOptions::default().with_cone(70.0, 0.0),
            VisibilityOptions::default().with_cone(-1.0, 10.0),
            VisibilityOptions::default().with_cone(f64::NAN, 10.0),
            VisibilityOptions {
                refinement_rays: 0,
                ..VisibilityOptions::default()
            },
        ];
        for options in bad {
            assert!(matches!(options.validate(), Err(Error::Configuration(_))));
        }
        assert!(VisibilityOptions::from_json(r#"{"epsilon": -1}"#).is_err());
    }
}
