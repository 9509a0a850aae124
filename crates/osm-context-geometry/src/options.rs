// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context build options

use crate::buffer::RoadWidthTable;
use crate::error::{Error, Result};
use osm_context_model::Palette;
use osm_context_topology::{AssemblerOptions, HeightDefaults};
use serde::{Deserialize, Serialize};

/// Options for [`ContextBuilder`](crate::ContextBuilder)
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Fallback building heights
    pub heights: HeightDefaults,
    /// Road classification to half-width
    pub road_widths: RoadWidthTable,
    /// Output colours
    pub palette: Palette,
    /// Longest ribbon mitre, as a multiple of the half-width
    pub miter_limit: f64,
    /// Z of road ribbons
    pub road_elevation: f64,
    /// Ring assembly for buildings
    pub buildings: AssemblerOptions,
    /// Ring assembly for roads
    pub roads: AssemblerOptions,
    /// Process rings on the rayon pool
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            heights: HeightDefaults::default(),
            road_widths: RoadWidthTable::default(),
            palette: Palette::default(),
            miter_limit: 4.0,
            road_elevation: 0.0,
            buildings: AssemblerOptions::buildings(),
            roads: AssemblerOptions::roads(),
            parallel: true,
        }
    }
}

impl BuildOptions {
    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| Error::configuration(e.to_string()))?;
        Ok(options.sanitized())
    }

    pub fn with_heights(mut self, heights: HeightDefaults) -> Self {
        self.heights = heights;
        self
    }

    pub fn with_road_widths(mut self, road_widths: RoadWidthTable) -> Self {
        self.road_widths = road_widths;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace unusable numeric values with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        let heights = &mut self.heights;
        for (name, value, fallback) in [
            ("untagged", &mut heights.untagged, defaults.heights.untagged),
            ("building_only", &mut heights.building_only, defaults.heights.building_only),
            (
                "metres_per_level",
                &mut heights.metres_per_level,
                defaults.heights.metres_per_level,
            ),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                log::warn!("Height default {} = {} is unusable, using {}", name, value, fallback);
                *value = fallback;
            }
        }

        if !self.miter_limit.is_finite() || self.miter_limit < 1.0 {
            log::warn!(
                "Mitre limit {} is below 1, using {}",
                self.miter_limit,
                defaults.miter_limit
            );
            self.miter_limit = defaults.miter_limit;
        }
        if !self.road_elevation.is_finite() {
            log::warn!("Road elevation is not finite, using 0");
            self.road_elevation = 0.0;
        }
        self
    }
}
