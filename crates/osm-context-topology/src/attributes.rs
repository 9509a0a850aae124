// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Height resolution from feature tags
//!
//! Extractors run in priority order (height, levels, layer). The first one
//! returning a value wins; when none does the caller's defaults apply.

use osm_context_model::Tags;
use serde::{Deserialize, Serialize};

/// Fallback heights, in metres
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightDefaults {
    /// Height when nothing about the feature is known
    pub untagged: f64,
    /// Height when only a `building` tag is present
    pub building_only: f64,
    /// Storey height used to convert `building:levels`
    pub metres_per_level: f64,
}

impl Default for HeightDefaults {
    fn default() -> Self {
        Self {
            untagged: 9.0,
            building_only: 3.0,
            metres_per_level: 3.0,
        }
    }
}

/// Where a resolved height came from
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum HeightSource {
    /// Explicit `height` tag, metres
    Height(f64),
    /// `building:levels` tag, storeys
    Levels(f64),
    /// `layer` tag; negative layers are below grade
    Layer(f64),
    /// Nothing usable
    Default,
}

/// Height value plus its source
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ResolvedHeight {
    pub value: f64,
    pub source: HeightSource,
}

type Extractor = fn(&Tags) -> Option<HeightSource>;

const HEIGHT_EXTRACTORS: [Extractor; 3] = [extract_height, extract_levels, extract_layer];

fn extract_height(tags: &Tags) -> Option<HeightSource> {
    tags.get("height")
        .and_then(parse_numeric)
        .filter(|h| *h > 0.0)
        .map(HeightSource::Height)
}

fn extract_levels(tags: &Tags) -> Option<HeightSource> {
    tags.get("building:levels")
        .and_then(parse_numeric)
        .filter(|l| *l > 0.0)
        .map(HeightSource::Levels)
}

fn extract_layer(tags: &Tags) -> Option<HeightSource> {
    tags.get("layer").and_then(parse_numeric).map(HeightSource::Layer)
}

/// Resolve the extrusion height of a feature
pub fn resolve_height(tags: &Tags, defaults: &HeightDefaults) -> ResolvedHeight {
    let base = if tags.contains("building") {
        defaults.building_only
    } else {
        defaults.untagged
    };

    let source = HEIGHT_EXTRACTORS
        .iter()
        .find_map(|extract| extract(tags))
        .unwrap_or(HeightSource::Default);

    let value = match source {
        HeightSource::Height(h) => h,
        HeightSource::Levels(levels) => levels * defaults.metres_per_level,
        HeightSource::Layer(layer) if layer < 0.0 => -base,
        HeightSource::Layer(_) | HeightSource::Default => base,
    };

    ResolvedHeight { value, source }
}

/// Leading number of a tag value
///
/// Only the first `;`/`,` separated entry is considered, and any unit suffix
/// after the number is ignored: `"12.5 m"` gives 12.5, `"3;4"` gives 3.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let segment = value.split([';', ',']).next()?.trim();

    let end = segment
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(segment.len());

    segment[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("12"), Some(12.0));
        assert_eq!(parse_numeric("12.5 m"), Some(12.5));
        assert_eq!(parse_numeric("3;4"), Some(3.0));
        assert_eq!(parse_numeric("3,5"), Some(3.0));
        assert_eq!(parse_numeric("-1"), Some(-1.0));
        assert_eq!(parse_numeric(" 7 "), Some(7.0));
        assert_eq!(parse_numeric("tall"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_height_priority() {
        let defaults = HeightDefaults::default();
        let tags = Tags::new()
            .with("building", "yes")
            .with("height", "20")
            .with("building:levels", "3");
        let resolved = resolve_height(&tags, &defaults);
        assert_eq!(resolved.value, 20.0);
        assert_eq!(resolved.source, HeightSource::Height(20.0));

        let tags = Tags::new().with("building", "yes").with("building:levels", "4");
        assert_eq!(resolve_height(&tags, &defaults).value, 12.0);
    }

    #[test]
    fn test_layer_flips_default() {
        let defaults = HeightDefaults::default();
        let tags = Tags::new().with("building", "yes").with("layer", "-1");
        assert_eq!(resolve_height(&tags, &defaults).value, -3.0);

        let tags = Tags::new().with("layer", "1");
        assert_eq!(resolve_height(&tags, &defaults).value, 9.0);
    }

    #[test]
    fn test_defaults() {
        let defaults = HeightDefaults::default();
        assert_eq!(resolve_height(&Tags::new(), &defaults).value, 9.0);

        let only_building = Tags::new().with("building", "house");
        let resolved = resolve_height(&only_building, &defaults);
        assert_eq!(resolved.value, 3.0);
        assert_eq!(resolved.source, HeightSource::Default);
    }

    #[test]
    fn test_invalid_height_falls_through() {
        let defaults = HeightDefaults::default();
        let tags = Tags::new()
            .with("building", "yes")
            .with("height", "unknown")
            .with("building:levels", "2");
        assert_eq!(resolve_height(&tags, &defaults).value, 6.0);

        let tags = Tags::new().with("building", "yes").with("height", "0");
        assert_eq!(resolve_height(&tags, &defaults).value, 3.0);
    }
}
