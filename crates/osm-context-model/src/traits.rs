// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator traits
//!
//! The core never performs I/O. Map records and the coordinate reference
//! system are supplied through these traits before any geometry is built.

use crate::{BoundingBox, FeatureSet, GeoPoint, Result};

/// Bidirectional geographic <-> local planar transform
///
/// Implementations must be pure: the same input always gives the same output.
/// `unproject(project(p))` should recover `p` to within 1e-6 degrees near the
/// local origin.
pub trait CoordinateTransform: Send + Sync {
    /// Geographic position to local planar (x = east, y = north), in metres
    fn project(&self, point: GeoPoint) -> (f64, f64);

    /// Local planar position back to geographic
    fn unproject(&self, x: f64, y: f64) -> GeoPoint;
}

/// Supplier of raw map records
///
/// # Example
///
/// ```ignore
/// use osm_context_model::{FeatureSource, BoundingBox};
///
/// fn load(source: &dyn FeatureSource, bbox: &BoundingBox) {
///     let features = source.features(bbox, "building")?;
///     println!("{} ways", features.ways.len());
/// }
/// ```
pub trait FeatureSource: Send + Sync {
    /// Fetch nodes, ways and relations carrying `keyword` inside `bbox`
    fn features(&self, bbox: &BoundingBox, keyword: &str) -> Result<FeatureSet>;
}

/// An in-memory feature set serves itself, ignoring the query box
impl FeatureSource for FeatureSet {
    fn features(&self, _bbox: &BoundingBox, _keyword: &str) -> Result<FeatureSet> {
        Ok(self.clone())
    }
}
