// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building and road layers from raw map records
//!
//! The builder assembles rings, resolves and projects their nodes, then
//! extrudes footprints or buffers centerlines. A bad ring never fails the
//! batch; it is logged and counted in [`BuildStats`].

use crate::buffer::{buffer_polyline, RibbonStyle};
use crate::extrusion::extrude_ring;
use crate::options::BuildOptions;
use crate::{Error, Mesh, Point2, Polyline, Result};
use osm_context_model::{
    BoundingBox, CoordinateTransform, FeatureSet, FeatureSource, GeoPoint, NodeId, Ring,
};
use osm_context_topology::{resolve_height, split_rings, NodeIndex, TopologyAssembler};
use rayon::prelude::*;

/// Tag holding the road classification
const ROAD_CLASS_TAG: &str = "highway";

/// Projected points closer than this are merged
const MERGE_DISTANCE: f64 = 1e-9;

/// Counters for one layer build
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BuildStats {
    /// Rings considered after assembly (and splitting, for roads)
    pub rings: usize,
    /// Meshes produced
    pub meshes: usize,
    /// Node references without a node
    pub missing_nodes: usize,
    /// Rings with too few distinct points left
    pub short_rings: usize,
    /// Rings rejected by extrusion or buffering
    pub degenerate_rings: usize,
    /// `area=yes` roads left out of buffering
    pub skipped_areas: usize,
}

impl BuildStats {
    /// Rings that produced no mesh
    pub fn skipped(&self) -> usize {
        self.short_rings + self.degenerate_rings + self.skipped_areas
    }
}

/// Extruded building footprints
#[derive(Clone, Debug, Default)]
pub struct BuildingLayer {
    pub meshes: Vec<Mesh>,
    pub stats: BuildStats,
}

/// Road centerlines and their ribbons
#[derive(Clone, Debug, Default)]
pub struct RoadLayer {
    pub polylines: Vec<Polyline>,
    pub meshes: Vec<Mesh>,
    pub stats: BuildStats,
}

/// Everything built around one location
#[derive(Clone, Debug)]
pub struct Context {
    pub bbox: BoundingBox,
    pub buildings: BuildingLayer,
    pub roads: RoadLayer,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Skip {
    ShortRing,
    Degenerate,
    Area,
}

/// Result of one ring
#[derive(Default)]
struct Unit {
    polyline: Option<Polyline>,
    mesh: Option<Mesh>,
    missing: usize,
    skip: Option<Skip>,
}

impl Unit {
    fn skipped(skip: Skip, missing: usize) -> Self {
        Self {
            skip: Some(skip),
            missing,
            ..Self::default()
        }
    }
}

/// Builds mesh layers in the local frame of a coordinate transform
pub struct ContextBuilder<'a> {
    transform: &'a dyn CoordinateTransform,
    options: BuildOptions,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(transform: &'a dyn CoordinateTransform, options: BuildOptions) -> Self {
        Self {
            transform,
            options: options.sanitized(),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Query a feature source around the transform's origin and build both layers
    pub fn build_from_source(&self, source: &dyn FeatureSource, radius: f64) -> Result<Context> {
        let bbox = BoundingBox::around(self.transform, radius)?;
        let buildings = source.features(&bbox, "building")?;
        let roads = source.features(&bbox, ROAD_CLASS_TAG)?;

        Ok(Context {
            bbox,
            buildings: self.build_buildings(&buildings),
            roads: self.build_roads(&roads),
        })
    }

    /// Extrude every building footprint
    pub fn build_buildings(&self, features: &FeatureSet) -> BuildingLayer {
        let assembly = TopologyAssembler::new(self.options.buildings.clone()).assemble(features);
        let index = NodeIndex::new(&features.nodes);

        let units = self.map_rings(&assembly.rings, |ring| self.building_unit(ring, &index));

        let mut layer = BuildingLayer::default();
        layer.stats.rings = assembly.rings.len();
        for unit in units {
            tally(&mut layer.stats, &unit);
            layer.meshes.extend(unit.mesh);
        }

        log::info!(
            "Built {} building meshes from {} rings ({} skipped, {} missing nodes)",
            layer.stats.meshes,
            layer.stats.rings,
            layer.stats.skipped(),
            layer.stats.missing_nodes
        );
        layer
    }

    /// Split, trace and buffer every road ring
    pub fn build_roads(&self, features: &FeatureSet) -> RoadLayer {
        let assembly = TopologyAssembler::new(self.options.roads.clone()).assemble(features);
        let rings = split_rings(&assembly.rings);
        let index = NodeIndex::new(&features.nodes);

        let units = self.map_rings(&rings, |ring| self.road_unit(ring, &index));

        let mut layer = RoadLayer::default();
        layer.stats.rings = rings.len();
        for unit in units {
            tally(&mut layer.stats, &unit);
            layer.polylines.extend(unit.polyline);
            layer.meshes.extend(unit.mesh);
        }

        log::info!(
            "Built {} road polylines and {} ribbons from {} rings ({} areas skipped)",
            layer.polylines.len(),
            layer.stats.meshes,
            layer.stats.rings,
            layer.stats.skipped_areas
        );
        layer
    }

    fn map_rings<F>(&self, rings: &[Ring], build: F) -> Vec<Unit>
    where
        F: Fn(&Ring) -> Unit + Sync + Send,
    {
        if self.options.parallel {
            rings.par_iter().map(build).collect()
        } else {
            rings.iter().map(build).collect()
        }
    }

    fn building_unit(&self, ring: &Ring, index: &NodeIndex) -> Unit {
        let resolved = index.resolve(ring);
        let missing = report_missing(&resolved.missing);
        let points = self.project(&resolved.positions);
        if points.len() < 3 {
            log::debug!("Skipping building ring with {} usable points", points.len());
            return Unit::skipped(Skip::ShortRing, missing);
        }

        let height = resolve_height(&ring.tags, &self.options.heights);
        match extrude_ring(&points, height.value, self.options.palette.building) {
            Ok(mesh) => Unit {
                mesh: Some(mesh),
                missing,
                ..Unit::default()
            },
            Err(e) => {
                log::debug!("Skipping building ring: {}", e);
                Unit::skipped(Skip::Degenerate, missing)
            }
        }
    }

    fn road_unit(&self, ring: &Ring, index: &NodeIndex) -> Unit {
        if ring.tags.is_area() {
            log::debug!("Skipping road area of {} nodes", ring.len());
            return Unit::skipped(Skip::Area, 0);
        }

        let resolved = index.resolve(ring);
        let missing = report_missing(&resolved.missing);
        let points = self.project(&resolved.positions);
        if points.len() < 2 {
            log::debug!("Skipping road ring with {} usable points", points.len());
            return Unit::skipped(Skip::ShortRing, missing);
        }

        let polyline = Polyline::new(
            points.iter().map(|p| [p.x, p.y, 0.0]).collect(),
            resolved.closed,
        );
        let half_width = self
            .options
            .road_widths
            .half_width(ring.tags.get(ROAD_CLASS_TAG));
        let style = RibbonStyle {
            miter_limit: self.options.miter_limit,
            elevation: self.options.road_elevation,
            color: self.options.palette.road,
        };

        let (mesh, skip) = match buffer_polyline(&polyline, half_width, &style) {
            Ok(mesh) => (Some(mesh), None),
            Err(e) => {
                log::debug!("No ribbon for road ring: {}", e);
                (None, Some(Skip::Degenerate))
            }
        };

        Unit {
            polyline: Some(polyline),
            mesh,
            missing,
            skip,
        }
    }

    /// Project positions, merging consecutive duplicates and a repeated start
    fn project(&self, positions: &[GeoPoint]) -> Vec<Point2<f64>> {
        let mut points: Vec<Point2<f64>> = Vec::with_capacity(positions.len());
        for position in positions {
            let (x, y) = self.transform.project(*position);
            let p = Point2::new(x, y);
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            if points.last().map_or(true, |last| (p - last).norm() > MERGE_DISTANCE) {
                points.push(p);
            }
        }
        while points.len() > 1
            && points
                .last()
                .is_some_and(|last| (points[0] - last).norm() <= MERGE_DISTANCE)
        {
            points.pop();
        }
        points
    }
}

/// Log every unresolved node reference, returning how many there were
fn report_missing(missing: &[NodeId]) -> usize {
    for id in missing {
        log::debug!("{}", Error::MissingNode(*id));
    }
    missing.len()
}

fn tally(stats: &mut BuildStats, unit: &Unit) {
    stats.missing_nodes += unit.missing;
    if unit.mesh.is_some() {
        stats.meshes += 1;
    }
    match unit.skip {
        Some(Skip::ShortRing) => stats.short_rings += 1,
        Some(Skip::Degenerate) => stats.degenerate_rings += 1,
        Some(Skip::Area) => stats.skipped_areas += 1,
        None => {}
    }
}
