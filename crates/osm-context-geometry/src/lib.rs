// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # OSM-Context Geometry
//!
//! Turns assembled map rings into meshes in a local planar frame.
//!
//! ## Overview
//!
//! - **Extrusion**: building footprints become capped prisms ([`extrude_ring`])
//! - **Road ribbons**: centerlines are offset into triangulated ribbons ([`buffer_polyline`])
//! - **Orientation**: one winding rule for every emitted loop ([`fix_orientation`])
//! - **Plane math**: plane construction, ray/plane intersection and the
//!   plane-aligning remap used for containment tests
//! - **Projection**: a transverse Mercator frame around the project location
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use osm_context_geometry::{BuildOptions, ContextBuilder, TransverseMercator};
//!
//! let frame = TransverseMercator::centered_on(&location);
//! let builder = ContextBuilder::new(&frame, BuildOptions::default());
//! let layer = builder.build_buildings(&features);
//!
//! println!("{} meshes, {} rings skipped", layer.meshes.len(), layer.stats.skipped());
//! ```

pub mod buffer;
pub mod context;
pub mod error;
pub mod extrusion;
pub mod math;
pub mod options;
pub mod orientation;
pub mod projection;
pub mod remap;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

// Re-export main types
pub use buffer::{buffer_polyline, ribbon_outline, RibbonPolygon, RibbonStyle, RoadWidthTable};
pub use context::{BuildStats, BuildingLayer, Context, ContextBuilder, RoadLayer};
pub use error::{Error, Result};
pub use extrusion::extrude_ring;
pub use math::{normalize, Plane};
pub use options::BuildOptions;
pub use orientation::{fix_orientation, orientation_sum, signed_area};
pub use projection::TransverseMercator;
pub use remap::{
    alignment_rotation, point_in_polygon_2d, polygon_contains, remap_point, rotate_about_axis,
    PlanarPolygon, RemapDirection,
};
pub use triangulation::{
    calculate_polygon_normal, mesh_to_mesh_data, project_to_2d, triangulate_polygon,
    triangulate_polygon_with_holes,
};

pub use osm_context_model::{Mesh, MeshData, Polyline};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extrusion() {
        let ring = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(0.0, 5.0),
        ];
        let mesh = extrude_ring(&ring, 20.0, 0).unwrap();

        assert!(mesh.vertex_count() > 0);
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_mesh_to_mesh_data() {
        let ring = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let mesh = extrude_ring(&ring, 1.0, 0).unwrap();
        let mesh_data = mesh_to_mesh_data(&mesh);

        // 2 triangle caps + 3 quads
        assert_eq!(mesh_data.triangle_count(), 2 + 3 * 2);
        assert_eq!(mesh_data.normals.len(), mesh_data.positions.len());
    }
}
