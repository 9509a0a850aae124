// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OSM-Context Model - shared types and collaborator traits
//!
//! This crate provides the data model shared by the reconstruction and
//! visibility crates. Raw map records (nodes, way fragments, relations) come
//! in, meshes, polylines and point clouds go out.
//!
//! # Architecture
//!
//! The crate defines the two boundaries the core depends on:
//!
//! - [`FeatureSource`] - supplies already-parsed map records for a bounding box
//! - [`CoordinateTransform`] - bidirectional geographic <-> local planar transform
//!
//! # Example
//!
//! ```ignore
//! use osm_context_model::{CoordinateTransform, GeoPoint};
//!
//! let transform: Box<dyn CoordinateTransform> = make_transform();
//! let (x, y) = transform.project(GeoPoint::new(51.5, -0.12));
//! let back = transform.unproject(x, y);
//! ```

pub mod error;
pub mod location;
pub mod mesh;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use location::*;
pub use mesh::*;
pub use traits::*;
pub use types::*;
