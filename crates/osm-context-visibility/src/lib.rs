// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # OSM-Context Visibility
//!
//! Sampled isovists: what an observer at a point can see of the context
//! meshes, approximated by ray hits.
//!
//! ## Overview
//!
//! - **Ray bundles**: lazy cones and refinement rings of unit directions ([`RayBundle`])
//! - **Caster**: ray/face intersection with a direction check and planar
//!   containment, reduced to the nearest hit per ray ([`cast_rays`], [`nearest_hits`])
//! - **Pruner**: restricts refinement casts to meshes hit near each seed ([`nearby_meshes`])
//! - **Refinement**: passes of shrinking rings around earlier hits ([`IsovistEngine`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use osm_context_visibility::{IsovistEngine, VisibilityOptions};
//!
//! let engine = IsovistEngine::new(&context.buildings.meshes, VisibilityOptions::default())?;
//! let isovist = engine.compute(Point3::new(0.0, 0.0, 1.7), Vector3::x())?;
//! let cloud = isovist.to_point_cloud(palette.visibility);
//! ```

pub mod bundle;
pub mod caster;
pub mod options;
pub mod pruner;
pub mod refine;

pub use bundle::RayBundle;
pub use caster::{
    cast_ray, cast_rays, nearest_hits, CandidateMesh, CastOutput, CastStats, Ray, RayPoint,
    VisibilityHit,
};
pub use options::{DirectionCheck, VisibilityOptions};
pub use pruner::{group_by_mesh, nearby_meshes};
pub use refine::{Isovist, IsovistEngine, PassSummary};

pub use osm_context_geometry::{Error, Point3, Result, Vector3};
