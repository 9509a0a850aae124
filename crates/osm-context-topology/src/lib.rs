// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OSM-Context Topology - ring assembly from raw map records
//!
//! This crate turns way fragments and relations into [`Ring`]s ready for mesh
//! generation.
//!
//! # Features
//!
//! - **Relation assembly** with a claimed-fragment pool, so two relations never
//!   share one fragment
//! - **Self-intersection splitting** of road rings at repeated nodes
//! - **Attribute resolution** (height, levels, layer) through ordered extractors
//! - **Node resolution** that skips missing references instead of failing
//!
//! Malformed input never aborts a batch. Every skip is counted in an
//! [`AssemblyReport`] or a [`ResolvedRing`].
//!
//! # Example
//!
//! ```ignore
//! use osm_context_topology::{AssemblerOptions, NodeIndex, TopologyAssembler};
//!
//! let assembly = TopologyAssembler::new(AssemblerOptions::buildings()).assemble(&features);
//! let index = NodeIndex::new(&features.nodes);
//! for ring in &assembly.rings {
//!     let resolved = index.resolve(ring);
//!     println!("{} points, closed: {}", resolved.positions.len(), resolved.closed);
//! }
//! ```

mod assembler;
mod attributes;
mod resolve;
mod split;

pub use assembler::{Assembly, AssemblerOptions, AssemblyReport, RoleFilter, TopologyAssembler};
pub use attributes::{parse_numeric, resolve_height, HeightDefaults, HeightSource, ResolvedHeight};
pub use resolve::{NodeIndex, ResolvedRing};
pub use split::{split_rings, split_self_intersections};

pub use osm_context_model::{FeatureSet, NodeId, Ring, Tags};
