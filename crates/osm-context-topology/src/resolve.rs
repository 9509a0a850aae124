// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node id to position lookup

use osm_context_model::{GeoPoint, Node, NodeId, Ring};
use rustc_hash::FxHashMap;

/// Positions of a ring after node lookup
#[derive(Clone, PartialEq, Debug, Default)]
pub struct ResolvedRing {
    /// Resolved positions, without the duplicated closing point
    pub positions: Vec<GeoPoint>,
    /// Whether the source ring was closed
    pub closed: bool,
    /// References that had no node
    pub missing: Vec<NodeId>,
}

impl ResolvedRing {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Fast node lookup built once per feature set
#[derive(Clone, Debug, Default)]
pub struct NodeIndex {
    positions: FxHashMap<NodeId, GeoPoint>,
}

impl NodeIndex {
    pub fn new(nodes: &[Node]) -> Self {
        let mut positions = FxHashMap::default();
        positions.reserve(nodes.len());
        for node in nodes {
            positions.insert(node.id, node.position);
        }
        Self { positions }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<GeoPoint> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Look up every node of a ring, skipping unknown references
    pub fn resolve(&self, ring: &Ring) -> ResolvedRing {
        let mut resolved = ResolvedRing {
            positions: Vec::with_capacity(ring.len()),
            closed: ring.is_closed(),
            missing: Vec::new(),
        };

        for &id in ring.open_ids() {
            match self.get(id) {
                Some(position) => resolved.positions.push(position),
                None => resolved.missing.push(id),
            }
        }

        if !resolved.missing.is_empty() {
            log::debug!(
                "Ring skipped {} unknown node references (first: {})",
                resolved.missing.len(),
                resolved.missing[0]
            );
        }

        resolved
    }
}
