// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting of self-intersecting road rings
//!
//! A ring that visits a node twice (other than closing on its start) is cut
//! into open sub-rings. Each cut starts the next sub-ring at the node before
//! the repeat, so every edge of the parent survives in exactly one sub-ring.

use osm_context_model::{NodeId, Ring};
use rustc_hash::FxHashSet;

/// Split one ring at repeated nodes
///
/// Rings tagged `area=yes` are returned whole. Sub-rings keep the parent's
/// tags and always have at least two nodes.
pub fn split_self_intersections(ring: &Ring) -> Vec<Ring> {
    if ring.tags.is_area() {
        return vec![ring.clone()];
    }

    let mut ids = ring.node_ids.clone();
    ids.dedup();

    let open_len = if ids.len() > 1 && ids[0] == ids[ids.len() - 1] {
        ids.len() - 1
    } else {
        ids.len()
    };
    if !has_repetition(&ids[..open_len]) {
        return vec![ring.clone()];
    }

    let mut parts: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();

    for (i, &id) in ids.iter().enumerate() {
        if seen.contains(&id) {
            // `seen` is non-empty, so there is a previous node
            let previous = ids[i - 1];
            let finished = std::mem::take(&mut current);
            if finished.len() > 1 {
                parts.push(finished);
            }
            seen.clear();
            current.push(previous);
            seen.insert(previous);
        }
        current.push(id);
        seen.insert(id);
    }
    if current.len() > 1 {
        parts.push(current);
    }

    log::debug!(
        "Split self-intersecting ring of {} nodes into {} parts",
        ring.node_ids.len(),
        parts.len()
    );

    parts
        .into_iter()
        .map(|node_ids| Ring::new(node_ids, ring.tags.clone()))
        .collect()
}

/// Split every ring of a batch, preserving order
pub fn split_rings(rings: &[Ring]) -> Vec<Ring> {
    rings.iter().flat_map(split_self_intersections).collect()
}

fn has_repetition(ids: &[NodeId]) -> bool {
    let mut seen = FxHashSet::default();
    !ids.iter().all(|id| seen.insert(*id))
}
