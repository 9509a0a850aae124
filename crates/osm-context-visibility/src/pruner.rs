// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Candidate pruning between refinement passes

use crate::caster::VisibilityHit;
use rustc_hash::FxHashMap;

/// For each hit, the meshes hit near it
///
/// A mesh counts as near when its hit lies closer than twice the distance
/// to the nearest other hit. Coincident hits are ignored. The hit's own mesh
/// is included only if another of its hits qualifies.
pub fn nearby_meshes(hits: &[VisibilityHit]) -> Vec<Vec<usize>> {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let distances: Vec<(usize, f64)> = hits
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| (other.mesh_id, (other.position - hit.position).norm()))
                .filter(|(_, d)| *d > 0.0)
                .collect();

            let Some(min) = distances.iter().map(|(_, d)| *d).min_by(f64::total_cmp) else {
                return Vec::new();
            };

            let mut meshes: Vec<usize> = distances
                .iter()
                .filter(|(_, d)| *d < 2.0 * min)
                .map(|(mesh, _)| *mesh)
                .collect();
            meshes.sort_unstable();
            meshes.dedup();
            meshes
        })
        .collect()
}

/// Group hits by mesh, meshes in order of first appearance
pub fn group_by_mesh(hits: &[VisibilityHit]) -> Vec<(usize, Vec<VisibilityHit>)> {
    let mut slots: FxHashMap<usize, usize> = FxHashMap::default();
    let mut groups: Vec<(usize, Vec<VisibilityHit>)> = Vec::new();
    for hit in hits {
        let slot = *slots.entry(hit.mesh_id).or_insert_with(|| {
            groups.push((hit.mesh_id, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(*hit);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm_context_geometry::Point3;

    fn hit(ray_id: usize, mesh_id: usize, x: f64) -> VisibilityHit {
        VisibilityHit {
            position: Point3::new(x, 0.0, 0.0),
            ray_id,
            mesh_id,
            distance: 1.0,
        }
    }

    #[test]
    fn test_nearby_uses_twice_the_minimum() {
        let hits = [hit(0, 1, 0.0), hit(1, 2, 1.0), hit(2, 3, 1.5), hit(3, 4, 5.0)];
        let nearby = nearby_meshes(&hits);

        // From x = 0: nearest 1.0, so anything under 2.0
        assert_eq!(nearby[0], vec![2, 3]);
        // From x = 1: nearest 0.5, so under 1.0 only
        assert_eq!(nearby[1], vec![3]);
        // From x = 5: nearest 3.5, under 7.0 covers all
        assert_eq!(nearby[3], vec![1, 2, 3]);
    }

    #[test]
    fn test_coincident_and_lonely_hits() {
        assert_eq!(nearby_meshes(&[hit(0, 1, 0.0)]), vec![Vec::<usize>::new()]);

        let hits = [hit(0, 1, 0.0), hit(1, 2, 0.0), hit(2, 3, 2.0)];
        let nearby = nearby_meshes(&hits);
        assert_eq!(nearby[0], vec![3]);
    }

    #[test]
    fn test_group_keeps_first_seen_order() {
        let hits = [hit(0, 5, 0.0), hit(1, 2, 0.0), hit(2, 5, 1.0), hit(3, 9, 0.0)];
        let groups = group_by_mesh(&hits);
        let order: Vec<usize> = groups.iter().map(|(mesh, _)| *mesh).collect();
        assert_eq!(order, vec![5, 2, 9]);
        assert_eq!(groups[0].1.iter().map(|h| h.ray_id).collect::<Vec<_>>(), vec![0, 2]);
    }
}
