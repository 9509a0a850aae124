// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Isovists against small hand-built scenes

use approx::assert_relative_eq;
use osm_context_geometry::{extrude_ring, Point2};
use osm_context_model::Mesh;
use osm_context_visibility::*;

/// Horizontal unit square at z = 0
fn ground_tile() -> Mesh {
    let mut mesh = Mesh::new();
    for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]] {
        mesh.push_vertex(p, 0);
    }
    mesh.push_face(vec![0, 1, 2, 3]);
    mesh
}

fn block(x: f64, y: f64, width: f64, depth: f64, height: f64) -> Mesh {
    let ring = [
        Point2::new(x, y),
        Point2::new(x + width, y),
        Point2::new(x + width, y + depth),
        Point2::new(x, y + depth),
    ];
    extrude_ring(&ring, height, 0).unwrap()
}

#[test]
fn looking_down_hits_the_tile_below() {
    let options = VisibilityOptions::default().with_cone(0.0, 10.0).with_max_passes(0);
    let engine = IsovistEngine::new(&[ground_tile()], options).unwrap();
    let isovist = engine
        .compute(Point3::new(0.5, 0.5, 5.0), Vector3::new(0.0, 0.0, -5.0))
        .unwrap();

    assert_eq!(isovist.hits.len(), 1);
    assert_relative_eq!(isovist.hits[0].position, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
    assert_relative_eq!(isovist.hits[0].distance, 5.0, epsilon = 1e-12);
}

#[test]
fn refinement_angles_never_grow_and_terminate() {
    let meshes = [block(10.0, -10.0, 5.0, 20.0, 15.0), block(-3.0, 8.0, 6.0, 4.0, 6.0)];
    let options = VisibilityOptions {
        max_passes: 50,
        min_half_angle_degrees: 0.5,
        ..VisibilityOptions::default().with_seed(11)
    };
    let engine = IsovistEngine::new(&meshes, options).unwrap();
    let isovist = engine.compute(Point3::new(0.0, 0.0, 1.5), Vector3::x()).unwrap();

    // 10 -> 5 -> 2.5 -> 1.25 -> 0.625 -> 0.5, then no further shrink
    assert!(isovist.refinement_passes() <= 5);
    let angles: Vec<f64> = isovist.passes[1..].iter().map(|p| p.half_angle_degrees).collect();
    for pair in angles.windows(2) {
        assert!(pair[1] < pair[0]);
    }
    assert!(angles.iter().all(|&a| a >= 0.5));
}

#[test]
fn seeded_runs_are_reproducible() {
    let meshes = [block(8.0, -4.0, 4.0, 8.0, 10.0), block(4.0, 6.0, 3.0, 3.0, 4.0)];
    let options = VisibilityOptions::default().with_seed(42);

    let first = IsovistEngine::new(&meshes, options.clone())
        .unwrap()
        .compute(Point3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.3, 0.0))
        .unwrap();
    let second = IsovistEngine::new(&meshes, options.with_parallel(false))
        .unwrap()
        .compute(Point3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.3, 0.0))
        .unwrap();

    assert_eq!(first.hits, second.hits);
    assert_eq!(first.passes, second.passes);
}

#[test]
fn hidden_block_is_not_seen() {
    // A tall wall in front, a lower block straight behind it
    let meshes = [block(5.0, -20.0, 1.0, 40.0, 30.0), block(10.0, -1.0, 2.0, 2.0, 2.0)];
    let options = VisibilityOptions::default().with_seed(5).with_cone(30.0, 10.0);
    let engine = IsovistEngine::new(&meshes, options).unwrap();
    let isovist = engine.compute(Point3::new(0.0, 0.0, 1.0), Vector3::x()).unwrap();

    assert!(!isovist.hits.is_empty());
    let groups = isovist.by_mesh();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, 0);
}

#[test]
fn refinement_casts_only_against_nearby_meshes() {
    // Mesh 0 fills the view, mesh 1 sits behind the observer
    let meshes = [block(10.0, -10.0, 5.0, 20.0, 15.0), block(-20.0, -2.0, 4.0, 4.0, 4.0)];
    let options = VisibilityOptions::default().with_seed(7).with_cone(30.0, 10.0);
    let engine = IsovistEngine::new(&meshes, options).unwrap();
    let faces: Vec<usize> = engine.meshes().iter().map(|m| m.faces().len()).collect();
    assert_eq!(faces, vec![6, 6]);

    let isovist = engine.compute(Point3::new(0.0, 0.0, 1.5), Vector3::x()).unwrap();

    // The coarse cone tests every face of every mesh
    let coarse = &isovist.passes[0];
    assert_eq!(coarse.stats.tests, coarse.rays * 12);

    // Refinement rings around hits on mesh 0 never consider mesh 1
    assert!(isovist.refinement_passes() > 0);
    for pass in &isovist.passes[1..] {
        assert!(pass.rays > 0);
        assert_eq!(pass.stats.tests, pass.rays * 6);
    }
    assert!(isovist.hits.iter().all(|h| h.mesh_id == 0));
}
