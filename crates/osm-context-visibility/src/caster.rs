// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray casting against planar mesh faces

use crate::options::{DirectionCheck, VisibilityOptions};
use osm_context_geometry::{normalize, PlanarPolygon, Point3, Vector3};
use osm_context_model::Mesh;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Mesh reduced to its planar faces, ready for casting
#[derive(Clone, Debug)]
pub struct CandidateMesh {
    pub id: usize,
    faces: Vec<PlanarPolygon>,
    /// Faces dropped because they have no plane
    pub degenerate_faces: usize,
}

impl CandidateMesh {
    pub fn new(id: usize, mesh: &Mesh) -> Self {
        let mut faces = Vec::with_capacity(mesh.face_count());
        let mut degenerate_faces = 0;
        for face in 0..mesh.face_count() {
            let points: Vec<Point3<f64>> = mesh
                .face_positions(face)
                .iter()
                .map(|p| Point3::new(p[0], p[1], p[2]))
                .collect();
            match PlanarPolygon::new(&points) {
                Some(polygon) => faces.push(polygon),
                None => degenerate_faces += 1,
            }
        }
        if degenerate_faces > 0 {
            log::debug!("Mesh {} has {} faces without a plane", id, degenerate_faces);
        }
        Self {
            id,
            faces,
            degenerate_faces,
        }
    }

    pub fn faces(&self) -> &[PlanarPolygon] {
        &self.faces
    }
}

/// Direction with its identity inside the current bundle
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Ray {
    pub id: usize,
    pub direction: Vector3<f64>,
}

/// One candidate hit of one ray against one mesh
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RayPoint {
    pub position: Point3<f64>,
    pub ray_id: usize,
    pub mesh_id: usize,
    /// Euclidean distance from the ray origin
    pub distance: f64,
}

/// Nearest retained hit of one ray
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct VisibilityHit {
    pub position: Point3<f64>,
    pub ray_id: usize,
    pub mesh_id: usize,
    pub distance: f64,
}

impl From<RayPoint> for VisibilityHit {
    fn from(point: RayPoint) -> Self {
        Self {
            position: point.position,
            ray_id: point.ray_id,
            mesh_id: point.mesh_id,
            distance: point.distance,
        }
    }
}

/// Counters for one cast
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CastStats {
    pub rays: usize,
    /// Ray/face pairs tested
    pub tests: usize,
    /// Rays parallel to a face plane
    pub parallel: usize,
    /// Plane hits behind the origin
    pub backward: usize,
    /// Plane hits outside the face outline
    pub outside: usize,
    /// Accepted hits, before the nearest-per-ray reduction
    pub hits: usize,
}

impl CastStats {
    pub fn merge(&mut self, other: &CastStats) {
        self.rays += other.rays;
        self.tests += other.tests;
        self.parallel += other.parallel;
        self.backward += other.backward;
        self.outside += other.outside;
        self.hits += other.hits;
    }
}

/// Hits of a cast plus its counters
#[derive(Clone, Debug, Default)]
pub struct CastOutput {
    pub points: Vec<RayPoint>,
    pub stats: CastStats,
}

impl CastOutput {
    fn merge(mut self, other: CastOutput) -> Self {
        self.points.extend(other.points);
        self.stats.merge(&other.stats);
        self
    }
}

/// Whether a plane hit lies ahead of the origin along `direction`
fn is_ahead(check: DirectionCheck, direction: &Vector3<f64>, offset: &Vector3<f64>) -> bool {
    match check {
        DirectionCheck::Dot => direction.dot(offset) > 0.0,
        DirectionCheck::ComponentWise => {
            let d = normalize(direction).unwrap_or_else(Vector3::zeros);
            let o = normalize(offset).unwrap_or_else(Vector3::zeros);
            d.x * o.x >= 0.0 && d.y * o.y >= 0.0 && d.z * o.z >= 0.0
        }
    }
}

/// Cast one ray against every face of the given meshes
pub fn cast_ray(
    origin: &Point3<f64>,
    ray: &Ray,
    meshes: &[&CandidateMesh],
    options: &VisibilityOptions,
) -> CastOutput {
    let mut out = CastOutput::default();
    out.stats.rays = 1;

    for mesh in meshes {
        for face in mesh.faces() {
            out.stats.tests += 1;

            let Some(hit) = face.plane().intersect_ray(origin, &ray.direction, options.epsilon) else {
                out.stats.parallel += 1;
                continue;
            };

            let offset = hit - origin;
            if !is_ahead(options.direction_check, &ray.direction, &offset) {
                out.stats.backward += 1;
                continue;
            }

            if !face.contains(&hit) {
                out.stats.outside += 1;
                continue;
            }

            out.stats.hits += 1;
            out.points.push(RayPoint {
                position: hit,
                ray_id: ray.id,
                mesh_id: mesh.id,
                distance: offset.norm(),
            });
        }
    }
    out
}

/// Cast a set of rays from one origin
///
/// Points come back grouped by ray in input order, whether or not the cast
/// ran in parallel.
pub fn cast_rays(
    origin: &Point3<f64>,
    rays: &[Ray],
    meshes: &[&CandidateMesh],
    options: &VisibilityOptions,
) -> CastOutput {
    if options.parallel {
        rays.par_iter()
            .map(|ray| cast_ray(origin, ray, meshes, options))
            .collect::<Vec<_>>()
            .into_iter()
            .fold(CastOutput::default(), CastOutput::merge)
    } else {
        rays.iter()
            .map(|ray| cast_ray(origin, ray, meshes, options))
            .fold(CastOutput::default(), CastOutput::merge)
    }
}

/// Keep the nearest point per ray, ignoring points within `min_distance`
///
/// Result is sorted by ray id. Ties keep the first point seen.
pub fn nearest_hits(points: &[RayPoint], min_distance: f64) -> Vec<VisibilityHit> {
    let mut nearest: FxHashMap<usize, RayPoint> = FxHashMap::default();
    for point in points.iter().filter(|p| p.distance > min_distance) {
        nearest
            .entry(point.ray_id)
            .and_modify(|best| {
                if point.distance < best.distance {
                    *best = *point;
                }
            })
            .or_insert(*point);
    }

    let mut hits: Vec<VisibilityHit> = nearest.into_values().map(VisibilityHit::from).collect();
    hits.sort_by_key(|h| h.ray_id);
    hits
}
