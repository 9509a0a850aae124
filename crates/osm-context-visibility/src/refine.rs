// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Isovist computation - coarse cast followed by adaptive refinement
//!
//! The coarse pass casts a cone of rays from the query origin. Each
//! refinement pass then takes the hits retained by the previous pass and
//! casts a small jittered ring of rays around the direction of every hit,
//! against the hit's own mesh and its nearby meshes only. The ring's
//! half-angle halves from pass to pass.

use crate::bundle::RayBundle;
use crate::caster::{cast_rays, nearest_hits, CandidateMesh, CastOutput, CastStats, Ray, VisibilityHit};
use crate::options::VisibilityOptions;
use crate::pruner::{group_by_mesh, nearby_meshes};
use osm_context_geometry::{Error, Point3, Result, Vector3};
use osm_context_model::{Mesh, PointCloud};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Outcome of one pass
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PassSummary {
    /// Cone half-angle for the coarse pass, ring half-angle afterwards
    pub half_angle_degrees: f64,
    pub rays: usize,
    /// Hits retained after the nearest-per-ray reduction
    pub hits: usize,
    pub stats: CastStats,
}

/// Sampled isovist of one origin
#[derive(Clone, Debug)]
pub struct Isovist {
    pub origin: Point3<f64>,
    /// Retained hits of every pass; ray ids are unique across passes
    pub hits: Vec<VisibilityHit>,
    /// Coarse pass first
    pub passes: Vec<PassSummary>,
}

impl Isovist {
    pub fn to_point_cloud(&self, color: u32) -> PointCloud {
        let mut cloud = PointCloud::default();
        for hit in &self.hits {
            cloud.push([hit.position.x, hit.position.y, hit.position.z], color);
        }
        cloud
    }

    /// Hits partitioned by source mesh, meshes in order of first hit
    pub fn by_mesh(&self) -> Vec<(usize, Vec<VisibilityHit>)> {
        group_by_mesh(&self.hits)
    }

    /// Number of refinement passes that ran
    pub fn refinement_passes(&self) -> usize {
        self.passes.len().saturating_sub(1)
    }
}

/// Casts isovists against a fixed set of meshes
///
/// Meshes are reduced to planar faces once, so an engine can answer many
/// queries. Mesh ids in the results are indices into the input slice.
pub struct IsovistEngine {
    meshes: Vec<CandidateMesh>,
    options: VisibilityOptions,
}

impl IsovistEngine {
    /// Prepare meshes for casting
    ///
    /// # Errors
    /// `Error::Configuration` when the options do not validate.
    pub fn new(meshes: &[Mesh], options: VisibilityOptions) -> Result<Self> {
        options.validate()?;
        let meshes: Vec<CandidateMesh> = meshes
            .iter()
            .enumerate()
            .map(|(id, mesh)| CandidateMesh::new(id, mesh))
            .collect();
        let faces: usize = meshes.iter().map(|m| m.faces().len()).sum();
        log::debug!("Isovist engine: {} meshes, {} planar faces", meshes.len(), faces);
        Ok(Self { meshes, options })
    }

    pub fn options(&self) -> &VisibilityOptions {
        &self.options
    }

    pub fn meshes(&self) -> &[CandidateMesh] {
        &self.meshes
    }

    /// Compute the isovist seen from `origin` looking along `direction`
    pub fn compute(&self, origin: Point3<f64>, direction: Vector3<f64>) -> Result<Isovist> {
        if !origin.coords.iter().all(|c| c.is_finite()) {
            return Err(Error::malformed(format!("Isovist origin is not finite: {:?}", origin)));
        }

        let options = &self.options;
        let all: Vec<&CandidateMesh> = self.meshes.iter().collect();

        let rays: Vec<Ray> = RayBundle::cone(&direction, options.half_angle_degrees, options.step_degrees)?
            .enumerate()
            .map(|(id, direction)| Ray { id, direction })
            .collect();
        let mut next_ray_id = rays.len();

        let coarse = cast_rays(&origin, &rays, &all, options);
        let mut current = nearest_hits(&coarse.points, options.min_hit_distance);
        let mut passes = vec![PassSummary {
            half_angle_degrees: options.half_angle_degrees,
            rays: rays.len(),
            hits: current.len(),
            stats: coarse.stats,
        }];
        log::info!(
            "Coarse pass: {} rays, {} hits ({} parallel, {} backward, {} outside)",
            rays.len(),
            current.len(),
            coarse.stats.parallel,
            coarse.stats.backward,
            coarse.stats.outside
        );

        let mut hits = current.clone();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut previous_angle = options.step_degrees;
        for pass in 1..=options.max_passes {
            if current.is_empty() {
                break;
            }
            let angle = (previous_angle / 2.0).max(options.min_half_angle_degrees);
            if angle >= previous_angle {
                log::debug!("Refinement converged at {} degrees", previous_angle);
                break;
            }

            let output = self.refine(&origin, &current, angle, next_ray_id, &mut rng)?;
            next_ray_id += current.len() * options.refinement_rays;

            current = nearest_hits(&output.points, options.min_hit_distance);
            log::info!(
                "Refinement pass {} at {:.3} degrees: {} rays, {} hits",
                pass,
                angle,
                output.stats.rays,
                current.len()
            );
            passes.push(PassSummary {
                half_angle_degrees: angle,
                rays: output.stats.rays,
                hits: current.len(),
                stats: output.stats,
            });
            hits.extend_from_slice(&current);
            previous_angle = angle;
        }

        Ok(Isovist {
            origin,
            hits,
            passes,
        })
    }

    /// Cast one refinement ring around every seed hit
    fn refine(
        &self,
        origin: &Point3<f64>,
        seeds: &[VisibilityHit],
        half_angle_degrees: f64,
        first_ray_id: usize,
        rng: &mut StdRng,
    ) -> Result<CastOutput> {
        let options = &self.options;
        let nearby = nearby_meshes(seeds);

        // Drawn up front so the result does not depend on scheduling
        let offsets: Vec<f64> = if options.refinement_jitter_degrees > 0.0 {
            let jitter = Uniform::new(0.0, options.refinement_jitter_degrees);
            seeds.iter().map(|_| jitter.sample(rng)).collect()
        } else {
            vec![0.0; seeds.len()]
        };

        let inner = VisibilityOptions {
            parallel: false,
            ..options.clone()
        };

        let cast_seed = |i: usize| -> Result<CastOutput> {
            let seed = &seeds[i];
            let mut candidates: Vec<&CandidateMesh> = Vec::with_capacity(nearby[i].len() + 1);
            candidates.extend(self.meshes.get(seed.mesh_id));
            candidates.extend(
                nearby[i]
                    .iter()
                    .filter(|&&id| id != seed.mesh_id)
                    .filter_map(|&id| self.meshes.get(id)),
            );

            let axis = seed.position - origin;
            let base = first_ray_id + i * options.refinement_rays;
            let rays: Vec<Ray> =
                RayBundle::refinement(&axis, half_angle_degrees, options.refinement_rays, offsets[i])?
                    .enumerate()
                    .map(|(k, direction)| Ray {
                        id: base + k,
                        direction,
                    })
                    .collect();

            Ok(cast_rays(origin, &rays, &candidates, &inner))
        };

        let outputs: Vec<CastOutput> = if options.parallel {
            (0..seeds.len()).into_par_iter().map(cast_seed).collect::<Result<_>>()?
        } else {
            (0..seeds.len()).map(cast_seed).collect::<Result<_>>()?
        };

        let mut merged = CastOutput::default();
        for output in outputs {
            merged.points.extend(output.points);
            merged.stats.merge(&output.stats);
        }
        Ok(merged)
    }
}
