// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion of footprint rings into capped prisms

use crate::error::{Error, Result};
use crate::orientation::{fix_orientation, orientation_sum};
use crate::{Mesh, Point2};

/// Orientation sums below this are treated as zero-area rings
const AREA_EPSILON: f64 = 1e-12;

/// Extrude a closed 2D ring along Z
///
/// The ring must not repeat its first point at the end. The mesh has one
/// bottom cap at z = 0, one top cap at z = `height` wound opposite to the
/// bottom, and one quad per ring edge. Side quads get their own vertices so
/// each face can be shaded flat.
///
/// A negative height extrudes downward; every loop is then reversed so the
/// faces still point away from the solid.
pub fn extrude_ring(ring: &[Point2<f64>], height: f64, color: u32) -> Result<Mesh> {
    let n = ring.len();
    if n < 3 {
        return Err(Error::malformed(format!(
            "Ring needs at least 3 points, got {}",
            n
        )));
    }
    if !height.is_finite() || height == 0.0 {
        return Err(Error::degenerate(format!("Unusable extrusion height {}", height)));
    }
    if orientation_sum(ring).abs() < AREA_EPSILON {
        return Err(Error::degenerate("Ring encloses no area"));
    }

    let mut mesh = Mesh::with_capacity(n * 6, n + 2);

    // Bottom
    let mut bottom: Vec<u32> = ring
        .iter()
        .map(|p| mesh.push_vertex([p.x, p.y, 0.0], color))
        .collect();
    let inverted = fix_orientation(ring, &mut bottom);

    // Top
    let mut top: Vec<u32> = ring
        .iter()
        .map(|p| mesh.push_vertex([p.x, p.y, height], color))
        .collect();
    fix_orientation(ring, &mut top);
    top.reverse();

    mesh.push_face(bottom);
    mesh.push_face(top);

    // Sides
    for (i, current) in ring.iter().enumerate() {
        let next = &ring[(i + 1) % n];
        let corners = if inverted {
            [
                [current.x, current.y, 0.0],
                [next.x, next.y, 0.0],
                [next.x, next.y, height],
                [current.x, current.y, height],
            ]
        } else {
            [
                [current.x, current.y, 0.0],
                [current.x, current.y, height],
                [next.x, next.y, height],
                [next.x, next.y, 0.0],
            ]
        };
        let quad = corners
            .iter()
            .map(|&corner| mesh.push_vertex(corner, color))
            .collect();
        mesh.push_face(quad);
    }

    if height < 0.0 {
        for face in &mut mesh.faces {
            face.reverse();
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    /// Newell normal of one face, in mesh coordinates
    fn face_normal(mesh: &Mesh, face: usize) -> Vector3<f64> {
        let points = mesh.face_positions(face);
        let mut normal = Vector3::zeros();
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            normal.x += (p[1] - q[1]) * (p[2] + q[2]);
            normal.y += (p[2] - q[2]) * (p[0] + q[0]);
            normal.z += (p[0] - q[0]) * (p[1] + q[1]);
        }
        normal.normalize()
    }

    #[test]
    fn test_unit_square_face_count() {
        let mesh = extrude_ring(&unit_square(), 3.0, 7).unwrap();
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.faces[0], vec![3, 2, 1, 0]);
        assert_eq!(mesh.faces[1], vec![4, 5, 6, 7]);
        assert!(mesh.colors.iter().all(|&c| c == 7));

        let mut unique: Vec<[i64; 3]> = (0..mesh.vertex_count())
            .filter_map(|i| mesh.vertex(i))
            .map(|v| [v[0] as i64, v[1] as i64, v[2] as i64])
            .collect();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_caps_are_reversed() {
        for ring in [unit_square(), unit_square().into_iter().rev().collect()] {
            let mesh = extrude_ring(&ring, 3.0, 0).unwrap();
            let n = ring.len() as u32;
            let bottom = mesh.faces[0].clone();
            let mut top: Vec<u32> = mesh.faces[1].iter().map(|i| i - n).collect();
            top.reverse();
            assert_eq!(bottom, top);
        }
    }

    #[test]
    fn test_normals_point_outward() {
        for ring in [unit_square(), unit_square().into_iter().rev().collect()] {
            let mesh = extrude_ring(&ring, 2.0, 0).unwrap();
            assert_relative_eq!(face_normal(&mesh, 0).z, -1.0, epsilon = 1e-12);
            assert_relative_eq!(face_normal(&mesh, 1).z, 1.0, epsilon = 1e-12);

            for face in 2..mesh.face_count() {
                let normal = face_normal(&mesh, face);
                let points = mesh.face_positions(face);
                let mid_x = points.iter().map(|p| p[0]).sum::<f64>() / 4.0;
                let mid_y = points.iter().map(|p| p[1]).sum::<f64>() / 4.0;
                let outward = Vector3::new(mid_x - 0.5, mid_y - 0.5, 0.0);
                assert!(normal.dot(&outward) > 0.0);
            }
        }
    }

    #[test]
    fn test_negative_height_keeps_outward_caps() {
        let mesh = extrude_ring(&unit_square(), -3.0, 0).unwrap();
        assert_eq!(mesh.face_count(), 6);
        // Face 0 sits at z = 0, now the upper face of the solid
        assert_relative_eq!(face_normal(&mesh, 0).z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(face_normal(&mesh, 1).z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_short_and_flat_rings() {
        let short = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(matches!(
            extrude_ring(&short, 3.0, 0),
            Err(Error::MalformedInput(_))
        ));

        let collinear = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(matches!(
            extrude_ring(&collinear, 3.0, 0),
            Err(Error::DegenerateGeometry(_))
        ));
    }
}
