// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for 2D polygons, plus conversion of face-loop
//! meshes into triangle buffers.

use crate::{Error, Mesh, MeshData, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f64;
    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            if sign == 0.0 {
                sign = cross.signum();
            } else if sign != cross.signum() {
                return false;
            }
        }
    }
    true
}

fn flatten(points: impl IntoIterator<Item = Point2<f64>>, capacity: usize) -> Vec<f64> {
    let mut vertices = Vec::with_capacity(capacity * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }
    vertices
}

/// Triangulate a simple polygon (no holes)
///
/// Returns triangle indices into the input points.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::triangulation(
            "Need at least 3 points to triangulate",
        ));
    }

    // FAST PATH: triangles and small convex loops fan out from vertex 0
    if n == 3 || (n <= 8 && is_convex(points)) {
        return Ok((1..n - 1).flat_map(|i| [0, i, i + 1]).collect());
    }

    let vertices = flatten(points.iter().copied(), n);
    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::triangulation(format!("{:?}", e)))
}

/// Triangulate a polygon with holes
///
/// Returns triangle indices into the combined vertex array (outer, then each
/// hole in order).
///
/// # Errors
/// `Error::Triangulation` when the outer boundary or any hole has fewer
/// than 3 points.
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::triangulation(
            "Need at least 3 points in outer boundary",
        ));
    }

    if holes.iter().any(|h| h.len() < 3) {
        return Err(Error::triangulation("Hole with fewer than 3 points"));
    }
    if holes.is_empty() {
        return triangulate_polygon(outer);
    }

    let total_points = outer.len() + holes.iter().map(Vec::len).sum::<usize>();
    let vertices = flatten(
        outer.iter().chain(holes.iter().flatten()).copied(),
        total_points,
    );

    let mut hole_indices = Vec::with_capacity(holes.len());
    let mut start = outer.len();
    for hole in holes {
        hole_indices.push(start);
        start += hole.len();
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::triangulation(format!("{:?}", e)))
}

/// Project 3D points onto the plane with the given normal
///
/// The first point becomes the 2D origin.
pub fn project_to_2d(points_3d: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points_3d.first() else {
        return Vec::new();
    };

    // Reference axis least aligned with the normal
    let reference = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Calculate the normal of a polygon from its vertices
///
/// Newell's method; falls back to +Z for degenerate loops.
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    if n < 3 {
        return Vector3::z();
    }

    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    let len = normal.norm();
    if len > 1e-10 {
        normal / len
    } else {
        Vector3::z()
    }
}

/// Convert face loops into a flat-shaded triangle buffer
///
/// Every face gets its own vertices carrying the face normal. Triangles keep
/// the winding of their source loop. Faces that fail to triangulate are
/// skipped.
pub fn mesh_to_mesh_data(mesh: &Mesh) -> MeshData {
    let mut data = MeshData::with_capacity(mesh.vertex_count(), mesh.face_count() * 6);
    let mut skipped = 0usize;

    for face in 0..mesh.face_count() {
        let points: Vec<Point3<f64>> = mesh
            .face_positions(face)
            .iter()
            .map(|p| Point3::new(p[0], p[1], p[2]))
            .collect();
        if points.len() < 3 {
            skipped += 1;
            continue;
        }

        let normal = calculate_polygon_normal(&points);
        let indices = match triangulate_polygon(&project_to_2d(&points, &normal)) {
            Ok(indices) => indices,
            Err(e) => {
                log::debug!("Skipping face {}: {}", face, e);
                skipped += 1;
                continue;
            }
        };

        let base = data.vertex_count() as u32;
        for p in &points {
            data.positions.extend([p.x as f32, p.y as f32, p.z as f32]);
            data.normals
                .extend([normal.x as f32, normal.y as f32, normal.z as f32]);
        }

        for tri in indices.chunks_exact(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let winding = (points[b] - points[a]).cross(&(points[c] - points[a]));
            if winding.dot(&normal) < 0.0 {
                data.indices
                    .extend([base + a as u32, base + c as u32, base + b as u32]);
            } else {
                data.indices
                    .extend([base + a as u32, base + b as u32, base + c as u32]);
            }
        }
    }

    if skipped > 0 {
        log::debug!("{} faces could not be triangulated", skipped);
    }
    data
}
