// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output geometry: face-loop meshes, triangle buffers, polylines, point clouds

use serde::{Deserialize, Serialize};

/// Pack an ARGB colour into a single integer
#[inline]
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Colours assigned to generated geometry (ARGB)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub building: u32,
    pub road: u32,
    pub visibility: u32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            building: argb(255, 230, 230, 230),
            road: argb(255, 50, 50, 50),
            visibility: argb(255, 255, 10, 10),
        }
    }
}

/// Polygon mesh in local planar coordinates
///
/// Faces are loops of vertex indices. Every vertex carries one colour.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions as flattened [x, y, z, x, y, z, ...]
    pub vertices: Vec<f64>,
    /// Face loops
    pub faces: Vec<Vec<u32>>,
    /// Per-vertex ARGB colours
    pub colors: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mesh with pre-allocated capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count * 3),
            faces: Vec::with_capacity(face_count),
            colors: Vec::with_capacity(vertex_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Append a vertex and return its index
    pub fn push_vertex(&mut self, position: [f64; 3], color: u32) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&position);
        self.colors.push(color);
        index
    }

    pub fn push_face(&mut self, face: Vec<u32>) {
        self.faces.push(face);
    }

    pub fn vertex(&self, index: usize) -> Option<[f64; 3]> {
        let base = index * 3;
        self.vertices
            .get(base..base + 3)
            .map(|v| [v[0], v[1], v[2]])
    }

    /// Positions of one face loop, skipping out-of-range indices
    pub fn face_positions(&self, face: usize) -> Vec<[f64; 3]> {
        self.faces
            .get(face)
            .map(|loop_| {
                loop_
                    .iter()
                    .filter_map(|&i| self.vertex(i as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &Mesh) {
        let vertex_offset = self.vertex_count() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.colors.extend_from_slice(&other.colors);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| f.iter().map(|i| i + vertex_offset).collect()),
        );
    }
}

/// Triangle mesh data for rendering
///
/// Contains flattened vertex data suitable for GPU upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions as flattened [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals as flattened [nx, ny, nz, nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mesh with pre-allocated capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Road centerline in local coordinates
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<[f64; 3]>,
    pub closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<[f64; 3]>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length including the closing segment when closed
    pub fn length(&self) -> f64 {
        let dist = |a: &[f64; 3], b: &[f64; 3]| {
            ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt()
        };
        let open: f64 = self.points.windows(2).map(|w| dist(&w[0], &w[1])).sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 2 => open + dist(last, first),
            _ => open,
        }
    }
}

/// Coloured point samples
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<[f64; 3]>,
    pub colors: Vec<u32>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: [f64; 3], color: u32) {
        self.points.push(point);
        self.colors.push(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_packing() {
        assert_eq!(argb(255, 0, 0, 0), 0xFF00_0000);
        assert_eq!(Palette::default().road, 0xFF32_3232);
    }

    #[test]
    fn test_mesh_merge_offsets_faces() {
        let mut a = Mesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            a.push_vertex(p, 1);
        }
        a.push_face(vec![0, 1, 2]);
        let b = a.clone();
        a.merge(&b);

        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.faces[1], vec![3, 4, 5]);
        assert_eq!(a.colors.len(), 6);
        assert_eq!(a.face_positions(1)[1], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_polyline_length() {
        let square = Polyline::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            true,
        );
        assert!((square.length() - 4.0).abs() < 1e-12);

        let open = Polyline::new(square.points.clone(), false);
        assert!((open.length() - 3.0).abs() < 1e-12);
    }
}
