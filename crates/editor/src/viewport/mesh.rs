use glam::Vec3;

use crate::error::{EditorError, Result};

/// Indexed triangle geometry as stored on a scene object.
///
/// 3 floats per position and per normal, 3 indices per triangle.
/// An empty buffer counts as missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fail with `MissingGeometryData` unless index, position and normal data are all present
    pub fn require_complete(&self, object: &str) -> Result<()> {
        let missing = if self.indices.is_empty() {
            Some("index")
        } else if self.positions.is_empty() {
            Some("position")
        } else if self.normals.is_empty() {
            Some("normal")
        } else {
            None
        };

        match missing {
            Some(buffer) => Err(EditorError::MissingGeometryData {
                object: object.to_string(),
                buffer,
            }),
            None => Ok(()),
        }
    }

    /// Vertex indices of a triangle
    pub fn triangle(&self, tri: usize) -> Result<[u32; 3]> {
        let base = tri * 3;
        if base + 2 >= self.indices.len() {
            return Err(EditorError::out_of_bounds(
                "triangle",
                tri,
                self.triangle_count(),
            ));
        }
        Ok([
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ])
    }

    pub fn position(&self, vertex: u32) -> Result<Vec3> {
        read_vec3(&self.positions, vertex, "position")
    }

    pub fn normal(&self, vertex: u32) -> Result<Vec3> {
        read_vec3(&self.normals, vertex, "normal")
    }

    /// Corner positions of a triangle
    pub fn triangle_positions(&self, tri: usize) -> Result<[Vec3; 3]> {
        let [a, b, c] = self.triangle(tri)?;
        Ok([self.position(a)?, self.position(b)?, self.position(c)?])
    }

    /// Interleaved [pos(3), normal(3), color(3)] vertices for GPU upload
    pub fn interleaved(&self, color: [f32; 3]) -> Vec<f32> {
        let count = self.vertex_count().min(self.normals.len() / 3);
        let mut out = Vec::with_capacity(count * 9);
        for i in 0..count {
            out.extend_from_slice(&self.positions[i * 3..i * 3 + 3]);
            out.extend_from_slice(&self.normals[i * 3..i * 3 + 3]);
            out.extend_from_slice(&color);
        }
        out
    }
}

fn read_vec3(data: &[f32], vertex: u32, buffer: &'static str) -> Result<Vec3> {
    let base = vertex as usize * 3;
    if base + 2 >= data.len() {
        return Err(EditorError::out_of_bounds(buffer, vertex as usize, data.len() / 3));
    }
    Ok(Vec3::new(data[base], data[base + 1], data[base + 2]))
}

/// Face normal of a triangle: the normalized sum of its three vertex normals
pub fn face_normal(geometry: &GeometryBuffer, tri: usize) -> Result<Vec3> {
    let [a, b, c] = geometry.triangle(tri)?;
    let sum = geometry.normal(a)? + geometry.normal(b)? + geometry.normal(c)?;
    Ok(sum.normalize_or_zero())
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

// ── Box generation ───────────────────────────────────────────

/// Axis-aligned box centered on the origin.
///
/// Faces are emitted in the order +X, -X, +Y, -Y, +Z, -Z with four vertices each
/// and two triangles `(a, b, d)`, `(b, c, d)`, so triangles `2k` and `2k + 1`
/// always make up face `k` and carry the same normal.
pub fn box_geometry(width: f32, height: f32, depth: f32) -> GeometryBuffer {
    let mut geometry = GeometryBuffer {
        positions: Vec::with_capacity(24 * 3),
        normals: Vec::with_capacity(24 * 3),
        indices: Vec::with_capacity(36),
    };

    // (u, v, w, udir, vdir, plane width, plane height, plane depth)
    let planes: [(usize, usize, usize, f32, f32, f32, f32, f32); 6] = [
        (2, 1, 0, -1.0, -1.0, depth, height, width),
        (2, 1, 0, 1.0, -1.0, depth, height, -width),
        (0, 2, 1, 1.0, 1.0, width, depth, height),
        (0, 2, 1, 1.0, -1.0, width, depth, -height),
        (0, 1, 2, 1.0, -1.0, width, height, depth),
        (0, 1, 2, -1.0, -1.0, width, height, -depth),
    ];

    for (u, v, w, udir, vdir, pw, ph, pd) in planes {
        build_plane(&mut geometry, [u, v, w], udir, vdir, pw, ph, pd);
    }

    geometry
}

#[allow(clippy::too_many_arguments)]
fn build_plane(
    geometry: &mut GeometryBuffer,
    axes: [usize; 3],
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
) {
    let [u, v, w] = axes;
    let base = geometry.vertex_count() as u32;

    for iy in 0..2 {
        let y = iy as f32 * height - height * 0.5;
        for ix in 0..2 {
            let x = ix as f32 * width - width * 0.5;

            let mut p = [0.0_f32; 3];
            p[u] = x * udir;
            p[v] = y * vdir;
            p[w] = depth * 0.5;

            let mut n = [0.0_f32; 3];
            n[w] = if depth > 0.0 { 1.0 } else { -1.0 };

            geometry.positions.extend_from_slice(&p);
            geometry.normals.extend_from_slice(&n);
        }
    }

    let a = base;
    let b = base + 2;
    let c = base + 3;
    let d = base + 1;
    geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
}

// ── Grid ─────────────────────────────────────────────────────

pub fn grid(range: i32, cell_size: f32, opacity: f32) -> LineMeshData {
    let mut vertices = Vec::new();
    let grid_color = [0.4_f32, 0.4, 0.4, opacity];
    let center_color = [0.55_f32, 0.55, 0.55, opacity];

    let extent = range as f32 * cell_size;

    for i in -range..=range {
        let f = i as f32 * cell_size;
        let color = if i == 0 { center_color } else { grid_color };
        // Line along Z
        push_line_vert(&mut vertices, f, 0.0, -extent, color);
        push_line_vert(&mut vertices, f, 0.0, extent, color);
        // Line along X
        push_line_vert(&mut vertices, -extent, 0.0, f, color);
        push_line_vert(&mut vertices, extent, 0.0, f, color);
    }

    LineMeshData { vertices }
}

pub(crate) fn push_line_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, c: [f32; 4]) {
    v.extend_from_slice(&[px, py, pz, c[0], c[1], c[2], c[3]]);
}
