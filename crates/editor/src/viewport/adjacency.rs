//! Logical quad face reconstruction from a picked triangle.
//!
//! Generated boxes store every rectangular face as two consecutive triangles
//! (`2k`, `2k + 1`). [`PairedQuadStrategy`] relies on exactly that layout and on
//! the pair sharing a normal. It is a heuristic: meshes triangulated any other way
//! simply yield no partner, they are never searched for one.

use glam::Vec3;

use super::mesh::{face_normal, GeometryBuffer};
use crate::error::Result;
use crate::state::scene::SceneObject;

/// Maximum squared distance between two face normals for the pair to count as one quad
pub const NORMAL_TOLERANCE: f32 = 0.001;

/// A logical face: the picked triangle plus, optionally, its quad partner
#[derive(Debug, Clone, PartialEq)]
pub struct QuadFace {
    pub primary_index: usize,
    pub primary: [u32; 3],
    pub adjacent_index: Option<usize>,
    pub adjacent: Option<[u32; 3]>,
    /// Face normal of the primary triangle (object space)
    pub normal: Vec3,
}

impl QuadFace {
    /// Combined vertex indices: 3 for a lone triangle, 6 for a quad
    pub fn indices(&self) -> Vec<u32> {
        let mut out = self.primary.to_vec();
        if let Some(adj) = self.adjacent {
            out.extend_from_slice(&adj);
        }
        out
    }

    pub fn triangle_indices(&self) -> Vec<usize> {
        std::iter::once(self.primary_index)
            .chain(self.adjacent_index)
            .collect()
    }

    pub fn is_quad(&self) -> bool {
        self.adjacent.is_some()
    }
}

/// Decides which triangle, if any, completes the picked one into a face
pub trait AdjacencyStrategy {
    fn resolve(&self, geometry: &GeometryBuffer, triangle: usize) -> Result<QuadFace>;
}

/// Even/odd pairing with a normal-similarity check
#[derive(Debug, Clone, Copy)]
pub struct PairedQuadStrategy {
    pub tolerance: f32,
}

impl Default for PairedQuadStrategy {
    fn default() -> Self {
        Self {
            tolerance: NORMAL_TOLERANCE,
        }
    }
}

impl PairedQuadStrategy {
    /// Partner index under the even/odd convention
    pub fn candidate(triangle: usize) -> Option<usize> {
        if triangle % 2 == 0 {
            Some(triangle + 1)
        } else {
            triangle.checked_sub(1)
        }
    }
}

impl AdjacencyStrategy for PairedQuadStrategy {
    fn resolve(&self, geometry: &GeometryBuffer, triangle: usize) -> Result<QuadFace> {
        let primary = geometry.triangle(triangle)?;
        let normal = face_normal(geometry, triangle)?;

        let mut face = QuadFace {
            primary_index: triangle,
            primary,
            adjacent_index: None,
            adjacent: None,
            normal,
        };

        let Some(candidate) = Self::candidate(triangle).filter(|&c| c < geometry.triangle_count())
        else {
            tracing::debug!("Adjacent candidate for triangle {triangle} out of bounds");
            return Ok(face);
        };

        let candidate_normal = face_normal(geometry, candidate)?;
        let distance_sq = normal.distance_squared(candidate_normal);

        if distance_sq < self.tolerance {
            tracing::debug!("Found adjacent face: {candidate}");
            face.adjacent_index = Some(candidate);
            face.adjacent = Some(geometry.triangle(candidate)?);
        } else {
            tracing::debug!(
                "Normals differ, not adjacent. Sel: {:?}, Pot: {:?}",
                normal.to_array(),
                candidate_normal.to_array()
            );
        }

        Ok(face)
    }
}

/// Never pairs: every pick is a single triangle
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdjacency;

impl AdjacencyStrategy for NoAdjacency {
    fn resolve(&self, geometry: &GeometryBuffer, triangle: usize) -> Result<QuadFace> {
        Ok(QuadFace {
            primary_index: triangle,
            primary: geometry.triangle(triangle)?,
            adjacent_index: None,
            adjacent: None,
            normal: face_normal(geometry, triangle)?,
        })
    }
}

/// Resolve the quad face containing `triangle` on `object` with the paired heuristic
pub fn resolve_quad(object: &SceneObject, triangle: usize) -> Result<QuadFace> {
    object.geometry.require_complete(&object.id)?;
    PairedQuadStrategy::default().resolve(&object.geometry, triangle)
}
