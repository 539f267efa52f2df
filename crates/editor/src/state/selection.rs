use shared::ObjectId;

use crate::viewport::adjacency::QuadFace;

/// The face currently picked on an object (one or two triangles)
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSelection {
    pub object_id: ObjectId,
    pub face: QuadFace,
}

impl FaceSelection {
    pub fn new(object_id: ObjectId, face: QuadFace) -> Self {
        Self { object_id, face }
    }

    pub fn primary_triangle(&self) -> usize {
        self.face.primary_index
    }

    pub fn adjacent_triangle(&self) -> Option<usize> {
        self.face.adjacent_index
    }

    /// Combined vertex indices (3 or 6 entries)
    pub fn vertex_indices(&self) -> Vec<u32> {
        self.face.indices()
    }
}
