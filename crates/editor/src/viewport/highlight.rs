//! Translucent overlay marking the selected face.
//!
//! At most one overlay exists. Building always tears the previous one down first,
//! and tearing down hands its geometry and material back to [`RenderResources`]
//! so the renderer can free the matching GPU buffers.

use std::collections::HashSet;

use glam::Vec3;
use shared::{ObjectId, Transform};

use super::adjacency::QuadFace;
use crate::error::Result;
use crate::helpers::local_dir_to_world;
use crate::state::scene::SceneObject;
use crate::state::settings::HighlightSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u64);

/// Bookkeeping for render resources owned by overlays
#[derive(Debug, Default)]
pub struct RenderResources {
    next_id: u64,
    geometries: HashSet<u64>,
    materials: HashSet<u64>,
}

impl RenderResources {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn allocate_geometry(&mut self) -> GeometryHandle {
        let id = self.next();
        self.geometries.insert(id);
        GeometryHandle(id)
    }

    pub fn allocate_material(&mut self) -> MaterialHandle {
        let id = self.next();
        self.materials.insert(id);
        MaterialHandle(id)
    }

    /// Returns false if the handle was already released
    pub fn release_geometry(&mut self, handle: GeometryHandle) -> bool {
        self.geometries.remove(&handle.0)
    }

    pub fn release_material(&mut self, handle: MaterialHandle) -> bool {
        self.materials.remove(&handle.0)
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }
}

/// Overlay vertex data, re-indexed locally from 0
#[derive(Debug, Clone)]
pub struct OverlayGeometry {
    pub handle: GeometryHandle,
    /// Object-space positions copied from the source mesh
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Unlit translucent material drawn over the surface
#[derive(Debug, Clone)]
pub struct OverlayMaterial {
    pub handle: MaterialHandle,
    pub color: [f32; 3],
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub depth_test: bool,
}

/// The live overlay mesh
#[derive(Debug, Clone)]
pub struct HighlightMesh {
    pub object_id: ObjectId,
    pub triangles: Vec<usize>,
    pub geometry: OverlayGeometry,
    pub material: OverlayMaterial,
    /// Snapshot of the object's transform at build time, nudged along the face normal
    pub transform: Transform,
}

impl HighlightMesh {
    pub fn triangle_count(&self) -> usize {
        self.geometry.indices.len() / 3
    }

    /// Interleaved [pos(3), color(4)] triangle vertices for GPU upload
    pub fn vertex_data(&self) -> Vec<f32> {
        let [r, g, b] = self.material.color;
        let mut out = Vec::with_capacity(self.geometry.indices.len() * 7);
        for &i in &self.geometry.indices {
            let p = self.geometry.positions[i as usize];
            out.extend_from_slice(&[p.x, p.y, p.z, r, g, b, self.material.opacity]);
        }
        out
    }
}

/// Owner of the single highlight overlay
pub struct HighlightOverlay {
    current: Option<HighlightMesh>,
    resources: RenderResources,
    settings: HighlightSettings,
    /// Bumped whenever the overlay is built or removed
    generation: u64,
}

impl HighlightOverlay {
    pub fn new(settings: HighlightSettings) -> Self {
        Self {
            current: None,
            resources: RenderResources::default(),
            settings,
            generation: 0,
        }
    }

    /// Replace the overlay with one covering `face` on `object`.
    ///
    /// On error the previous overlay is still gone and nothing new is shown.
    pub fn build(&mut self, object: &SceneObject, face: &QuadFace) -> Result<&HighlightMesh> {
        self.remove();

        object.geometry.require_complete(&object.id)?;

        let source = face.indices();
        let positions = source
            .iter()
            .map(|&v| object.geometry.position(v))
            .collect::<Result<Vec<_>>>()?;
        let indices: Vec<u32> = (0..positions.len() as u32).collect();

        let mut transform = object.transform;
        let world_normal = local_dir_to_world(&object.transform, face.normal);
        let offset = world_normal * self.settings.normal_offset;
        for axis in 0..3 {
            transform.position[axis] += offset[axis];
        }

        let mesh = HighlightMesh {
            object_id: object.id.clone(),
            triangles: face.triangle_indices(),
            geometry: OverlayGeometry {
                handle: self.resources.allocate_geometry(),
                positions,
                indices,
            },
            material: OverlayMaterial {
                handle: self.resources.allocate_material(),
                color: self.settings.color,
                opacity: self.settings.opacity,
                transparent: true,
                double_sided: true,
                depth_test: false,
            },
            transform,
        };

        tracing::debug!(
            "Highlight mesh added on {} ({} triangle(s))",
            mesh.object_id,
            mesh.triangle_count()
        );
        self.generation += 1;
        Ok(self.current.insert(mesh))
    }

    /// Detach and release the current overlay. No-op if there is none.
    pub fn remove(&mut self) -> bool {
        let Some(mesh) = self.current.take() else {
            return false;
        };
        self.resources.release_geometry(mesh.geometry.handle);
        self.resources.release_material(mesh.material.handle);
        self.generation += 1;
        tracing::debug!("Highlight mesh removed");
        true
    }

    pub fn current(&self) -> Option<&HighlightMesh> {
        self.current.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.current.is_some()
    }

    pub fn live_count(&self) -> usize {
        usize::from(self.current.is_some())
    }

    pub fn resources(&self) -> &RenderResources {
        &self.resources
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for HighlightOverlay {
    fn default() -> Self {
        Self::new(HighlightSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;
    use crate::viewport::adjacency::{resolve_quad, AdjacencyStrategy, NoAdjacency};
    use crate::viewport::mesh::box_geometry;

    fn cube(position: [f32; 3]) -> SceneObject {
        SceneObject {
            id: "cube".to_string(),
            geometry: box_geometry(1.0, 1.0, 1.0),
            transform: Transform::at(position),
            color: [0.0, 0.5, 1.0],
            selectable: true,
        }
    }

    #[test]
    fn test_build_quad_has_six_vertices() {
        let obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 0).unwrap();
        let mut overlay = HighlightOverlay::default();
        let mesh = overlay.build(&obj, &face).unwrap();
        assert_eq!(mesh.geometry.positions.len(), 6);
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.triangles, vec![0, 1]);
    }

    #[test]
    fn test_build_single_triangle() {
        let obj = cube([0.0; 3]);
        let face = NoAdjacency.resolve(&obj.geometry, 3).unwrap();
        let mut overlay = HighlightOverlay::default();
        let mesh = overlay.build(&obj, &face).unwrap();
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_material_renders_on_top() {
        let obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 8).unwrap();
        let mut overlay = HighlightOverlay::default();
        let mesh = overlay.build(&obj, &face).unwrap();
        assert!(mesh.material.transparent);
        assert!(mesh.material.double_sided);
        assert!(!mesh.material.depth_test);
        assert_eq!(mesh.material.color, [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_transform_copied_with_normal_offset() {
        let obj = cube([1.0, 2.0, 3.0]);
        // +Z face
        let face = resolve_quad(&obj, 8).unwrap();
        let mut overlay = HighlightOverlay::default();
        let mesh = overlay.build(&obj, &face).unwrap();
        assert!((mesh.transform.position[0] - 1.0).abs() < 1e-6);
        assert!((mesh.transform.position[1] - 2.0).abs() < 1e-6);
        assert!((mesh.transform.position[2] - 3.01).abs() < 1e-6);
        assert_eq!(mesh.transform.scale, obj.transform.scale);
    }

    #[test]
    fn test_offset_follows_object_rotation() {
        let mut obj = cube([0.0; 3]);
        obj.transform.rotation = [0.0, std::f32::consts::FRAC_PI_2, 0.0];
        // Local +Z face points along world +X after a quarter turn about Y
        let face = resolve_quad(&obj, 8).unwrap();
        let mut overlay = HighlightOverlay::default();
        let mesh = overlay.build(&obj, &face).unwrap();
        assert!((mesh.transform.position[0] - 0.01).abs() < 1e-5);
        assert!(mesh.transform.position[2].abs() < 1e-5);
    }

    #[test]
    fn test_transform_not_linked_to_object() {
        let mut obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 0).unwrap();
        let mut overlay = HighlightOverlay::default();
        overlay.build(&obj, &face).unwrap();
        obj.transform.position = [9.0, 9.0, 9.0];
        let pos = overlay.current().unwrap().transform.position;
        assert!(pos[1].abs() < 1e-6);
    }

    #[test]
    fn test_repeated_builds_keep_single_overlay() {
        let obj = cube([0.0; 3]);
        let mut overlay = HighlightOverlay::default();
        for tri in 0..obj.geometry.triangle_count() {
            let face = resolve_quad(&obj, tri).unwrap();
            overlay.build(&obj, &face).unwrap();
            assert_eq!(overlay.live_count(), 1);
            assert_eq!(overlay.resources().live_geometries(), 1);
            assert_eq!(overlay.resources().live_materials(), 1);
        }
    }

    #[test]
    fn test_remove_releases_resources_and_is_idempotent() {
        let obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 2).unwrap();
        let mut overlay = HighlightOverlay::default();
        overlay.build(&obj, &face).unwrap();

        assert!(overlay.remove());
        assert!(!overlay.is_live());
        assert_eq!(overlay.resources().live_geometries(), 0);
        assert_eq!(overlay.resources().live_materials(), 0);

        let generation = overlay.generation();
        assert!(!overlay.remove());
        assert_eq!(overlay.generation(), generation);
    }

    #[test]
    fn test_failed_build_leaves_no_overlay() {
        let obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 0).unwrap();
        let mut overlay = HighlightOverlay::default();
        overlay.build(&obj, &face).unwrap();

        let mut broken = obj.clone();
        broken.geometry.positions.truncate(3);
        let err = overlay.build(&broken, &face).unwrap_err();
        assert!(matches!(err, EditorError::OutOfBoundsIndex { buffer: "position", .. }));
        assert!(!overlay.is_live());
        assert_eq!(overlay.resources().live_geometries(), 0);
    }

    #[test]
    fn test_missing_geometry_aborts_build() {
        let mut obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 0).unwrap();
        obj.geometry.normals.clear();
        let mut overlay = HighlightOverlay::default();
        assert!(matches!(
            overlay.build(&obj, &face),
            Err(EditorError::MissingGeometryData { .. })
        ));
        assert!(overlay.current().is_none());
    }

    #[test]
    fn test_vertex_data_layout() {
        let obj = cube([0.0; 3]);
        let face = resolve_quad(&obj, 0).unwrap();
        let mut overlay = HighlightOverlay::default();
        let mesh = overlay.build(&obj, &face).unwrap();
        let data = mesh.vertex_data();
        assert_eq!(data.len(), 6 * 7);
        assert_eq!(data[6], 0.5);
    }
}
