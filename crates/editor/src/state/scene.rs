//! Scene state: renderable/selectable objects and lights.
//!
//! Objects are only ever added; there is no removal during a session.

use shared::{ObjectId, Transform};

use crate::helpers::rgb_from_hex;
use crate::state::settings::SceneSettings;
use crate::viewport::mesh::{box_geometry, GeometryBuffer};

/// Colors handed out to added boxes, in order
const PALETTE: [u32; 8] = [
    0xe6194b, 0x3cb44b, 0xffe119, 0xf58231, 0x911eb4, 0x46f0f0, 0xf032e6, 0xbcf60c,
];

/// A box (or any indexed mesh) placed in the scene
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub geometry: GeometryBuffer,
    pub transform: Transform,
    pub color: [f32; 3],
    /// Member of the set the picker tests against
    pub selectable: bool,
}

/// Scene lighting
#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient { color: [f32; 3], intensity: f32 },
    Directional { color: [f32; 3], intensity: f32, direction: [f32; 3] },
}

/// Parameters for a new box
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSpec {
    /// Edge length
    pub size: f32,
    /// Explicit color; `None` takes the next palette entry
    pub color: Option<[f32; 3]>,
}

impl ObjectSpec {
    pub fn cube(size: f32) -> Self {
        Self { size, color: None }
    }
}

/// Scene state with objects, lights and a version counter
pub struct SceneState {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
    /// The box created at startup (subject to idle animation)
    default_object: Option<ObjectId>,
    /// Fixed step multiplied by the child count to place added boxes
    offset_step: f32,
    palette_cursor: usize,
    /// Monotonically increasing version counter for render resync
    version: u64,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(SceneSettings::default().add_offset_step)
    }
}

impl SceneState {
    /// Empty scene with the ambient and directional lights
    pub fn new(offset_step: f32) -> Self {
        let direction = glam::Vec3::ONE.normalize().to_array();
        Self {
            objects: Vec::new(),
            lights: vec![
                Light::Ambient {
                    color: [1.0, 1.0, 1.0],
                    intensity: 0.5,
                },
                Light::Directional {
                    color: [1.0, 1.0, 1.0],
                    intensity: 1.0,
                    direction,
                },
            ],
            default_object: None,
            offset_step,
            palette_cursor: 0,
            version: 0,
        }
    }

    /// Scene with the initial box at the origin
    pub fn with_default_object(settings: &SceneSettings) -> Self {
        let mut scene = Self::new(settings.add_offset_step);
        let size = settings.default_object_size;
        let id = scene.insert(SceneObject {
            id: new_object_id(),
            geometry: box_geometry(size, size, size),
            transform: Transform::new(),
            color: rgb_from_hex(settings.default_object_color),
            selectable: true,
        });
        scene.default_object = Some(id);
        scene
    }

    /// Add a box offset by `child_count() * step` on every axis and make it selectable
    pub fn add_object(&mut self, spec: ObjectSpec) -> ObjectId {
        let offset = self.child_count() as f32 * self.offset_step;
        let color = spec.color.unwrap_or_else(|| self.next_palette_color());

        let id = self.insert(SceneObject {
            id: new_object_id(),
            geometry: box_geometry(spec.size, spec.size, spec.size),
            transform: Transform::at([offset, offset, offset]),
            color,
            selectable: true,
        });
        tracing::info!("New cube {id} added at offset {offset:.2}");
        id
    }

    /// Insert a fully built object as-is
    pub fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id.clone();
        self.objects.push(object);
        self.version += 1;
        id
    }

    fn next_palette_color(&mut self) -> [f32; 3] {
        let hex = PALETTE[self.palette_cursor % PALETTE.len()];
        self.palette_cursor += 1;
        rgb_from_hex(hex)
    }

    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Replace an object's transform
    pub fn set_transform(&mut self, id: &str, transform: Transform) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                object.transform = transform;
                self.version += 1;
                true
            }
            None => false,
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Objects the picker should consider
    pub fn selectable(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.selectable)
    }

    pub fn selectable_count(&self) -> usize {
        self.selectable().count()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of direct scene children (objects and lights). The gizmo and the
    /// highlight overlay are not scene children and are never counted.
    pub fn child_count(&self) -> usize {
        self.objects.len() + self.lights.len()
    }

    pub fn default_object_id(&self) -> Option<&ObjectId> {
        self.default_object.as_ref()
    }

    pub fn offset_step(&self) -> f32 {
        self.offset_step
    }

    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bump version after mutating an object in place
    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }
}

fn new_object_id() -> ObjectId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scene_has_only_lights() {
        let s = SceneState::default();
        assert!(s.objects().is_empty());
        assert_eq!(s.lights().len(), 2);
        assert_eq!(s.child_count(), 2);
    }

    #[test]
    fn test_default_object_at_origin() {
        let s = SceneState::with_default_object(&SceneSettings::default());
        let id = s.default_object_id().unwrap();
        let obj = s.get(id).unwrap();
        assert_eq!(obj.transform, Transform::new());
        assert_eq!(obj.geometry.triangle_count(), 12);
        assert!(obj.selectable);
    }

    #[test]
    fn test_add_object_offset_follows_child_count() {
        let mut s = SceneState::with_default_object(&SceneSettings::default());
        let prior = s.child_count();
        let a = s.add_object(ObjectSpec::cube(0.8));
        let b = s.add_object(ObjectSpec::cube(0.8));

        let step = s.offset_step();
        let pa = s.get(&a).unwrap().transform.position;
        let pb = s.get(&b).unwrap().transform.position;
        for axis in 0..3 {
            assert!((pa[axis] - prior as f32 * step).abs() < 1e-6);
            assert!((pb[axis] - (prior + 1) as f32 * step).abs() < 1e-6);
        }
    }

    #[test]
    fn test_add_object_is_selectable_with_unique_id() {
        let mut s = SceneState::default();
        let a = s.add_object(ObjectSpec::cube(0.8));
        let b = s.add_object(ObjectSpec::cube(0.8));
        assert_ne!(a, b);
        assert_eq!(s.selectable_count(), 2);
    }

    #[test]
    fn test_palette_cycles_and_explicit_color_wins() {
        let mut s = SceneState::default();
        let a = s.add_object(ObjectSpec::cube(1.0));
        let b = s.add_object(ObjectSpec::cube(1.0));
        assert_ne!(s.get(&a).unwrap().color, s.get(&b).unwrap().color);

        let c = s.add_object(ObjectSpec {
            size: 1.0,
            color: Some([0.0, 0.0, 0.0]),
        });
        assert_eq!(s.get(&c).unwrap().color, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_version_bumps_on_mutation() {
        let mut s = SceneState::default();
        let v0 = s.version();
        let id = s.add_object(ObjectSpec::cube(1.0));
        assert!(s.version() > v0);
        let v1 = s.version();
        assert!(s.set_transform(&id, Transform::at([1.0, 0.0, 0.0])));
        assert!(s.version() > v1);
        assert!(!s.set_transform("missing", Transform::new()));
    }

    #[test]
    fn test_non_selectable_excluded() {
        let mut s = SceneState::default();
        let id = s.add_object(ObjectSpec::cube(1.0));
        s.get_mut(&id).unwrap().selectable = false;
        assert_eq!(s.selectable_count(), 0);
        assert_eq!(s.objects().len(), 1);
    }
}
