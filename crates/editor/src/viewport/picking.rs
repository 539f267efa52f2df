use glam::{Mat4, Vec2, Vec3};
use shared::ObjectId;

use super::camera::{OrbitCamera, Viewport};
use super::mesh::GeometryBuffer;
use crate::helpers::model_matrix;
use crate::state::scene::SceneObject;

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same ray expressed in another space
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the ray parameter if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Nearest triangle hit in a single buffer, in the buffer's own space
#[derive(Clone, Debug)]
pub struct TriangleHit {
    /// Index of the triangle (into indices / 3)
    pub triangle_index: usize,
    /// Ray parameter at the hit point
    pub t: f32,
}

/// Find the nearest triangle in a geometry buffer intersected by the ray.
pub fn pick_triangle(ray: &Ray, geometry: &GeometryBuffer) -> Option<TriangleHit> {
    let mut best: Option<TriangleHit> = None;

    for tri_idx in 0..geometry.triangle_count() {
        let Ok([v0, v1, v2]) = geometry.triangle_positions(tri_idx) else {
            continue;
        };

        if let Some(t) = ray_triangle_intersect(ray, v0, v1, v2) {
            if best.as_ref().is_none_or(|b| t < b.t) {
                best = Some(TriangleHit {
                    triangle_index: tri_idx,
                    t,
                });
            }
        }
    }

    best
}

/// Result of picking against the scene
#[derive(Clone, Debug, PartialEq)]
pub struct PickHit {
    pub object_id: ObjectId,
    pub triangle_index: usize,
    /// World-space distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Cast a ray through `screen` and return the closest triangle among `candidates`.
///
/// Objects are tested in their local space so their transforms are honored.
/// Objects without complete geometry are skipped. Never mutates the scene.
pub fn pick<'a, I>(
    screen: Vec2,
    viewport: &Viewport,
    camera: &OrbitCamera,
    candidates: I,
) -> Option<PickHit>
where
    I: IntoIterator<Item = &'a SceneObject>,
{
    let ray = camera.screen_ray(screen, viewport);
    pick_with_ray(&ray, candidates)
}

/// Ray-based variant of [`pick`]
pub fn pick_with_ray<'a, I>(ray: &Ray, candidates: I) -> Option<PickHit>
where
    I: IntoIterator<Item = &'a SceneObject>,
{
    let mut best: Option<PickHit> = None;

    for object in candidates {
        if object.geometry.require_complete(&object.id).is_err() {
            tracing::debug!("Skipping {} during pick: incomplete geometry", object.id);
            continue;
        }

        let model = model_matrix(&object.transform);
        let local_ray = ray.transformed(&model.inverse());

        let Some(hit) = pick_triangle(&local_ray, &object.geometry) else {
            continue;
        };

        let point = model.transform_point3(local_ray.at(hit.t));
        let distance = (point - ray.origin).length();

        if best.as_ref().is_none_or(|b| distance < b.distance) {
            best = Some(PickHit {
                object_id: object.id.clone(),
                triangle_index: hit.triangle_index,
                distance,
                point,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::mesh::box_geometry;
    use shared::Transform;

    fn object(id: &str, position: [f32; 3]) -> SceneObject {
        SceneObject {
            id: id.to_string(),
            geometry: box_geometry(1.0, 1.0, 1.0),
            transform: Transform::at(position),
            color: [1.0, 1.0, 1.0],
            selectable: true,
        }
    }

    fn ray_down_z(x: f32, y: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, y, 10.0),
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_ray_triangle_hit() {
        let ray = ray_down_z(0.1, 0.1);
        let t = ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).unwrap();
        assert!((t - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let ray = ray_down_z(0.9, 0.9);
        assert!(ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_behind_origin_misses() {
        let ray = Ray {
            origin: Vec3::new(0.1, 0.1, -1.0),
            direction: Vec3::NEG_Z,
        };
        assert!(ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_pick_front_face_of_box() {
        let objects = [object("a", [0.0; 3])];
        let hit = pick_with_ray(&ray_down_z(0.1, 0.2), objects.iter()).unwrap();
        assert_eq!(hit.object_id, "a");
        // +Z face is face 4: triangles 8 and 9
        assert!(hit.triangle_index == 8 || hit.triangle_index == 9);
        assert!((hit.distance - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_pick_nearest_object_wins() {
        let objects = [object("far", [0.0, 0.0, -3.0]), object("near", [0.0, 0.0, 2.0])];
        let hit = pick_with_ray(&ray_down_z(0.0, 0.1), objects.iter()).unwrap();
        assert_eq!(hit.object_id, "near");
        assert!((hit.distance - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_pick_honors_translation() {
        let objects = [object("moved", [5.0, 0.0, 0.0])];
        assert!(pick_with_ray(&ray_down_z(0.0, 0.0), objects.iter()).is_none());
        assert!(pick_with_ray(&ray_down_z(5.1, 0.3), objects.iter()).is_some());
    }

    #[test]
    fn test_pick_empty_space() {
        let objects = [object("a", [0.0; 3])];
        assert!(pick_with_ray(&ray_down_z(3.0, 3.0), objects.iter()).is_none());
    }

    #[test]
    fn test_pick_skips_incomplete_geometry() {
        let mut broken = object("broken", [0.0; 3]);
        broken.geometry.indices.clear();
        assert!(pick_with_ray(&ray_down_z(0.0, 0.1), [&broken]).is_none());
    }

    #[test]
    fn test_pick_from_screen_center() {
        let objects = [object("a", [0.0; 3])];
        let camera = OrbitCamera::new();
        let viewport = Viewport::new(800.0, 600.0);
        let hit = pick(Vec2::new(420.0, 290.0), &viewport, &camera, objects.iter()).unwrap();
        assert_eq!(hit.object_id, "a");
        assert!(hit.triangle_index == 8 || hit.triangle_index == 9);
        assert!((hit.distance - 4.5).abs() < 0.05);
    }
}
