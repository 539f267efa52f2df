//! Transform helpers shared by picking, highlighting and the renderer.

use glam::{EulerRot, Mat4, Quat, Vec3};
use shared::Transform;

/// Rotation of a transform as a quaternion (Euler XYZ order)
pub fn rotation_quat(transform: &Transform) -> Quat {
    let [rx, ry, rz] = transform.rotation;
    Quat::from_euler(EulerRot::XYZ, rx, ry, rz)
}

/// Model matrix: scale, then rotate, then translate
pub fn model_matrix(transform: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::from(transform.scale),
        rotation_quat(transform),
        Vec3::from(transform.position),
    )
}

/// Rotate a local-space direction into world space (ignores scale and translation)
pub fn local_dir_to_world(transform: &Transform, dir: Vec3) -> Vec3 {
    (rotation_quat(transform) * dir).normalize_or_zero()
}

/// Color as RGB floats in 0..1
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
