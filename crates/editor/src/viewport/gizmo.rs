use glam::{Vec2, Vec3};
use shared::{ObjectId, Transform};

use super::camera::{OrbitCamera, Viewport};
use super::mesh::{push_line_vert, LineMeshData};
use super::picking::Ray;
use crate::state::settings::SnapSettings;

/// Handle pick radius in world units
const HIT_THRESHOLD: f32 = 0.15;

/// Smallest scale a drag may produce on any axis
const MIN_SCALE: f32 = 0.01;

/// Radians of rotation per dragged pixel
const ROTATE_PER_PIXEL: f32 = 0.01;

/// Transform applied by the gizmo handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoMode {
    Translate,
    Rotate,
    Scale,
}

/// Which axis a gizmo handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn direction(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }

    pub fn index(self) -> usize {
        match self {
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
        }
    }
}

/// An in-progress handle drag
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoDrag {
    pub axis: GizmoAxis,
    /// Transform of the attached object when the drag began
    pub start: Transform,
    /// Unsnapped amount dragged so far along the axis
    pub accumulated: f32,
}

/// Transform gizmo bound to at most one scene object.
///
/// The gizmo only remembers the object's id; the scene keeps ownership.
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    pub mode: GizmoMode,
    pub enabled: bool,
    pub show_x: bool,
    pub show_y: bool,
    pub show_z: bool,
    pub snap: SnapSettings,
    /// Handle length in world units
    pub handle_length: f32,
    attached: Option<ObjectId>,
    drag: Option<GizmoDrag>,
}

impl Default for TransformGizmo {
    fn default() -> Self {
        Self::new(SnapSettings::default(), 1.5)
    }
}

impl TransformGizmo {
    pub fn new(snap: SnapSettings, handle_length: f32) -> Self {
        Self {
            mode: GizmoMode::Translate,
            enabled: false,
            show_x: true,
            show_y: true,
            show_z: true,
            snap,
            handle_length,
            attached: None,
            drag: None,
        }
    }

    pub fn attach(&mut self, id: ObjectId) {
        self.drag = None;
        self.attached = Some(id);
    }

    /// Release the attached object, cancelling any drag
    pub fn detach(&mut self) -> Option<ObjectId> {
        self.drag = None;
        self.attached.take()
    }

    pub fn attached(&self) -> Option<&ObjectId> {
        self.attached.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn show_all_axes(&mut self) {
        self.show_x = true;
        self.show_y = true;
        self.show_z = true;
    }

    pub fn axis_visible(&self, axis: GizmoAxis) -> bool {
        match axis {
            GizmoAxis::X => self.show_x,
            GizmoAxis::Y => self.show_y,
            GizmoAxis::Z => self.show_z,
        }
    }

    /// Whether handles are drawn and can be grabbed
    pub fn is_active(&self) -> bool {
        self.enabled && self.attached.is_some()
    }

    pub fn drag(&self) -> Option<&GizmoDrag> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging `axis`. Refused while disabled, detached or on a hidden axis.
    pub fn begin_drag(&mut self, axis: GizmoAxis, start: Transform) -> bool {
        if !self.is_active() || !self.axis_visible(axis) {
            return false;
        }
        self.drag = Some(GizmoDrag {
            axis,
            start,
            accumulated: 0.0,
        });
        true
    }

    /// Accumulate `amount` and return the object's new transform
    pub fn update_drag(&mut self, amount: f32) -> Option<Transform> {
        let drag = self.drag.as_mut()?;
        drag.accumulated += amount;
        let drag = drag.clone();
        Some(self.apply(&drag))
    }

    pub fn end_drag(&mut self) -> Option<GizmoDrag> {
        self.drag.take()
    }

    fn snapped(&self, value: f32, step: f32) -> f32 {
        if self.snap.enabled && step > 0.0 {
            (value / step).round() * step
        } else {
            value
        }
    }

    /// Start transform moved along the drag axis. Translation lands on the
    /// snap grid; rotation and scale snap the accumulated delta.
    fn apply(&self, drag: &GizmoDrag) -> Transform {
        let mut t = drag.start;
        let i = drag.axis.index();
        match self.mode {
            GizmoMode::Translate => {
                t.position[i] =
                    self.snapped(drag.start.position[i] + drag.accumulated, self.snap.translation);
            }
            GizmoMode::Rotate => {
                let step = self.snap.rotation_degrees.to_radians();
                t.rotation[i] += self.snapped(drag.accumulated, step);
            }
            GizmoMode::Scale => {
                let scaled = t.scale[i] + self.snapped(drag.accumulated, self.snap.scale);
                t.scale[i] = scaled.max(MIN_SCALE);
            }
        }
        t
    }

    /// Handle under `ray`, if the gizmo is active
    pub fn hit_test(&self, ray: &Ray, center: Vec3) -> Option<GizmoAxis> {
        if !self.is_active() {
            return None;
        }
        let visible = |axis| self.axis_visible(axis);
        match self.mode {
            GizmoMode::Rotate => ring_hit_test(ray, center, self.handle_length, visible),
            GizmoMode::Translate | GizmoMode::Scale => {
                gizmo_hit_test(ray, center, self.handle_length, visible)
            }
        }
    }

    /// Amount a screen drag contributes to the active drag
    pub fn drag_amount(
        &self,
        camera: &OrbitCamera,
        viewport: &Viewport,
        center: Vec3,
        axis: GizmoAxis,
        screen_delta: Vec2,
    ) -> f32 {
        match self.mode {
            // Rings can face the camera edge-on, so rotation follows raw pointer travel
            GizmoMode::Rotate => (screen_delta.x - screen_delta.y) * ROTATE_PER_PIXEL,
            GizmoMode::Translate | GizmoMode::Scale => {
                compute_drag_amount(camera, viewport, center, axis, screen_delta)
            }
        }
    }

    pub fn lines(&self, center: Vec3) -> LineMeshData {
        build_gizmo_lines(center, self.handle_length, self.mode, |axis| {
            self.axis_visible(axis)
        })
    }
}

/// Test if a ray hits one of the visible gizmo handles.
/// Returns the closest axis within the pick radius.
pub fn gizmo_hit_test(
    ray: &Ray,
    center: Vec3,
    axis_length: f32,
    visible: impl Fn(GizmoAxis) -> bool,
) -> Option<GizmoAxis> {
    let mut best: Option<(GizmoAxis, f32)> = None;

    for axis in GizmoAxis::ALL.into_iter().filter(|a| visible(*a)) {
        let line_end = center + axis.direction() * axis_length;
        let dist = ray_line_distance(ray, center, line_end);

        if dist < HIT_THRESHOLD && best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((axis, dist));
        }
    }

    best.map(|(axis, _)| axis)
}

/// Test if a ray grazes one of the rotation rings of radius `radius`.
pub fn ring_hit_test(
    ray: &Ray,
    center: Vec3,
    radius: f32,
    visible: impl Fn(GizmoAxis) -> bool,
) -> Option<GizmoAxis> {
    let mut best: Option<(GizmoAxis, f32)> = None;

    for axis in GizmoAxis::ALL.into_iter().filter(|a| visible(*a)) {
        let normal = axis.direction();
        let denom = ray.direction.dot(normal);
        if denom.abs() < 1e-6 {
            continue;
        }
        let t = (center - ray.origin).dot(normal) / denom;
        if t < 0.0 {
            continue;
        }
        let dist = ((ray.at(t) - center).length() - radius).abs();

        if dist < HIT_THRESHOLD && best.as_ref().is_none_or(|(_, d)| dist < *d) {
            best = Some((axis, dist));
        }
    }

    best.map(|(axis, _)| axis)
}

/// Convert a screen-space drag into an amount along `axis`.
///
/// The drag is projected onto the axis as it appears on screen; one world unit
/// equals the axis' projected length in pixels.
pub fn compute_drag_amount(
    camera: &OrbitCamera,
    viewport: &Viewport,
    center: Vec3,
    axis: GizmoAxis,
    screen_delta: Vec2,
) -> f32 {
    let p0 = camera.project(center, viewport);
    let p1 = camera.project(center + axis.direction(), viewport);

    let (Some(p0), Some(p1)) = (p0, p1) else {
        return 0.0;
    };

    let screen_axis = p1 - p0;
    let screen_axis_len = screen_axis.length();
    if screen_axis_len < 1.0 {
        return 0.0;
    }

    screen_delta.dot(screen_axis / screen_axis_len) / screen_axis_len
}

/// Build the handle line mesh for `mode` at `center`.
pub fn build_gizmo_lines(
    center: Vec3,
    length: f32,
    mode: GizmoMode,
    visible: impl Fn(GizmoAxis) -> bool,
) -> LineMeshData {
    let mut vertices = Vec::new();

    for axis in GizmoAxis::ALL.into_iter().filter(|a| visible(*a)) {
        let color = axis_color(axis);
        let dir = axis.direction();
        let (side, _) = perpendiculars(axis);
        let tip = center + dir * length;

        match mode {
            GizmoMode::Translate | GizmoMode::Scale => {
                push_vec(&mut vertices, center, color);
                push_vec(&mut vertices, tip, color);
            }
            GizmoMode::Rotate => {}
        }

        match mode {
            GizmoMode::Translate => {
                let arrow = length * 0.15;
                let back = tip - dir * arrow;
                push_vec(&mut vertices, tip, color);
                push_vec(&mut vertices, back + side * arrow * 0.5, color);
                push_vec(&mut vertices, tip, color);
                push_vec(&mut vertices, back - side * arrow * 0.5, color);
            }
            GizmoMode::Scale => {
                // Small square cap at the tip
                let h = length * 0.06;
                let corners = [
                    tip + side * h,
                    tip + side * h + dir * h * 2.0,
                    tip - side * h + dir * h * 2.0,
                    tip - side * h,
                ];
                for k in 0..4 {
                    push_vec(&mut vertices, corners[k], color);
                    push_vec(&mut vertices, corners[(k + 1) % 4], color);
                }
            }
            GizmoMode::Rotate => {
                // Ring in the plane perpendicular to the axis
                let (u, v) = perpendiculars(axis);
                let segments = 48;
                for k in 0..segments {
                    let a0 = k as f32 / segments as f32 * std::f32::consts::TAU;
                    let a1 = (k + 1) as f32 / segments as f32 * std::f32::consts::TAU;
                    let p0 = center + (u * a0.cos() + v * a0.sin()) * length;
                    let p1 = center + (u * a1.cos() + v * a1.sin()) * length;
                    push_vec(&mut vertices, p0, color);
                    push_vec(&mut vertices, p1, color);
                }
            }
        }
    }

    LineMeshData { vertices }
}

// ── Helpers ──────────────────────────────────────────────────

fn axis_color(axis: GizmoAxis) -> [f32; 4] {
    match axis {
        GizmoAxis::X => [0.9, 0.2, 0.2, 1.0],
        GizmoAxis::Y => [0.2, 0.8, 0.2, 1.0],
        GizmoAxis::Z => [0.2, 0.3, 0.9, 1.0],
    }
}

fn perpendiculars(axis: GizmoAxis) -> (Vec3, Vec3) {
    match axis {
        GizmoAxis::X => (Vec3::Y, Vec3::Z),
        GizmoAxis::Y => (Vec3::Z, Vec3::X),
        GizmoAxis::Z => (Vec3::X, Vec3::Y),
    }
}

fn push_vec(v: &mut Vec<f32>, p: Vec3, c: [f32; 4]) {
    push_line_vert(v, p.x, p.y, p.z, c);
}

/// Minimum distance between a ray and a line segment.
fn ray_line_distance(ray: &Ray, line_start: Vec3, line_end: Vec3) -> f32 {
    let u = ray.direction;
    let v = line_end - line_start;
    let w = ray.origin - line_start;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);

    let denom = a * c - b * b;

    let (sc, tc) = if denom < 1e-7 {
        // Nearly parallel
        (0.0, if b > c { d / b } else { e / c })
    } else {
        ((b * e - c * d) / denom, (a * e - b * d) / denom)
    };

    let tc = tc.clamp(0.0, 1.0);
    let sc = sc.max(0.0);

    let closest_ray = ray.origin + u * sc;
    let closest_line = line_start + v * tc;

    (closest_ray - closest_line).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_gizmo(mode: GizmoMode) -> TransformGizmo {
        let mut g = TransformGizmo::default();
        g.mode = mode;
        g.enabled = true;
        g.attach("obj".to_string());
        g
    }

    #[test]
    fn test_begin_drag_requires_enabled_and_attached() {
        let mut g = TransformGizmo::default();
        g.enabled = true;
        assert!(!g.begin_drag(GizmoAxis::X, Transform::new()));

        g.attach("a".to_string());
        g.enabled = false;
        assert!(!g.begin_drag(GizmoAxis::X, Transform::new()));

        g.enabled = true;
        assert!(g.begin_drag(GizmoAxis::X, Transform::new()));
        assert!(g.is_dragging());
    }

    #[test]
    fn test_hidden_axis_cannot_be_dragged() {
        let mut g = active_gizmo(GizmoMode::Translate);
        g.show_y = false;
        assert!(!g.begin_drag(GizmoAxis::Y, Transform::new()));
    }

    #[test]
    fn test_translate_snaps_to_grid() {
        let mut g = active_gizmo(GizmoMode::Translate);
        g.begin_drag(GizmoAxis::X, Transform::at([0.3, 0.3, 0.3]));

        let t = g.update_drag(1.0).unwrap();
        assert_eq!(t.position[0], 0.0);

        let t = g.update_drag(3.9).unwrap();
        assert_eq!(t.position[0], 5.0);
        assert_eq!(t.position[1], 0.3);

        let t = g.update_drag(-12.0).unwrap();
        assert_eq!(t.position[0], -5.0);
    }

    #[test]
    fn test_rotate_snaps_to_fifteen_degrees() {
        let mut g = active_gizmo(GizmoMode::Rotate);
        g.begin_drag(GizmoAxis::Y, Transform::new());
        let t = g.update_drag(0.3).unwrap();
        assert!((t.rotation[1] - std::f32::consts::PI / 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_snaps_and_stays_positive() {
        let mut g = active_gizmo(GizmoMode::Scale);
        g.begin_drag(GizmoAxis::Z, Transform::new());
        let t = g.update_drag(0.26).unwrap();
        assert!((t.scale[2] - 1.3).abs() < 1e-5);

        let t = g.update_drag(-10.0).unwrap();
        assert_eq!(t.scale[2], MIN_SCALE);
    }

    #[test]
    fn test_unsnapped_drag() {
        let mut g = active_gizmo(GizmoMode::Translate);
        g.snap.enabled = false;
        g.begin_drag(GizmoAxis::X, Transform::new());
        let t = g.update_drag(0.37).unwrap();
        assert!((t.position[0] - 0.37).abs() < 1e-6);
    }

    #[test]
    fn test_detach_cancels_drag() {
        let mut g = active_gizmo(GizmoMode::Translate);
        g.begin_drag(GizmoAxis::X, Transform::new());
        assert_eq!(g.detach().as_deref(), Some("obj"));
        assert!(!g.is_dragging());
        assert!(g.update_drag(1.0).is_none());
    }

    #[test]
    fn test_hit_test_picks_axis() {
        let g = active_gizmo(GizmoMode::Translate);
        let ray = Ray {
            origin: Vec3::new(1.0, 0.05, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(g.hit_test(&ray, Vec3::ZERO), Some(GizmoAxis::X));

        let miss = Ray {
            origin: Vec3::new(3.0, 3.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(g.hit_test(&miss, Vec3::ZERO), None);
    }

    #[test]
    fn test_hit_test_inactive_gizmo() {
        let mut g = active_gizmo(GizmoMode::Translate);
        g.enabled = false;
        let ray = Ray {
            origin: Vec3::new(1.0, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(g.hit_test(&ray, Vec3::ZERO), None);
    }

    #[test]
    fn test_rotate_mode_hits_ring() {
        let g = active_gizmo(GizmoMode::Rotate);
        // Z ring lies in the XY plane facing the camera
        let on_ring = Ray {
            origin: Vec3::new(0.0, 1.5, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(g.hit_test(&on_ring, Vec3::ZERO), Some(GizmoAxis::Z));

        let inside = Ray {
            origin: Vec3::new(0.3, 0.4, 5.0),
            direction: Vec3::NEG_Z,
        };
        assert_eq!(g.hit_test(&inside, Vec3::ZERO), None);
    }

    #[test]
    fn test_drag_amount_along_screen_axis() {
        let cam = OrbitCamera::new();
        let vp = Viewport::new(800.0, 600.0);
        let along = compute_drag_amount(&cam, &vp, Vec3::ZERO, GizmoAxis::X, Vec2::new(50.0, 0.0));
        assert!(along > 0.0);
        let across = compute_drag_amount(&cam, &vp, Vec3::ZERO, GizmoAxis::X, Vec2::new(0.0, 50.0));
        assert!(across.abs() < 1e-4);
        // Z points at the camera, so it has no usable screen extent
        let depth = compute_drag_amount(&cam, &vp, Vec3::ZERO, GizmoAxis::Z, Vec2::new(50.0, 50.0));
        assert_eq!(depth, 0.0);
    }

    #[test]
    fn test_rotate_drag_amount_uses_pointer_travel() {
        let g = active_gizmo(GizmoMode::Rotate);
        let cam = OrbitCamera::new();
        let vp = Viewport::new(800.0, 600.0);
        let amount = g.drag_amount(&cam, &vp, Vec3::ZERO, GizmoAxis::Z, Vec2::new(30.0, 0.0));
        assert!((amount - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_lines_skip_hidden_axes() {
        let all = build_gizmo_lines(Vec3::ZERO, 1.0, GizmoMode::Translate, |_| true);
        let two = build_gizmo_lines(Vec3::ZERO, 1.0, GizmoMode::Translate, |a| a != GizmoAxis::Z);
        assert_eq!(all.vertices.len() / 7, 18);
        assert_eq!(two.vertices.len() / 7, 12);
    }
}
