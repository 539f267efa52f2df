use glam::{Mat4, Vec2, Vec3, Vec4};

use super::picking::Ray;

/// Pixel rectangle the scene is drawn into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Screen position → normalized device coordinates (y up)
    pub fn screen_to_ndc(&self, screen: Vec2) -> Vec2 {
        let c = self.center();
        Vec2::new(
            (screen.x - c.x) / (self.width * 0.5),
            -(screen.y - c.y) / (self.height * 0.5),
        )
    }
}

/// Orbiting perspective camera
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 5.0,
            target: Vec3::ZERO,
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }

    /// Project a 3D point to screen coordinates
    pub fn project(&self, point: Vec3, viewport: &Viewport) -> Option<Vec2> {
        let vp = self.view_projection(viewport.aspect());
        let p = vp * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let c = viewport.center();
        Some(Vec2::new(
            c.x + ndc.x * viewport.width * 0.5,
            c.y - ndc.y * viewport.height * 0.5,
        ))
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, screen: Vec2, viewport: &Viewport) -> Ray {
        let ndc = viewport.screen_to_ndc(screen);

        let vp_inv = self.view_projection(viewport.aspect()).inverse();

        // Unproject near and far points
        let near_world = vp_inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray {
            origin: self.eye_position(),
            direction: (far - near).normalize_or_zero(),
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse-driven orbit control with optional damping.
///
/// Input is ignored while disabled; pending rotation still settles in `update`.
#[derive(Debug, Clone)]
pub struct OrbitControl {
    pub enabled: bool,
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied per frame
    pub damping_factor: f32,
    /// Degrees of rotation per pixel of drag
    pub rotate_speed: f32,
    pending: Vec2,
}

impl OrbitControl {
    pub fn new(enable_damping: bool, damping_factor: f32, rotate_speed: f32) -> Self {
        Self {
            enabled: true,
            enable_damping,
            damping_factor: damping_factor.clamp(0.001, 1.0),
            rotate_speed,
            pending: Vec2::ZERO,
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        self.pending += Vec2::new(
            (-dx * self.rotate_speed).to_radians(),
            (dy * self.rotate_speed).to_radians(),
        );
    }

    pub fn zoom(&mut self, camera: &mut OrbitCamera, delta: f32) {
        if !self.enabled {
            return;
        }
        camera.distance = (camera.distance * (1.0 - delta)).clamp(0.5, 500.0);
    }

    pub fn pan(&mut self, camera: &mut OrbitCamera, dx: f32, dy: f32) {
        if !self.enabled {
            return;
        }
        let offset = camera.right_vector() * dx + camera.up_vector() * dy;
        camera.target += offset;
    }

    /// Apply pending rotation; call once per frame
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let step = if self.enable_damping {
            self.pending * self.damping_factor
        } else {
            self.pending
        };

        camera.yaw += step.x;
        camera.pitch = (camera.pitch + step.y).clamp(-1.5, 1.5);

        self.pending -= step;
        if self.pending.length_squared() < 1e-10 {
            self.pending = Vec2::ZERO;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.pending == Vec2::ZERO
    }
}

impl Default for OrbitControl {
    fn default() -> Self {
        Self::new(true, 0.05, 0.5)
    }
}
