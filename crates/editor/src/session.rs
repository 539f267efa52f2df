//! Cooperative per-frame scheduler.
//!
//! Everything that mutates the scene or the editor state runs inside
//! [`EditorSession::frame`], one step at a time: host commands first, then
//! queued input, then camera damping, then idle animation.

use glam::{Vec2, Vec3};
use shared::{ObjectId, Transform};

use crate::bridge::{Bridge, BridgeHandle, DiagnosticLog};
use crate::command::execute_command;
use crate::input::{InputEvent, InputQueue};
use crate::state::scene::{ObjectSpec, SceneState};
use crate::state::settings::EditorSettings;
use crate::tool::ToolController;
use crate::viewport::camera::{OrbitCamera, Viewport};
use crate::viewport::picking::{pick, PickHit};

/// World units panned per pixel, per unit of camera distance
const PAN_SPEED: f32 = 0.002;

pub struct EditorSession {
    scene: SceneState,
    camera: OrbitCamera,
    viewport: Viewport,
    controller: ToolController,
    bridge: Bridge,
    input: InputQueue,
    settings: EditorSettings,
    frame_count: u64,
}

impl EditorSession {
    /// New session with the default box, plus the handle the host uses to reach it
    pub fn new(settings: EditorSettings, log: DiagnosticLog) -> (Self, BridgeHandle) {
        let (handle, bridge) = Bridge::channel();
        let session = Self {
            scene: SceneState::with_default_object(&settings.scene),
            camera: OrbitCamera::new(),
            viewport: Viewport::new(800.0, 600.0),
            controller: ToolController::new(&settings, log),
            bridge,
            input: InputQueue::default(),
            settings,
            frame_count: 0,
        };
        (session, handle)
    }

    /// Default settings, no diagnostics receiver, bridge handle discarded
    pub fn headless() -> Self {
        Self::new(EditorSettings::default(), DiagnosticLog::disabled()).0
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneState {
        &mut self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn controller(&self) -> &ToolController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ToolController {
        &mut self.controller
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn add_object(&mut self) -> ObjectId {
        self.scene
            .add_object(ObjectSpec::cube(self.settings.scene.new_object_size))
    }

    /// Run one frame
    pub fn frame(&mut self) {
        for cmd in self.bridge.drain() {
            tracing::debug!("Host command: {cmd:?}");
            execute_command(self, cmd);
        }

        for event in self.input.drain() {
            self.handle_input(event);
        }

        let orbit = &mut self.controller.state_mut().orbit;
        orbit.update(&mut self.camera);

        self.idle_animation();
        self.frame_count += 1;
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Vec2::new(x, y)),
            InputEvent::PointerDrag { dx, dy } => self.pointer_drag(Vec2::new(dx, dy)),
            InputEvent::PointerUp => self.controller.end_gizmo_drag(),
            InputEvent::Zoom(delta) => {
                let speed = self.settings.orbit.zoom_speed;
                let orbit = &mut self.controller.state_mut().orbit;
                orbit.zoom(&mut self.camera, delta * speed);
            }
            InputEvent::Pan { dx, dy } => {
                let scale = self.camera.distance * PAN_SPEED;
                let orbit = &mut self.controller.state_mut().orbit;
                orbit.pan(&mut self.camera, -dx * scale, dy * scale);
            }
            InputEvent::Resize { width, height } => {
                self.viewport = Viewport::new(width, height);
            }
        }
    }

    /// Gizmo handles take precedence over picking
    fn pointer_down(&mut self, screen: Vec2) {
        if let Some(transform) = self.attached_transform() {
            let ray = self.camera.screen_ray(screen, &self.viewport);
            let center = Vec3::from(transform.position);
            if let Some(axis) = self.controller.state().gizmo.hit_test(&ray, center) {
                if self.controller.begin_gizmo_drag(axis, transform) {
                    tracing::debug!("Gizmo drag started on {axis:?}");
                    return;
                }
            }
        }

        let hit = self.pick_at(screen);
        self.controller.on_pick(&self.scene, hit.as_ref());
    }

    fn pointer_drag(&mut self, delta: Vec2) {
        let Some(drag) = self.controller.state().gizmo.drag().cloned() else {
            self.controller.state_mut().orbit.rotate(delta.x, delta.y);
            return;
        };
        let Some(id) = self.controller.state().gizmo.attached().cloned() else {
            return;
        };

        let center = Vec3::from(drag.start.position);
        let gizmo = &self.controller.state().gizmo;
        let amount = gizmo.drag_amount(&self.camera, &self.viewport, center, drag.axis, delta);
        if let Some(transform) = self.controller.update_gizmo_drag(amount) {
            self.scene.set_transform(&id, transform);
        }
    }

    /// Pick the nearest selectable object under a viewport pixel
    pub fn pick_at(&self, screen: Vec2) -> Option<PickHit> {
        pick(screen, &self.viewport, &self.camera, self.scene.selectable())
    }

    fn attached_transform(&self) -> Option<Transform> {
        let gizmo = &self.controller.state().gizmo;
        if !gizmo.is_active() {
            return None;
        }
        self.scene.get(gizmo.attached()?).map(|o| o.transform)
    }

    /// Spin the default box while nothing is attached to the gizmo
    fn idle_animation(&mut self) {
        if self.controller.state().gizmo.is_attached() {
            return;
        }
        let spin = self.settings.scene.idle_spin;
        let Some(id) = self.scene.default_object_id().cloned() else {
            return;
        };
        if let Some(object) = self.scene.get_mut(&id) {
            object.transform.rotation[0] += spin;
            object.transform.rotation[1] += spin;
            self.scene.notify_mutated();
        }
    }
}
