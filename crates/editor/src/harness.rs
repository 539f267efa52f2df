//! Headless test harness driving an [`EditorSession`] the way a host would.

use std::sync::mpsc::Receiver;

use glam::{Vec2, Vec3};
use shared::ObjectId;

use crate::bridge::{BridgeHandle, DiagnosticLog};
use crate::helpers::model_matrix;
use crate::input::InputEvent;
use crate::session::EditorSession;
use crate::state::settings::EditorSettings;

/// Headless harness: a session, its bridge handle and the diagnostics it emitted
pub struct TestHarness {
    pub session: EditorSession,
    pub bridge: BridgeHandle,
    diagnostics: Receiver<String>,
    lines: Vec<String>,
}

impl TestHarness {
    /// Session with default settings and idle animation turned off
    pub fn new() -> Self {
        let mut settings = EditorSettings::default();
        settings.scene.idle_spin = 0.0;
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        let (log, diagnostics) = DiagnosticLog::channel();
        let (session, bridge) = EditorSession::new(settings, log);
        Self {
            session,
            bridge,
            diagnostics,
            lines: Vec::new(),
        }
    }

    // ── Driving ───────────────────────────────────────────────

    /// Run one frame and collect any diagnostics it produced
    pub fn step(&mut self) {
        self.session.frame();
        self.lines.extend(self.diagnostics.try_iter());
    }

    pub fn set_tool(&mut self, name: &str) {
        self.bridge.set_active_tool(name);
        self.step();
    }

    pub fn add_object(&mut self) -> ObjectId {
        let before: Vec<ObjectId> = self.object_ids();
        self.bridge.add_object();
        self.step();
        self.object_ids()
            .into_iter()
            .find(|id| !before.contains(id))
            .unwrap_or_default()
    }

    /// Pointer down and up at a viewport pixel
    pub fn click(&mut self, x: f32, y: f32) {
        self.session.push_input(InputEvent::PointerDown { x, y });
        self.session.push_input(InputEvent::PointerUp);
        self.step();
    }

    /// Click the screen projection of a triangle's centroid on `object`
    pub fn click_triangle(&mut self, object: &str, triangle: usize) -> bool {
        let Some(screen) = self.triangle_screen_point(object, triangle) else {
            return false;
        };
        self.click(screen.x, screen.y);
        true
    }

    /// Click a corner of the viewport, where nothing is expected
    pub fn click_empty(&mut self) {
        self.click(2.0, 2.0);
    }

    pub fn drag(&mut self, from: Vec2, delta: Vec2) {
        self.session.push_input(InputEvent::PointerDown { x: from.x, y: from.y });
        self.session.push_input(InputEvent::PointerDrag {
            dx: delta.x,
            dy: delta.y,
        });
        self.session.push_input(InputEvent::PointerUp);
        self.step();
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn default_object(&self) -> ObjectId {
        self.session
            .scene()
            .default_object_id()
            .cloned()
            .unwrap_or_default()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.session
            .scene()
            .objects()
            .iter()
            .map(|o| o.id.clone())
            .collect()
    }

    pub fn triangle_screen_point(&self, object: &str, triangle: usize) -> Option<Vec2> {
        let object = self.session.scene().get(object)?;
        let [a, b, c] = object.geometry.triangle_positions(triangle).ok()?;
        let centroid = (a + b + c) / 3.0;
        let world = model_matrix(&object.transform).transform_point3(centroid);
        self.screen_of(world)
    }

    pub fn screen_of(&self, world: Vec3) -> Option<Vec2> {
        self.session
            .camera()
            .project(world, self.session.viewport())
    }

    pub fn highlighted_triangles(&self) -> Option<Vec<usize>> {
        self.session
            .controller()
            .overlay()
            .current()
            .map(|m| m.triangles.clone())
    }

    pub fn attached(&self) -> Option<ObjectId> {
        self.session.controller().state().gizmo.attached().cloned()
    }

    pub fn gizmo_enabled(&self) -> bool {
        self.session.controller().state().gizmo_enabled()
    }

    pub fn orbit_enabled(&self) -> bool {
        self.session.controller().state().orbit_enabled()
    }

    /// Diagnostic lines received so far
    pub fn diagnostics(&self) -> &[String] {
        &self.lines
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
