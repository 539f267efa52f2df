//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
pub use loev_editor_lib::viewport::{camera, mesh};

use std::sync::{Arc, Mutex};

use egui::Ui;
use glam::Vec3;

use crate::helpers::model_matrix;
use crate::input::InputEvent;
use crate::session::EditorSession;
use crate::state::scene::SceneObject;
use gl_renderer::{GlRenderer, ObjectDraw, ObjectUpload, OverlayDraw, RenderParams};
use mesh::LineMeshData;

/// 3D viewport panel: turns egui pointer input into session events and paints the scene
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    last_size: Option<egui::Vec2>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            gl_renderer: None,
            last_size: None,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        match GlRenderer::new(gl) {
            Ok(renderer) => self.gl_renderer = Some(Arc::new(Mutex::new(renderer))),
            Err(e) => tracing::error!("Failed to create GL renderer: {e}"),
        }
    }

    pub fn show(&mut self, ui: &mut Ui, session: &mut EditorSession) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        self.queue_input(ui, &response, rect, session);

        if !ui.is_rect_visible(rect) {
            return;
        }

        let gizmo_lines = build_gizmo_lines(session);
        self.render_gl(ui, rect, session, gizmo_lines);
    }

    fn queue_input(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        rect: egui::Rect,
        session: &mut EditorSession,
    ) {
        if self.last_size != Some(rect.size()) {
            self.last_size = Some(rect.size());
            session.push_input(InputEvent::Resize {
                width: rect.width(),
                height: rect.height(),
            });
        }

        let (pressed, released) =
            ui.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_released()));

        if pressed && response.hovered() {
            if let Some(pos) = response.hover_pos() {
                let local = pos - rect.min;
                session.push_input(InputEvent::PointerDown {
                    x: local.x,
                    y: local.y,
                });
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            session.push_input(InputEvent::PointerDrag {
                dx: delta.x,
                dy: delta.y,
            });
        }

        if released {
            session.push_input(InputEvent::PointerUp);
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            session.push_input(InputEvent::Pan {
                dx: delta.x,
                dy: delta.y,
            });
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                session.push_input(InputEvent::Zoom(scroll));
            }
        }
    }

    fn render_gl(
        &self,
        ui: &mut Ui,
        rect: egui::Rect,
        session: &EditorSession,
        gizmo_lines: Option<LineMeshData>,
    ) {
        let Some(gl_renderer) = &self.gl_renderer else {
            return;
        };
        let renderer_clone = gl_renderer.clone();

        let camera = *session.camera();
        let scene = session.scene();
        let overlay_state = session.controller().overlay();
        let overlay_generation = overlay_state.generation();

        // Geometry crosses into the callback only when the GPU has no copy of it
        let (uploads, overlay_stale) = match gl_renderer.lock() {
            Ok(r) => (
                pending_uploads(scene.objects(), |id| r.has_mesh(id)),
                r.overlay_generation() != overlay_generation,
            ),
            Err(_) => return,
        };
        let objects: Vec<ObjectDraw> = scene
            .objects()
            .iter()
            .map(|o| ObjectDraw {
                id: o.id.clone(),
                model: model_matrix(&o.transform),
            })
            .collect();

        let overlay = overlay_state.current().map(|mesh| OverlayDraw {
            vertices: if overlay_stale { mesh.vertex_data() } else { Vec::new() },
            model: model_matrix(&mesh.transform),
        });

        let viewport_settings = session.settings().viewport.clone();
        let lights = scene.lights().to_vec();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer_clone.lock() {
                    r.update_grid(gl, &viewport_settings);
                    r.sync_objects(gl, &objects, &uploads);
                    r.sync_overlay(gl, overlay_generation, overlay.as_ref());
                    r.sync_gizmo(gl, gizmo_lines.as_ref());

                    let params = RenderParams::new(viewport, &viewport_settings, &lights);
                    r.paint(gl, &camera, &params, &objects, overlay.as_ref());
                }
            })),
        };

        ui.painter().add(callback);
    }
}

/// Gizmo handles at the attached object, if the gizmo is active
fn build_gizmo_lines(session: &EditorSession) -> Option<LineMeshData> {
    let gizmo = &session.controller().state().gizmo;
    if !gizmo.is_active() {
        return None;
    }
    let object = session.scene().get(gizmo.attached()?)?;
    Some(gizmo.lines(Vec3::from(object.transform.position)))
}

/// Geometry for objects the renderer has not uploaded yet
fn pending_uploads(objects: &[SceneObject], has_mesh: impl Fn(&str) -> bool) -> Vec<ObjectUpload> {
    objects
        .iter()
        .filter(|o| !has_mesh(&o.id))
        .map(|o| ObjectUpload {
            id: o.id.clone(),
            geometry: o.geometry.clone(),
            color: o.color,
        })
        .collect()
}
