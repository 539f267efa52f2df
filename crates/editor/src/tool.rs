//! Tool modes and the controller that arbitrates between camera orbit,
//! gizmo attachment and face highlighting.

use shared::Transform;

use crate::bridge::DiagnosticLog;
use crate::error::{EditorError, Result};
use crate::state::scene::SceneState;
use crate::state::selection::FaceSelection;
use crate::state::settings::EditorSettings;
use crate::state::EditorState;
use crate::viewport::adjacency::{AdjacencyStrategy, PairedQuadStrategy};
use crate::viewport::gizmo::{GizmoAxis, GizmoMode};
use crate::viewport::highlight::HighlightOverlay;
use crate::viewport::picking::PickHit;

/// Active editing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    Select,
    Move,
    Rotate,
    Scale,
    /// Fallback for unrecognized tool names: no transform affordance, no selection
    Disabled,
}

impl ToolMode {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "select" => Ok(ToolMode::Select),
            "move" => Ok(ToolMode::Move),
            "rotate" => Ok(ToolMode::Rotate),
            "scale" => Ok(ToolMode::Scale),
            other => Err(EditorError::InvalidToolName(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::Move => "move",
            ToolMode::Rotate => "rotate",
            ToolMode::Scale => "scale",
            ToolMode::Disabled => "disabled",
        }
    }

    /// Gizmo mode for transform tools
    pub fn gizmo_mode(self) -> Option<GizmoMode> {
        match self {
            ToolMode::Move => Some(GizmoMode::Translate),
            ToolMode::Rotate => Some(GizmoMode::Rotate),
            ToolMode::Scale => Some(GizmoMode::Scale),
            ToolMode::Select | ToolMode::Disabled => None,
        }
    }

    pub fn is_transform(self) -> bool {
        self.gizmo_mode().is_some()
    }
}

/// Tool state machine. Owns the editor state and the single highlight overlay.
pub struct ToolController {
    state: EditorState,
    overlay: HighlightOverlay,
    strategy: Box<dyn AdjacencyStrategy>,
    log: DiagnosticLog,
}

impl ToolController {
    pub fn new(settings: &EditorSettings, log: DiagnosticLog) -> Self {
        let mut controller = Self {
            state: EditorState::new(settings),
            overlay: HighlightOverlay::new(settings.highlight.clone()),
            strategy: Box::new(PairedQuadStrategy::default()),
            log,
        };
        controller.set_tool(ToolMode::Select);
        controller
    }

    /// Replace the adjacency heuristic used when rebuilding highlights
    pub fn with_strategy(mut self, strategy: impl AdjacencyStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }

    pub fn tool(&self) -> ToolMode {
        self.state.tool
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    /// Unknown names are reported to the host and degrade to [`ToolMode::Disabled`]
    pub fn set_tool_by_name(&mut self, name: &str) {
        let tool = ToolMode::parse(name).unwrap_or_else(|e| {
            self.log.error(&e);
            ToolMode::Disabled
        });
        self.set_tool(tool);
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        self.state.tool = tool;
        let gizmo = &mut self.state.gizmo;

        self.state.orbit.enabled = true;
        gizmo.show_all_axes();

        match tool.gizmo_mode() {
            Some(mode) => {
                gizmo.mode = mode;
                gizmo.enabled = true;
            }
            None => {
                gizmo.enabled = false;
                if tool == ToolMode::Disabled {
                    gizmo.detach();
                }
            }
        }

        if !gizmo.is_attached() {
            gizmo.enabled = false;
        }
        gizmo.end_drag();

        self.log.info(format!("Tool set to: {}", tool.as_str()));
    }

    /// React to a pointer pick (`None` means empty space was clicked)
    pub fn on_pick(&mut self, scene: &SceneState, hit: Option<&PickHit>) {
        let Some(hit) = hit else {
            self.clear_selection();
            if self.state.gizmo.detach().is_some() {
                self.log.info("Detached from object");
                self.set_tool(self.state.tool);
            }
            return;
        };

        self.log.info(format!(
            "Picked {} at triangle {} ({:.3})",
            hit.object_id, hit.triangle_index, hit.distance
        ));

        match self.state.tool {
            ToolMode::Move | ToolMode::Rotate | ToolMode::Scale => {
                if self.state.gizmo.attached() != Some(&hit.object_id) {
                    self.state.gizmo.attach(hit.object_id.clone());
                    self.log.info(format!("Attached to {}", hit.object_id));
                    self.set_tool(self.state.tool);
                }
                self.rebuild_highlight(scene, hit);
            }
            ToolMode::Select => {
                if self.state.gizmo.detach().is_some() {
                    self.set_tool(self.state.tool);
                }
                self.rebuild_highlight(scene, hit);
            }
            ToolMode::Disabled => self.clear_selection(),
        }
    }

    /// Drop the face selection and its overlay
    pub fn clear_selection(&mut self) {
        self.state.selection = None;
        self.overlay.remove();
    }

    fn rebuild_highlight(&mut self, scene: &SceneState, hit: &PickHit) {
        if let Err(e) = self.try_rebuild_highlight(scene, hit) {
            self.clear_selection();
            self.log.error(&e);
        }
    }

    fn try_rebuild_highlight(&mut self, scene: &SceneState, hit: &PickHit) -> Result<()> {
        let Some(object) = scene.get(&hit.object_id) else {
            return Err(EditorError::MissingGeometryData {
                object: hit.object_id.clone(),
                buffer: "index",
            });
        };

        object.geometry.require_complete(&object.id)?;
        let face = self.strategy.resolve(&object.geometry, hit.triangle_index)?;
        self.overlay.build(object, &face)?;

        self.log.info(format!(
            "Highlighted face on {}: triangles {:?}",
            object.id,
            face.triangle_indices()
        ));
        self.state.selection = Some(FaceSelection::new(object.id.clone(), face));
        Ok(())
    }

    /// Grab a gizmo handle. Orbit is suspended until the drag ends.
    pub fn begin_gizmo_drag(&mut self, axis: GizmoAxis, start: Transform) -> bool {
        if !self.state.gizmo.begin_drag(axis, start) {
            return false;
        }
        self.state.orbit.enabled = false;
        true
    }

    pub fn update_gizmo_drag(&mut self, amount: f32) -> Option<Transform> {
        self.state.gizmo.update_drag(amount)
    }

    pub fn end_gizmo_drag(&mut self) {
        if self.state.gizmo.end_drag().is_some() {
            self.state.orbit.enabled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scene::ObjectSpec;
    use crate::state::settings::SceneSettings;
    use crate::viewport::adjacency::NoAdjacency;

    fn setup() -> (ToolController, SceneState) {
        let controller = ToolController::new(&EditorSettings::default(), DiagnosticLog::disabled());
        let scene = SceneState::with_default_object(&SceneSettings::default());
        (controller, scene)
    }

    fn hit(scene: &SceneState, triangle_index: usize) -> PickHit {
        PickHit {
            object_id: scene.default_object_id().unwrap().clone(),
            triangle_index,
            distance: 4.5,
            point: glam::Vec3::new(0.0, 0.0, 0.5),
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(ToolMode::parse("rotate"), Ok(ToolMode::Rotate));
        assert_eq!(
            ToolMode::parse("lasso"),
            Err(EditorError::InvalidToolName("lasso".into()))
        );
        assert!(ToolMode::parse("Move").is_err());
        for name in shared::TOOL_NAMES {
            assert_eq!(ToolMode::parse(name).map(ToolMode::as_str), Ok(name));
        }
    }

    #[test]
    fn test_starts_in_select() {
        let (c, _) = setup();
        assert_eq!(c.tool(), ToolMode::Select);
        assert!(c.state().orbit_enabled());
        assert!(!c.state().gizmo_enabled());
    }

    #[test]
    fn test_select_always_orbit_without_gizmo() {
        let (mut c, scene) = setup();
        c.set_tool(ToolMode::Move);
        c.on_pick(&scene, Some(&hit(&scene, 0)));
        c.state_mut().orbit.enabled = false;

        c.set_tool(ToolMode::Select);
        assert!(c.state().orbit_enabled());
        assert!(!c.state().gizmo_enabled());
    }

    #[test]
    fn test_move_without_attachment_keeps_gizmo_disabled() {
        let (mut c, _) = setup();
        c.set_tool(ToolMode::Move);
        assert!(!c.state().gizmo_enabled());
        assert_eq!(c.state().gizmo.mode, GizmoMode::Translate);
    }

    #[test]
    fn test_set_tool_resets_axis_visibility() {
        let (mut c, _) = setup();
        c.state_mut().gizmo.show_x = false;
        c.set_tool(ToolMode::Scale);
        assert!(c.state().gizmo.show_x);
    }

    #[test]
    fn test_move_pick_attaches_and_highlights() {
        let (mut c, scene) = setup();
        c.set_tool(ToolMode::Move);
        c.on_pick(&scene, Some(&hit(&scene, 8)));

        let id = scene.default_object_id().unwrap();
        assert_eq!(c.state().gizmo.attached(), Some(id));
        assert!(c.state().gizmo_enabled());
        assert_eq!(c.state().gizmo.mode, GizmoMode::Translate);

        let mesh = c.overlay().current().unwrap();
        assert_eq!(mesh.triangles, vec![8, 9]);
        let sel = c.state().selection.as_ref().unwrap();
        assert_eq!(sel.vertex_indices().len(), 6);
    }

    #[test]
    fn test_miss_detaches_and_clears() {
        let (mut c, scene) = setup();
        c.set_tool(ToolMode::Rotate);
        c.on_pick(&scene, Some(&hit(&scene, 2)));
        c.on_pick(&scene, None);

        assert!(c.state().gizmo.attached().is_none());
        assert!(!c.state().gizmo_enabled());
        assert!(c.state().selection.is_none());
        assert!(!c.overlay().is_live());
        assert_eq!(c.tool(), ToolMode::Rotate);
    }

    #[test]
    fn test_select_pick_detaches_but_highlights() {
        let (mut c, scene) = setup();
        c.set_tool(ToolMode::Move);
        c.on_pick(&scene, Some(&hit(&scene, 0)));
        c.set_tool(ToolMode::Select);
        assert!(c.state().gizmo.is_attached());

        c.on_pick(&scene, Some(&hit(&scene, 5)));
        assert!(!c.state().gizmo.is_attached());
        assert_eq!(c.overlay().current().unwrap().triangles, vec![5, 4]);
    }

    #[test]
    fn test_disabled_pick_clears_without_attaching() {
        let (mut c, scene) = setup();
        c.on_pick(&scene, Some(&hit(&scene, 0)));
        assert!(c.overlay().is_live());

        c.set_tool_by_name("lasso");
        assert_eq!(c.tool(), ToolMode::Disabled);
        c.on_pick(&scene, Some(&hit(&scene, 2)));
        assert!(!c.overlay().is_live());
        assert!(c.state().selection.is_none());
        assert!(!c.state().gizmo.is_attached());
    }

    #[test]
    fn test_unknown_tool_detaches() {
        let (mut c, scene) = setup();
        c.set_tool(ToolMode::Scale);
        c.on_pick(&scene, Some(&hit(&scene, 0)));
        c.set_tool_by_name("paint");
        assert!(!c.state().gizmo.is_attached());
        assert!(!c.state().gizmo_enabled());
        assert!(c.state().orbit_enabled());
    }

    #[test]
    fn test_unknown_tool_reported_on_diagnostics() {
        let (log, rx) = DiagnosticLog::channel();
        let mut c = ToolController::new(&EditorSettings::default(), log);
        c.set_tool_by_name("lasso");
        let lines: Vec<String> = rx.try_iter().collect();
        assert!(lines.contains(&"Error: unknown tool name: lasso".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Tool set to: disabled"));
    }

    #[test]
    fn test_switching_objects_reattaches() {
        let (mut c, mut scene) = setup();
        let other = scene.add_object(ObjectSpec::cube(0.8));
        c.set_tool(ToolMode::Move);
        c.on_pick(&scene, Some(&hit(&scene, 0)));

        let second = PickHit {
            object_id: other.clone(),
            ..hit(&scene, 3)
        };
        c.on_pick(&scene, Some(&second));
        assert_eq!(c.state().gizmo.attached(), Some(&other));
        assert_eq!(c.overlay().current().unwrap().object_id, other);
        assert_eq!(c.overlay().live_count(), 1);
    }

    #[test]
    fn test_failed_highlight_clears_selection() {
        let (mut c, mut scene) = setup();
        c.on_pick(&scene, Some(&hit(&scene, 0)));
        let id = scene.default_object_id().unwrap().clone();
        scene.get_mut(&id).unwrap().geometry.normals.clear();

        c.on_pick(&scene, Some(&hit(&scene, 2)));
        assert!(!c.overlay().is_live());
        assert!(c.state().selection.is_none());
    }

    #[test]
    fn test_pick_on_unknown_object_is_recovered() {
        let (mut c, scene) = setup();
        let ghost = PickHit {
            object_id: "ghost".into(),
            ..hit(&scene, 0)
        };
        c.on_pick(&scene, Some(&ghost));
        assert!(!c.overlay().is_live());
    }

    #[test]
    fn test_no_adjacency_strategy_highlights_single_triangle() {
        let (c, scene) = setup();
        let mut c = c.with_strategy(NoAdjacency);
        c.on_pick(&scene, Some(&hit(&scene, 6)));
        assert_eq!(c.overlay().current().unwrap().triangles, vec![6]);
    }

    #[test]
    fn test_gizmo_drag_suspends_orbit() {
        let (mut c, scene) = setup();
        c.set_tool(ToolMode::Move);
        assert!(!c.begin_gizmo_drag(GizmoAxis::X, Transform::new()));

        c.on_pick(&scene, Some(&hit(&scene, 0)));
        assert!(c.begin_gizmo_drag(GizmoAxis::X, Transform::new()));
        assert!(!c.state().orbit_enabled());

        c.end_gizmo_drag();
        assert!(c.state().orbit_enabled());
    }

    #[test]
    fn test_diagnostics_emitted() {
        let (log, rx) = DiagnosticLog::channel();
        let mut c = ToolController::new(&EditorSettings::default(), log);
        c.set_tool_by_name("move");
        let lines: Vec<String> = rx.try_iter().collect();
        assert!(lines.iter().any(|l| l == "Tool set to: move"));
    }
}
