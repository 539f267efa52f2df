pub mod scene;
pub mod selection;
pub mod settings;

pub use scene::{Light, ObjectSpec, SceneObject, SceneState};
pub use selection::FaceSelection;
pub use settings::EditorSettings;

use crate::tool::ToolMode;
use crate::viewport::camera::OrbitControl;
use crate::viewport::gizmo::TransformGizmo;

/// Interaction state owned by the tool controller.
///
/// The gizmo refers to its attached object by id only; the scene owns objects.
pub struct EditorState {
    pub tool: ToolMode,
    pub gizmo: TransformGizmo,
    pub orbit: OrbitControl,
    pub selection: Option<FaceSelection>,
}

impl EditorState {
    pub fn new(settings: &EditorSettings) -> Self {
        let orbit = OrbitControl::new(
            settings.orbit.damping,
            settings.orbit.damping_factor,
            settings.orbit.rotate_speed,
        );
        Self {
            tool: ToolMode::Select,
            gizmo: TransformGizmo::new(settings.snap.clone(), settings.viewport.gizmo_length),
            orbit,
            selection: None,
        }
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit.enabled
    }

    pub fn gizmo_enabled(&self) -> bool {
        self.gizmo.enabled
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(&EditorSettings::default())
    }
}
