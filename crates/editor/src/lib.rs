// Library crate: the headless editor core, exercised by unit and integration tests.
// The window, egui panels and GL rendering live in the binary crate.

pub mod bridge;
pub mod command;
pub mod error;
pub mod harness;
pub mod helpers;
pub mod input;
pub mod session;
pub mod state;
pub mod tool;

/// Geometry, camera, picking and overlay logic. GL upload stays in the binary.
pub mod viewport {
    pub mod adjacency;
    pub mod camera;
    pub mod gizmo;
    pub mod highlight;
    pub mod mesh;
    pub mod picking;
}
