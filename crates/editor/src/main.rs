mod app;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::session`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use loev_editor_lib::bridge;
pub use loev_editor_lib::helpers;
pub use loev_editor_lib::input;
pub use loev_editor_lib::session;
pub use loev_editor_lib::state;

use app::LoevApp;
use state::settings::EditorSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loev_editor=info,loev_editor_lib=info".into()),
        )
        .init();

    let settings = EditorSettings::load();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("loev")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "loev-editor",
        native_options,
        Box::new(move |cc| Ok(Box::new(LoevApp::new(cc, settings)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}
