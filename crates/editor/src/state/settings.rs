//! Editor settings

use serde::{Deserialize, Serialize};

/// Transform gizmo snapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapSettings {
    /// Enable snapping
    pub enabled: bool,
    /// Translation step in world units
    pub translation: f32,
    /// Rotation step in degrees
    pub rotation_degrees: f32,
    /// Scale step
    pub scale: f32,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            translation: 5.0,
            rotation_degrees: 15.0,
            scale: 0.1,
        }
    }
}

/// Camera orbit control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitSettings {
    pub damping: bool,
    /// Fraction of pending rotation applied per frame
    pub damping_factor: f32,
    /// Degrees per dragged pixel
    pub rotate_speed: f32,
    /// Zoom factor per scroll unit
    pub zoom_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping: true,
            damping_factor: 0.05,
            rotate_speed: 0.5,
            zoom_speed: 0.01,
        }
    }
}

/// Face highlight overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightSettings {
    pub color: [f32; 3],
    pub opacity: f32,
    /// Offset along the face normal to avoid z-fighting
    pub normal_offset: f32,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 0.0],
            opacity: 0.5,
            normal_offset: 0.01,
        }
    }
}

/// Scene population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSettings {
    /// Edge length of the initial box
    pub default_object_size: f32,
    /// Color of the initial box (0xRRGGBB)
    pub default_object_color: u32,
    /// Edge length of boxes added by the host
    pub new_object_size: f32,
    /// Per-child offset applied on every axis to added boxes
    pub add_offset_step: f32,
    /// Idle rotation of the initial box per frame (radians)
    pub idle_spin: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            default_object_size: 1.0,
            default_object_color: 0x0077ff,
            new_object_size: 0.8,
            add_offset_step: 0.1,
            idle_spin: 0.01,
        }
    }
}

/// Viewport display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    pub grid_visible: bool,
    pub grid_range: i32,
    pub grid_size: f32,
    /// Length of the gizmo handles in world units
    pub gizmo_length: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [0x33, 0x33, 0x33],
            grid_visible: true,
            grid_range: 10,
            grid_size: 1.0,
            gizmo_length: 1.5,
        }
    }
}

/// All editor settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub snap: SnapSettings,
    #[serde(default)]
    pub orbit: OrbitSettings,
    #[serde(default)]
    pub highlight: HighlightSettings,
    #[serde(default)]
    pub scene: SceneSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
}

impl EditorSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("org", "loev", "loev") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match Self::from_json(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("org", "loev", "loev") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    let _ = std::fs::write(config_path, json);
                }
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
