//! Types shared between the editor core and the host shell that embeds it.
//!
//! The host never links against the editor internals; it only needs to know
//! how to address objects and how to phrase the two inbound commands.

use serde::{Deserialize, Serialize};

/// Unique identifier of an object in the scene
pub type ObjectId = String;

/// Tool names the host toolbar is expected to send
pub const TOOL_NAMES: [&str; 4] = ["select", "move", "rotate", "scale"];

/// Object transform: position, Euler rotation (radians, XYZ order) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Identity rotation and scale at the given position
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbound message from the host shell.
///
/// Wire form is a tagged JSON object, e.g. `{"command": "set_active_tool", "name": "move"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BridgeMessage {
    /// Switch the active tool. Unknown names are accepted and degrade on the core side.
    SetActiveTool { name: String },
    /// Add a new box to the scene
    AddObject,
}

impl BridgeMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, [0.0; 3]);
        assert_eq!(t.rotation, [0.0; 3]);
        assert_eq!(t.scale, [1.0; 3]);
    }

    #[test]
    fn test_transform_at_keeps_unit_scale() {
        let t = Transform::at([1.0, 2.0, 3.0]);
        assert_eq!(t.position, [1.0, 2.0, 3.0]);
        assert_eq!(t.scale, [1.0; 3]);
    }

    #[test]
    fn test_bridge_message_set_tool_wire_format() {
        let msg = BridgeMessage::SetActiveTool {
            name: "move".to_string(),
        };
        let json = msg.to_json();
        assert!(json.contains(r#""command":"set_active_tool""#));
        assert!(json.contains(r#""name":"move""#));
    }

    #[test]
    fn test_bridge_message_parse_add_object() {
        let msg: BridgeMessage = serde_json::from_str(r#"{"command": "add_object"}"#).unwrap();
        assert_eq!(msg, BridgeMessage::AddObject);
    }

    #[test]
    fn test_bridge_message_unknown_command_rejected() {
        let res: Result<BridgeMessage, _> = serde_json::from_str(r#"{"command": "delete_all"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_bridge_message_unknown_tool_name_still_parses() {
        let msg: BridgeMessage =
            serde_json::from_str(r#"{"command": "set_active_tool", "name": "lasso"}"#).unwrap();
        assert_eq!(
            msg,
            BridgeMessage::SetActiveTool {
                name: "lasso".to_string()
            }
        );
    }
}
