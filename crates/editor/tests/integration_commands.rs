//! Integration tests for host commands crossing the bridge.

use loev_editor_lib::bridge::DiagnosticLog;
use loev_editor_lib::command::{execute_json, HostCommand};
use loev_editor_lib::harness::TestHarness;
use loev_editor_lib::session::EditorSession;
use loev_editor_lib::state::EditorSettings;
use loev_editor_lib::tool::ToolMode;
use shared::BridgeMessage;

#[test]
fn test_commands_apply_on_next_frame() {
    let mut h = TestHarness::new();
    h.bridge.set_active_tool("scale");
    h.bridge.add_object();
    assert_eq!(h.session.controller().tool(), ToolMode::Select);
    assert_eq!(h.session.scene().objects().len(), 1);

    h.step();
    assert_eq!(h.session.controller().tool(), ToolMode::Scale);
    assert_eq!(h.session.scene().objects().len(), 2);
}

#[test]
fn test_json_messages_over_bridge() {
    let mut h = TestHarness::new();
    h.bridge
        .send_json(&BridgeMessage::SetActiveTool { name: "rotate".into() }.to_json());
    h.bridge.send_json(r#"{"command": "add_object"}"#);
    h.step();

    assert_eq!(h.session.controller().tool(), ToolMode::Rotate);
    assert_eq!(h.session.scene().selectable_count(), 2);
}

#[test]
fn test_malformed_json_changes_nothing() {
    let mut h = TestHarness::new();
    let version = h.session.scene().version();
    h.bridge.send_json("{\"command\": ");
    h.bridge.send_json(r#"{"command": "remove_object"}"#);
    h.step();

    assert_eq!(h.session.scene().version(), version);
    assert_eq!(h.session.controller().tool(), ToolMode::Select);
}

#[test]
fn test_diagnostics_reported_to_host() {
    let mut h = TestHarness::new();
    h.set_tool("move");
    h.add_object();

    let lines = h.diagnostics();
    assert!(lines.iter().any(|l| l == "Tool set to: move"));
    assert!(lines.iter().any(|l| l.starts_with("New cube added")));
}

#[test]
fn test_unknown_tool_is_not_an_error_for_the_host() {
    let mut h = TestHarness::new();
    h.set_tool("lasso");
    assert_eq!(h.session.controller().tool(), ToolMode::Disabled);
    assert!(h.orbit_enabled());
    assert!(!h.gizmo_enabled());
    assert!(h.diagnostics().iter().any(|l| l == "Tool set to: disabled"));
}

#[test]
fn test_unknown_tool_name_reaches_diagnostics() {
    let mut h = TestHarness::new();
    h.set_tool("lasso");
    assert!(h
        .diagnostics()
        .iter()
        .any(|l| l == "Error: unknown tool name: lasso"));
}

#[test]
fn test_malformed_json_reaches_diagnostics() {
    let mut h = TestHarness::new();
    h.bridge.send_json("{ not json");
    h.bridge.send_json(r#"{"command": "remove_object"}"#);
    h.step();

    let failures: Vec<&String> = h
        .diagnostics()
        .iter()
        .filter(|l| l.starts_with("Error: bridge call failed"))
        .collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(h.session.controller().tool(), ToolMode::Select);
}

#[test]
fn test_handle_works_from_another_thread() {
    let (mut session, handle) = EditorSession::new(EditorSettings::default(), DiagnosticLog::disabled());
    let before = session.scene().objects().len();

    std::thread::spawn(move || {
        handle.add_object();
        handle.set_active_tool("move");
    })
    .join()
    .unwrap();

    session.frame();
    assert_eq!(session.scene().objects().len(), before + 1);
    assert_eq!(session.controller().tool(), ToolMode::Move);
}

#[test]
fn test_execute_json_directly() {
    let mut session = EditorSession::headless();
    execute_json(&mut session, r#"{"command": "set_active_tool", "name": "select"}"#).unwrap();
    assert!(execute_json(&mut session, "[]").is_err());
    assert_eq!(
        HostCommand::parse_json(r#"{"command": "add_object"}"#).unwrap(),
        HostCommand::AddObject
    );
}
