//! Typed host commands and their execution on a session.

use shared::BridgeMessage;

use crate::bridge::decode;
use crate::error::{EditorError, Result};
use crate::session::EditorSession;
use crate::tool::ToolMode;

/// A command issued by the host shell
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    SetTool(ToolMode),
    /// Tool name outside the known set; applied as the disabled tool
    UnknownTool(String),
    AddObject,
    /// A host call that failed before reaching the core, reported on the diagnostic log
    Rejected(EditorError),
}

impl HostCommand {
    pub fn set_tool(name: &str) -> Self {
        match ToolMode::parse(name) {
            Ok(tool) => HostCommand::SetTool(tool),
            Err(_) => HostCommand::UnknownTool(name.to_string()),
        }
    }
}

impl From<BridgeMessage> for HostCommand {
    fn from(message: BridgeMessage) -> Self {
        match message {
            BridgeMessage::SetActiveTool { name } => HostCommand::set_tool(&name),
            BridgeMessage::AddObject => HostCommand::AddObject,
        }
    }
}

impl HostCommand {
    pub fn parse_json(json: &str) -> Result<Self> {
        decode(json).map(Into::into)
    }
}

/// Execute a single command. Runs to completion before anything else touches the session.
pub fn execute_command(session: &mut EditorSession, cmd: HostCommand) {
    match cmd {
        HostCommand::SetTool(tool) => session.controller_mut().set_tool(tool),
        HostCommand::UnknownTool(name) => session.controller_mut().set_tool_by_name(&name),
        HostCommand::AddObject => {
            let id = session.add_object();
            session.controller().log().info(format!("New cube added: {id}"));
        }
        HostCommand::Rejected(err) => session.controller().log().error(&err),
    }
}

/// Decode and execute one JSON command. A decode failure is also reported on the diagnostic log.
pub fn execute_json(session: &mut EditorSession, json: &str) -> Result<()> {
    let cmd = HostCommand::parse_json(json).inspect_err(|e| session.controller().log().error(e))?;
    execute_command(session, cmd);
    Ok(())
}
