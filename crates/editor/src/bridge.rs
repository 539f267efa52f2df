//! Boundary between the host shell and the editor core.
//!
//! The host holds a [`BridgeHandle`] and fires commands at the core without
//! waiting for an answer. The core drains them from [`Bridge`] once per frame.
//! The only thing flowing back is free-form text on a [`DiagnosticLog`].

use std::sync::mpsc;

use shared::BridgeMessage;

use crate::command::HostCommand;
use crate::error::{EditorError, Result};

/// Host-side sender. Every call is fire-and-forget.
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::Sender<HostCommand>,
}

impl BridgeHandle {
    pub fn set_active_tool(&self, name: &str) {
        self.deliver(HostCommand::set_tool(name));
    }

    pub fn add_object(&self) {
        self.deliver(HostCommand::AddObject);
    }

    /// Forward a JSON-encoded [`BridgeMessage`]. Malformed input reaches the core
    /// as a rejection so it shows up on the diagnostic log.
    pub fn send_json(&self, json: &str) {
        self.deliver(HostCommand::parse_json(json).unwrap_or_else(HostCommand::Rejected));
    }

    pub fn send_message(&self, message: BridgeMessage) {
        self.deliver(message.into());
    }

    fn deliver(&self, cmd: HostCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::debug!("Editor core not ready, command dropped");
        }
    }
}

/// Core-side receiver of host commands
pub struct Bridge {
    rx: mpsc::Receiver<HostCommand>,
}

impl Bridge {
    pub fn channel() -> (BridgeHandle, Bridge) {
        let (tx, rx) = mpsc::channel();
        (BridgeHandle { tx }, Bridge { rx })
    }

    /// Take every command delivered so far, in arrival order
    pub fn drain(&self) -> Vec<HostCommand> {
        let mut commands = Vec::new();
        while let Ok(cmd) = self.rx.try_recv() {
            commands.push(cmd);
        }
        commands
    }
}

/// One-way diagnostic text channel to the host.
///
/// Every line is also emitted through `tracing`. A log without a receiver
/// only traces.
#[derive(Clone, Default)]
pub struct DiagnosticLog {
    tx: Option<mpsc::Sender<String>>,
}

impl DiagnosticLog {
    pub fn channel() -> (DiagnosticLog, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (DiagnosticLog { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn info(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{line}");
        self.send(line);
    }

    pub fn error(&self, err: &EditorError) {
        tracing::error!("{err}");
        self.send(format!("Error: {err}"));
    }

    fn send(&self, line: String) {
        if let Some(tx) = &self.tx {
            // Host may have stopped listening
            let _ = tx.send(line);
        }
    }
}

/// Decode one JSON bridge message
pub fn decode(json: &str) -> Result<BridgeMessage> {
    serde_json::from_str(json).map_err(|e| EditorError::BridgeCallFailure(e.to_string()))
}
