//! Main application module: a minimal host shell around the editor session

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use eframe::egui;

use crate::bridge::{BridgeHandle, DiagnosticLog};
use crate::session::EditorSession;
use crate::state::settings::EditorSettings;
use crate::viewport::ViewportPanel;

/// Diagnostic lines kept for the status bar
const MAX_LOG_LINES: usize = 50;

/// Main application
pub struct LoevApp {
    session: EditorSession,
    /// Host side of the bridge; the toolbar only talks to the core through it
    bridge: BridgeHandle,
    diagnostics: Receiver<String>,
    log_lines: VecDeque<String>,
    viewport: ViewportPanel,
    show_log: bool,
}

impl LoevApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: EditorSettings) -> Self {
        let (log, diagnostics) = DiagnosticLog::channel();
        let (session, bridge) = EditorSession::new(settings, log);

        let mut viewport = ViewportPanel::new();
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        Self {
            session,
            bridge,
            diagnostics,
            log_lines: VecDeque::new(),
            viewport,
            show_log: false,
        }
    }

    fn collect_diagnostics(&mut self) {
        for line in self.diagnostics.try_iter() {
            self.log_lines.push_back(line);
            if self.log_lines.len() > MAX_LOG_LINES {
                self.log_lines.pop_front();
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let active = self.session.controller().tool();
            for name in shared::TOOL_NAMES {
                let selected = active.as_str() == name;
                if ui.selectable_label(selected, capitalize(name)).clicked() {
                    self.bridge.set_active_tool(name);
                }
            }

            ui.separator();

            if ui.button("Add Cube").clicked() {
                self.bridge.add_object();
            }

            ui.separator();

            let mut grid = self.session.settings().viewport.grid_visible;
            if ui.checkbox(&mut grid, "Grid").changed() {
                self.session.settings_mut().viewport.grid_visible = grid;
                self.session.settings().save();
            }
            ui.checkbox(&mut self.show_log, "Log");
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let tool = self.session.controller().tool();
            ui.weak(format!("Tool: {}", tool.as_str()));
            ui.separator();
            ui.weak(format!("Objects: {}", self.session.scene().objects().len()));
            ui.separator();
            if let Some(attached) = self.session.controller().state().gizmo.attached() {
                ui.weak(format!("Attached: {}", short_id(attached)));
                ui.separator();
            }
            if let Some(line) = self.log_lines.back() {
                ui.weak(line);
            }
        });
    }
}

impl eframe::App for LoevApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Events queued during the previous update run now, in one pass
        self.session.frame();
        self.collect_diagnostics();

        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 4)),
            )
            .show(ctx, |ui| self.toolbar(ui));

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| self.status_bar(ui));

        if self.show_log {
            egui::SidePanel::right("log")
                .default_width(320.0)
                .resizable(true)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical()
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for line in &self.log_lines {
                                ui.monospace(line);
                            }
                        });
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.session);
            });

        // Idle animation and camera damping run every frame
        ctx.request_repaint();
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
