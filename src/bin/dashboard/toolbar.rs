//! Connection toolbar

use eframe::egui;
use rover_sensor_dashboard::{ConnectionState, FrameStats, ToolbarState};

/// Address field and connect/disconnect button
pub struct Toolbar {
    address: String,
}

impl Toolbar {
    pub fn new(address: String) -> Self {
        Self { address }
    }

    /// Draw the toolbar; returns the target address when the button is clicked
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        state: ToolbarState,
        stats: FrameStats,
        samples: usize,
    ) -> Option<String> {
        let mut clicked = None;

        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Rover");
                ui.separator();

                ui.label("Address:");
                let idle = state.state == ConnectionState::Disconnected;
                ui.add_enabled(
                    idle,
                    egui::TextEdit::singleline(&mut self.address).desired_width(180.0),
                );

                let (text, enabled) = match state.state {
                    ConnectionState::Disconnected => ("▶ Connect", true),
                    ConnectionState::Connecting => ("Connecting...", false),
                    ConnectionState::Open => ("⏹ Disconnect", true),
                    ConnectionState::Closing => ("Closing...", false),
                };
                if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                    clicked = Some(self.address.trim().to_string());
                }

                if state.is_connected {
                    ui.label("🟢 Connected");
                } else if state.is_connecting {
                    ui.spinner();
                }

                // Status on the right
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "{} samples | {} frames | {} dropped",
                        samples, stats.accepted, stats.rejected
                    ));
                });
            });
        });

        clicked
    }
}
