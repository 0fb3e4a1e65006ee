//! Main GUI application

use crate::charts;
use crate::toolbar::Toolbar;
use eframe::egui;
use log::error;
use rover_sensor_dashboard::{layout, ConnectionState, Dashboard, GridCell, WsConnector};
use std::sync::Arc;
use std::time::Duration;

/// Height of the drag handle strip at the top of each panel
const HEADER_HEIGHT: f32 = 24.0;

/// Gap between panels
const PANEL_MARGIN: f32 = 4.0;

/// Panel being dragged by its header
struct DragState {
    key: &'static str,
    /// Pointer position relative to the panel's top-left corner
    grab_offset: egui::Vec2,
}

/// Main application struct
pub struct DashboardApp {
    dashboard: Dashboard<WsConnector>,
    toolbar: Toolbar,
    drag: Option<DragState>,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, address: String) -> Self {
        let mut dashboard = Dashboard::new(WsConnector::new());

        // Transport events arrive off the UI thread; wake egui to drain them
        let ctx = cc.egui_ctx.clone();
        dashboard.set_waker(Arc::new(move || ctx.request_repaint()));

        Self {
            dashboard,
            toolbar: Toolbar::new(address),
            drag: None,
        }
    }

    /// Render the toolbar and forward connect/disconnect clicks
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        let clicked = self.toolbar.show(
            ctx,
            self.dashboard.toolbar_state(),
            self.dashboard.stats(),
            self.dashboard.window().len(),
        );

        if let Some(address) = clicked {
            if let Err(e) = self.dashboard.on_connect_disconnect(&address) {
                error!("Connect/disconnect failed: {}", e);
            }
        }
    }

    /// Render the chart panels on the grid
    fn render_grid(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let area = ui.available_rect_before_wrap();
            let grid = self.dashboard.layout();
            let col_width = area.width() / grid.columns() as f32;
            let row_height = (area.height() / grid.rows().max(4) as f32).max(60.0);
            let to_rect = |cell: GridCell| {
                egui::Rect::from_min_size(
                    area.min
                        + egui::vec2(cell.x as f32 * col_width, cell.y as f32 * row_height),
                    egui::vec2(cell.w as f32 * col_width, cell.h as f32 * row_height),
                )
                .shrink(PANEL_MARGIN)
            };

            let items = grid.items().to_vec();
            let mut dropped = None;

            for item in items {
                let Some(panel) = layout::panel(item.key) else {
                    continue;
                };
                let rect = to_rect(item.cell);
                let header = egui::Rect::from_min_size(
                    rect.min,
                    egui::vec2(rect.width(), HEADER_HEIGHT),
                );

                let response = ui.interact(
                    header,
                    ui.id().with(("panel_header", panel.key)),
                    egui::Sense::drag(),
                );
                if response.drag_started() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        self.drag = Some(DragState {
                            key: panel.key,
                            grab_offset: pos - rect.min,
                        });
                    }
                }
                if response.hovered() || response.dragged() {
                    ctx.set_cursor_icon(egui::CursorIcon::Grab);
                }

                // Outline where the panel will land
                if response.dragged() {
                    if let (Some(drag), Some(pos)) = (&self.drag, response.interact_pointer_pos()) {
                        let ghost = egui::Rect::from_min_size(pos - drag.grab_offset, rect.size());
                        ui.painter().rect_stroke(
                            ghost,
                            4.0,
                            egui::Stroke::new(2.0, egui::Color32::LIGHT_BLUE),
                        );
                    }
                }

                if response.drag_stopped() {
                    let pos = ctx.input(|i| i.pointer.latest_pos());
                    if let (Some(drag), Some(pos)) = (self.drag.take(), pos) {
                        let corner = pos - drag.grab_offset - area.min;
                        let x = (corner.x / col_width).round().max(0.0) as u32;
                        let y = (corner.y / row_height).round().max(0.0) as u32;
                        dropped = Some((drag.key, x, y));
                    }
                }

                ui.painter().rect_stroke(
                    rect,
                    4.0,
                    ui.visuals().widgets.noninteractive.bg_stroke,
                );
                ui.painter().text(
                    header.left_center() + egui::vec2(8.0, 0.0),
                    egui::Align2::LEFT_CENTER,
                    panel.title,
                    egui::FontId::proportional(18.0),
                    egui::Color32::from_rgb(0, 128, 0),
                );

                let body = egui::Rect::from_min_max(
                    rect.min + egui::vec2(0.0, HEADER_HEIGHT),
                    rect.max,
                );
                let series = self.dashboard.panel_series(panel);
                ui.allocate_new_ui(egui::UiBuilder::new().max_rect(body), |ui| {
                    charts::panel_chart(ui, panel, &series);
                });
            }

            if let Some((key, x, y)) = dropped {
                self.dashboard.layout_mut().move_item(key, x, y);
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply transport events queued since the last frame
        self.dashboard.pump();

        // Keep the time axis sliding while the stream is live
        if self.dashboard.toolbar_state().state != ConnectionState::Disconnected {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // Render UI
        self.render_toolbar(ctx);
        self.render_grid(ctx);
    }
}
