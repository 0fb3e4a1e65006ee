//! Line chart for one dashboard panel

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use rover_sensor_dashboard::{ChartSeries, PanelSpec, Rgb, RETENTION_SECS};

pub fn color32(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Plot every series of a panel against seconds before the newest sample
pub fn panel_chart(ui: &mut egui::Ui, panel: &PanelSpec, series: &[ChartSeries]) {
    let plot = Plot::new(panel.key)
        .height(ui.available_height())
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .include_x(-(RETENTION_SECS as f64))
        .include_x(0.0)
        .show_x(false)
        .legend(Legend::default());

    plot.show(ui, |plot_ui| {
        for line in series {
            let points = PlotPoints::from(line.points.clone());
            plot_ui.line(
                Line::new(points)
                    .name(line.name)
                    .color(color32(line.color))
                    .width(1.5),
            );
        }
    });
}
