//! Rover Sensor Dashboard
//!
//! Live charts of the rover's IMU stream in a draggable grid, with a toolbar
//! for the target address and connect/disconnect.

mod app;
mod charts;
mod toolbar;

use app::DashboardApp;
use clap::Parser;
use rover_sensor_dashboard::TargetArgs;

#[derive(Parser, Debug)]
#[command(name = "rover-dashboard")]
#[command(about = "Chart live rover IMU telemetry", long_about = None)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rover Sensor Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, args.target.address)))),
    )
}
