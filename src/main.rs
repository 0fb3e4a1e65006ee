//! Rover telemetry monitor - live console view of the IMU stream
//!
//! Connects to the rover's WebSocket, decodes frames into the 10 second sample
//! window and redraws the latest values as bar graphs.
//!
//! Usage:
//!   rover-monitor --address 192.168.4.1:81

use clap::Parser;
use rover_sensor_dashboard::{
    Axes, BarGauge, ConnectionState, Dashboard, RateMeter, TargetArgs, WsConnector,
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "rover-monitor")]
#[command(about = "Show live rover IMU telemetry in the console", long_about = None)]
struct Args {
    #[command(flatten)]
    target: TargetArgs,

    /// Redraw interval in milliseconds
    #[arg(short, long, default_value = "50")]
    refresh_ms: u64,
}

fn print_axes(label: &str, unit: &str, axes: Axes, gauge: &BarGauge) {
    println!("{}", label);
    println!("  X: {:8.2}{:<4} [{}]", axes.x, unit, gauge.render(axes.x));
    println!("  Y: {:8.2}{:<4} [{}]", axes.y, unit, gauge.render(axes.y));
    println!("  Z: {:8.2}{:<4} [{}]", axes.z, unit, gauge.render(axes.z));
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    println!("Rover Telemetry Monitor");
    println!("=======================");
    println!("Connecting to {}...", args.target.address);

    let mut dashboard = Dashboard::new(WsConnector::new());
    dashboard.on_connect_disconnect(&args.target.address)?;

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let accel_gauge = BarGauge::new(2.0, 40);
    let gyro_gauge = BarGauge::new(250.0, 40);
    let angle_gauge = BarGauge::new(180.0, 40);
    let temp_gauge = BarGauge::new(50.0, 40);
    let mut rate = RateMeter::new();
    let mut last_accepted = 0u64;
    let refresh = Duration::from_millis(args.refresh_ms.max(1));

    // Clear screen once at start
    print!("\x1B[2J\x1B[H");
    io::stdout().flush()?;

    while running.load(Ordering::SeqCst) {
        dashboard.pump();

        let stats = dashboard.stats();
        rate.add(stats.accepted - last_accepted);
        last_accepted = stats.accepted;

        let state = dashboard.toolbar_state().state;
        if state == ConnectionState::Disconnected {
            // No automatic retry; a fresh run is a fresh connect
            println!("\nConnection to {} closed.", args.target.address);
            return Ok(());
        }

        // Move cursor to top without clearing (reduces flicker)
        print!("\x1B[H");
        println!("Rover Telemetry - {:<12}                                      ", state.to_string());
        println!("=====================================                            ");
        println!(
            "Time: {:.1}s | Frames: {} ok, {} dropped | Rate: {:.1} Hz | Window: {} samples   ",
            rate.elapsed_secs(),
            stats.accepted,
            stats.rejected,
            rate.rate_hz(),
            dashboard.window().len()
        );
        println!();

        match dashboard.window().latest() {
            Some(sample) => {
                println!(
                    "TEMPERATURE {:8.2}°C  [{}]",
                    sample.temperature,
                    temp_gauge.render(sample.temperature)
                );
                println!();
                print_axes("ACCELEROMETER (g)", "g", sample.accelerometer, &accel_gauge);
                print_axes("GYROSCOPE (°/s)", "°/s", sample.gyroscope, &gyro_gauge);
                print_axes("GYRO ANGLE (°)", "°", sample.gyro_angle, &angle_gauge);
                print_axes("ANGLE (°)", "°", sample.angle, &angle_gauge);
            }
            None => println!("Waiting for data...                                   "),
        }

        println!("Press Ctrl+C to exit                                           ");
        io::stdout().flush()?;

        thread::sleep(refresh);
    }

    println!("\nReceived Ctrl+C, closing connection...");
    if dashboard.toolbar_state().is_connected {
        dashboard.on_connect_disconnect(&args.target.address)?;
        let deadline = Instant::now() + Duration::from_secs(2);
        while dashboard.toolbar_state().state != ConnectionState::Disconnected
            && Instant::now() < deadline
        {
            dashboard.pump();
            thread::sleep(Duration::from_millis(20));
        }
    }

    Ok(())
}
