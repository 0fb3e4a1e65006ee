//! Rover Telemetry Simulator
//!
//! Serves synthetic IMU frames over WebSocket so the monitor and dashboard can
//! run without hardware. Every connected client gets its own stream.
//!
//! Usage:
//!   rover-sim --bind 127.0.0.1:8081 --rate 50
//!   rover-monitor --address 127.0.0.1:8081

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use rover_sensor_dashboard::{encode_frame, Axes, Sample};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug, Clone)]
#[command(name = "rover-sim")]
#[command(about = "Serve synthetic rover IMU frames over WebSocket", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8081")]
    bind: SocketAddr,

    /// Frames per second per client (1-1000)
    #[arg(short, long, default_value = "50")]
    rate: u32,

    /// Send a truncated frame every N frames (0 disables)
    #[arg(long, default_value = "0")]
    bad_every: u64,
}

/// Smooth, bounded motion for the given time since the stream started
fn synthetic_sample(t: f32) -> Sample {
    let gyroscope = Axes::new(
        30.0 * (2.0 * t).sin(),
        20.0 * (1.5 * t).cos(),
        10.0 * (0.5 * t).sin(),
    );
    // Closed-form integrals of the rates above
    let gyro_angle = Axes::new(
        15.0 * (1.0 - (2.0 * t).cos()),
        (40.0 / 3.0) * (1.5 * t).sin(),
        20.0 * (1.0 - (0.5 * t).cos()),
    );
    let accelerometer = Axes::new(0.1 * t.sin(), 0.1 * t.cos(), 1.0);
    let angle = Axes::new(
        0.9 * gyro_angle.x,
        0.9 * gyro_angle.y,
        0.9 * gyro_angle.z,
    );

    Sample {
        temperature: 24.0 + 0.5 * (0.1 * t).sin(),
        accelerometer,
        gyroscope,
        gyro_angle,
        angle,
        captured_at: chrono::Local::now(),
    }
}

async fn serve_client(stream: TcpStream, peer: SocketAddr, args: Args) {
    let mut ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("Handshake with {} failed: {}", peer, e);
            return;
        }
    };
    info!("Client {} connected", peer);

    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / args.rate as f64));
    let start = Instant::now();
    let mut sent = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sent += 1;
                let frame = encode_frame(&synthetic_sample(start.elapsed().as_secs_f32()));
                let payload = if args.bad_every > 0 && sent % args.bad_every == 0 {
                    frame[..frame.len() - 4].to_vec()
                } else {
                    frame.to_vec()
                };
                if let Err(e) = ws.send(Message::Binary(payload.into())).await {
                    info!("Client {} dropped: {}", peer, e);
                    break;
                }
            }
            msg = ws.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Client {} closed after {} frames", peer, sent);
                    break;
                }
                Some(Err(e)) => {
                    warn!("Client {} error: {}", peer, e);
                    break;
                }
                Some(Ok(_)) => {}
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut args = Args::parse();

    if !(1..=1000).contains(&args.rate) {
        warn!("Rate must be 1-1000 Hz, clamping {}", args.rate);
        args.rate = args.rate.clamp(1, 1000);
    }

    let listener = TcpListener::bind(args.bind).await?;
    info!(
        "Serving {} Hz IMU frames on ws://{}",
        args.rate,
        listener.local_addr()?
    );

    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(serve_client(stream, peer, args.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_sensor_dashboard::decode_frame;

    #[test]
    fn test_synthetic_sample_survives_wire() {
        let sample = synthetic_sample(1.25);
        let decoded = decode_frame(&encode_frame(&sample)).unwrap();
        assert_eq!(decoded.values(), sample.values());
    }

    #[test]
    fn test_synthetic_sample_at_rest() {
        let sample = synthetic_sample(0.0);
        assert_eq!(sample.gyro_angle, Axes::new(0.0, 0.0, 0.0));
        assert_eq!(sample.accelerometer.z, 1.0);
        assert!((sample.temperature - 24.0).abs() < 1e-6);
    }
}
