//! Live IMU telemetry from a rover over WebSocket
//!
//! The rover streams one 52-byte binary frame per reading (temperature,
//! accelerometer, gyroscope, gyro angle and fused angle as little-endian
//! `f32`). This library decodes those frames, keeps the last 10 seconds of
//! samples and drives the connect/disconnect lifecycle; the binaries draw it.
//!
//! # Quick Start
//!
//! ## Decoding a Frame
//! ```
//! use rover_sensor_dashboard::{decode_frame, FRAME_LEN};
//!
//! let frame = [0u8; FRAME_LEN];
//! let sample = decode_frame(&frame)?;
//! println!("Temperature: {:.1}°C", sample.temperature);
//! # Ok::<(), rover_sensor_dashboard::TelemetryError>(())
//! ```
//!
//! ## Streaming from a Rover
//! ```no_run
//! use rover_sensor_dashboard::{Dashboard, WsConnector, PANELS};
//!
//! let mut dashboard = Dashboard::new(WsConnector::new());
//! dashboard.on_connect_disconnect("192.168.4.1:81")?;
//!
//! loop {
//!     if dashboard.pump() {
//!         for series in dashboard.panel_series(&PANELS[0]) {
//!             println!("{}: {} points", series.name, series.points.len());
//!         }
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! # Ok::<(), rover_sensor_dashboard::TelemetryError>(())
//! ```

pub mod common;
pub mod config;
pub mod connection;
pub mod dashboard;
pub mod error;
pub mod frame;
pub mod layout;
pub mod transport;
pub mod window;

#[cfg(test)]
mod mock;

// Re-export public API
pub use common::{BarGauge, RateMeter};
pub use config::{TargetArgs, DEFAULT_ADDRESS};
pub use connection::{
    Connection, ConnectionId, ConnectionState, Connector, EventSink, Payload, TransportEvent,
    TransportHandle, Waker,
};
pub use dashboard::{ChartSeries, Dashboard, FrameStats, ToolbarState};
pub use error::{Result, TelemetryError};
pub use frame::{decode_frame, decode_frame_at, encode_frame, Axes, Sample, SampleField, FRAME_LEN};
pub use layout::{line_color, GridCell, GridLayout, PanelSpec, Rgb, GRID_COLUMNS, PALETTE, PANELS};
pub use transport::{websocket_url, WsConnector, WsHandle};
pub use window::{Projection, SampleWindow, RETENTION_SECS};
