//! Dashboard model: sample window, connection and panel layout
//!
//! UI-free glue between the transport and whatever draws the charts. The UI
//! calls [`Dashboard::pump`] once per frame; it applies queued transport
//! events in arrival order and reports whether a redraw is needed.

use crate::connection::{Connection, ConnectionState, Connector, Payload, Waker};
use crate::error::Result;
use crate::frame::decode_frame_at;
use crate::layout::{line_color, GridLayout, PanelSpec, Rgb};
use crate::window::SampleWindow;
use log::{debug, warn};

/// What the toolbar needs to choose between connect and disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarState {
    pub is_connected: bool,
    pub is_connecting: bool,
    pub state: ConnectionState,
}

/// Frame counters since startup
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// One chart line
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: &'static str,
    pub color: Rgb,
    /// `[seconds relative to newest sample, value]`, oldest first
    pub points: Vec<[f64; 2]>,
}

pub struct Dashboard<C: Connector> {
    connection: Connection<C>,
    window: SampleWindow,
    layout: GridLayout,
    stats: FrameStats,
}

impl<C: Connector> Dashboard<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connection: Connection::new(connector),
            window: SampleWindow::new(),
            layout: GridLayout::default(),
            stats: FrameStats::default(),
        }
    }

    /// Callback run whenever the transport queues an event
    pub fn set_waker(&mut self, waker: Waker) {
        self.connection.set_waker(waker);
    }

    /// Apply every queued transport event
    ///
    /// Returns `true` if the window or the connection state changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Some((id, event)) = self.connection.try_next_event() {
            let before = self.connection.state();
            if let Some(payload) = self.connection.handle_event(id, event) {
                changed |= self.ingest(&payload);
            }
            changed |= self.connection.state() != before;
        }
        changed
    }

    /// Decode one payload into the window, stamped with its arrival time
    ///
    /// Malformed frames are logged and dropped without touching the window.
    fn ingest(&mut self, payload: &Payload) -> bool {
        match decode_frame_at(&payload.bytes, payload.received_at) {
            Ok(sample) => {
                debug!("{:?}", sample);
                self.window.append(sample);
                self.stats.accepted += 1;
                true
            }
            Err(e) => {
                warn!("Dropping frame: {}", e);
                self.stats.rejected += 1;
                false
            }
        }
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        ToolbarState {
            is_connected: self.connection.is_connected(),
            is_connecting: self.connection.is_connecting(),
            state: self.connection.state(),
        }
    }

    /// Toolbar button handler
    pub fn on_connect_disconnect(&mut self, address: &str) -> Result<()> {
        self.connection.toggle_connect_disconnect(address)
    }

    /// Chart lines for a panel, one per field, palette colors in field order
    pub fn panel_series(&self, panel: &PanelSpec) -> Vec<ChartSeries> {
        let projection = self.window.projection(panel.fields);
        let newest = self.window.latest().map(|s| s.captured_at);

        panel
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| ChartSeries {
                name: field.name(),
                color: line_color(i),
                points: projection
                    .series(i)
                    .map(|(at, v)| {
                        let age = newest
                            .map(|n| (at - n).num_milliseconds() as f64 / 1000.0)
                            .unwrap_or(0.0);
                        [age, v as f64]
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn connection(&self) -> &Connection<C> {
        &self.connection
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut GridLayout {
        &mut self.layout
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}
