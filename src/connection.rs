//! Connection lifecycle state machine
//!
//! The state machine owns the single transport handle and is the only place
//! connection state changes. Transport lifecycle signals arrive as
//! [`TransportEvent`]s over a channel and are applied one at a time by
//! [`Connection::handle_event`] on the thread that owns the `Connection`.
//!
//! ```text
//!   Disconnected --request_connect--> Connecting --Open--> Open
//!        ^                               |                  |
//!        |                         Close / Error     request_disconnect
//!        |                               |                  v
//!        +-------------------------------+------Close---- Closing
//! ```
//!
//! An `Error` from any state lands in `Disconnected`. There is no connect
//! timeout: a transport that never signals leaves the machine in
//! `Connecting`.

use crate::error::{Result, TelemetryError};
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Connection lifecycle state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Open,
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Identifies one transport handle for the lifetime of the `Connection`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// Binary message as received by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    /// Wall clock at arrival, not at the time the queue is drained
    pub received_at: DateTime<Local>,
}

impl Payload {
    /// Stamp `bytes` with the current wall clock
    pub fn new(bytes: Vec<u8>) -> Self {
        Self::at(bytes, Local::now())
    }

    pub fn at(bytes: Vec<u8>, received_at: DateTime<Local>) -> Self {
        Self { bytes, received_at }
    }
}

/// Lifecycle signal or payload from the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Open,
    Close,
    Error(String),
    Message(Payload),
}

impl TransportEvent {
    /// `Message` stamped with the current wall clock
    pub fn message(bytes: Vec<u8>) -> Self {
        TransportEvent::Message(Payload::new(bytes))
    }
}

/// Callback run after every event is queued, e.g. to schedule a repaint
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Sending half handed to a transport when it is opened
#[derive(Clone)]
pub struct EventSink {
    id: ConnectionId,
    tx: Sender<(ConnectionId, TransportEvent)>,
    waker: Option<Waker>,
}

impl EventSink {
    /// Queue an event for the state machine
    ///
    /// Returns `false` once the owning `Connection` is gone, which is the
    /// transport's cue to stop.
    pub fn send(&self, event: TransportEvent) -> bool {
        let delivered = self.tx.send((self.id, event)).is_ok();
        if let Some(waker) = &self.waker {
            waker();
        }
        delivered
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").field("id", &self.id).finish()
    }
}

/// Live transport connection
pub trait TransportHandle {
    /// Ask the transport to close; completion is reported as `Close`
    fn close(&mut self);
}

/// Opens transport connections
pub trait Connector {
    type Handle: TransportHandle;

    /// Start connecting to `address`
    ///
    /// Must not block on the network. The outcome is reported through
    /// `events`. An `Err` means no connection attempt was started.
    fn open(&mut self, address: &str, events: EventSink) -> Result<Self::Handle>;
}

/// Connection state machine
pub struct Connection<C: Connector> {
    connector: C,
    state: ConnectionState,
    handle: Option<(ConnectionId, C::Handle)>,
    next_id: u64,
    tx: Sender<(ConnectionId, TransportEvent)>,
    rx: Receiver<(ConnectionId, TransportEvent)>,
    waker: Option<Waker>,
}

impl<C: Connector> Connection<C> {
    pub fn new(connector: C) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            connector,
            state: ConnectionState::Disconnected,
            handle: None,
            next_id: 0,
            tx,
            rx,
            waker: None,
        }
    }

    /// Install a callback run whenever a transport queues an event
    ///
    /// Applies to connections opened after the call.
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn is_connecting(&self) -> bool {
        self.state == ConnectionState::Connecting
    }

    /// Whether a transport handle is currently held
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open a connection to `address`; only valid while disconnected
    pub fn request_connect(&mut self, address: &str) -> Result<()> {
        if self.state != ConnectionState::Disconnected {
            let err = TelemetryError::InvalidTransition {
                operation: "connect",
                state: self.state,
            };
            error!("{}", err);
            return Err(err);
        }

        let id = ConnectionId(self.next_id);
        self.next_id += 1;
        let sink = EventSink {
            id,
            tx: self.tx.clone(),
            waker: self.waker.clone(),
        };

        match self.connector.open(address, sink) {
            Ok(handle) => {
                info!("Connecting to {}", address);
                self.handle = Some((id, handle));
                self.state = ConnectionState::Connecting;
                Ok(())
            }
            Err(e) => {
                error!("Failed to start connection to {}: {}", address, e);
                Err(e)
            }
        }
    }

    /// Ask the open connection to close; only valid while open
    pub fn request_disconnect(&mut self) -> Result<()> {
        if self.state != ConnectionState::Open {
            let err = TelemetryError::InvalidTransition {
                operation: "disconnect",
                state: self.state,
            };
            error!("{}", err);
            return Err(err);
        }

        self.state = ConnectionState::Closing;
        if let Some((_, handle)) = self.handle.as_mut() {
            handle.close();
        }
        info!("Closing connection");
        Ok(())
    }

    /// Disconnect when open, otherwise try to connect
    ///
    /// From `Connecting` or `Closing` this is a connect request and is
    /// rejected like any other.
    pub fn toggle_connect_disconnect(&mut self, address: &str) -> Result<()> {
        if self.state == ConnectionState::Open {
            self.request_disconnect()
        } else {
            self.request_connect(address)
        }
    }

    /// Next queued transport event, if any
    pub fn try_next_event(&self) -> Option<(ConnectionId, TransportEvent)> {
        self.rx.try_recv().ok()
    }

    /// Apply one transport event
    ///
    /// Returns the payload of a `Message` received while open. Events from a
    /// handle other than the current one are dropped.
    pub fn handle_event(&mut self, id: ConnectionId, event: TransportEvent) -> Option<Payload> {
        let current = matches!(&self.handle, Some((current, _)) if *current == id);
        if !current {
            debug!("Ignoring {:?} from stale connection {:?}", event, id);
            return None;
        }

        match event {
            TransportEvent::Open => {
                if self.state == ConnectionState::Connecting {
                    info!("WebSocket open");
                    self.state = ConnectionState::Open;
                } else {
                    warn!("Unexpected open signal while {}", self.state);
                }
                None
            }
            TransportEvent::Close => {
                info!("WebSocket close");
                self.release();
                None
            }
            TransportEvent::Error(message) => {
                error!("WebSocket error: {}", message);
                self.release();
                None
            }
            TransportEvent::Message(payload) => {
                if self.state == ConnectionState::Open {
                    Some(payload)
                } else {
                    debug!(
                        "Ignoring {}-byte message while {}",
                        payload.bytes.len(),
                        self.state
                    );
                    None
                }
            }
        }
    }

    fn release(&mut self) {
        self.handle = None;
        self.state = ConnectionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConnector;

    fn drain(conn: &mut Connection<MockConnector>) -> Vec<Vec<u8>> {
        let mut payloads = Vec::new();
        while let Some((id, event)) = conn.try_next_event() {
            if let Some(payload) = conn.handle_event(id, event) {
                payloads.push(payload.bytes);
            }
        }
        payloads
    }

    fn open_connection() -> Connection<MockConnector> {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("rover.local:81").unwrap();
        conn.connector().last_sink().send(TransportEvent::Open);
        drain(&mut conn);
        assert_eq!(conn.state(), ConnectionState::Open);
        conn
    }

    #[test]
    fn test_initial_state() {
        let conn = Connection::new(MockConnector::default());
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.is_connected());
        assert!(!conn.is_connecting());
        assert!(!conn.has_handle());
    }

    #[test]
    fn test_connect_then_open() {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("10.0.0.2:81").unwrap();

        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert!(conn.is_connecting());
        assert!(conn.has_handle());
        assert_eq!(conn.connector().addresses(), vec!["10.0.0.2:81".to_string()]);

        conn.connector().last_sink().send(TransportEvent::Open);
        drain(&mut conn);
        assert!(conn.is_connected());
        assert!(!conn.is_connecting());
    }

    #[test]
    fn test_connect_rejected_while_open_or_closing() {
        let mut conn = open_connection();
        let err = conn.request_connect("other:81").unwrap_err();
        assert_eq!(
            err,
            TelemetryError::InvalidTransition {
                operation: "connect",
                state: ConnectionState::Open
            }
        );
        assert_eq!(conn.state(), ConnectionState::Open);
        assert_eq!(conn.connector().open_count(), 1);

        conn.request_disconnect().unwrap();
        assert!(conn.request_connect("other:81").is_err());
        assert_eq!(conn.state(), ConnectionState::Closing);
        assert_eq!(conn.connector().open_count(), 1);
    }

    #[test]
    fn test_connect_rejected_while_connecting() {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("a:1").unwrap();
        assert!(conn.request_connect("a:1").is_err());
        assert_eq!(conn.connector().open_count(), 1);
        assert_eq!(conn.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_toggle_while_open_closes() {
        let mut conn = open_connection();
        conn.toggle_connect_disconnect("rover.local:81").unwrap();
        assert_eq!(conn.state(), ConnectionState::Closing);
        assert_eq!(conn.connector().close_count(), 1);

        conn.connector().last_sink().send(TransportEvent::Close);
        drain(&mut conn);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.has_handle());
    }

    #[test]
    fn test_toggle_while_connecting_is_rejected() {
        let mut conn = Connection::new(MockConnector::default());
        conn.toggle_connect_disconnect("a:1").unwrap();
        assert!(conn.toggle_connect_disconnect("a:1").is_err());
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert_eq!(conn.connector().open_count(), 1);
    }

    #[test]
    fn test_error_while_connecting_releases_handle() {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("a:1").unwrap();
        conn.connector()
            .last_sink()
            .send(TransportEvent::Error("connection refused".into()));
        drain(&mut conn);

        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.has_handle());

        // A fresh user request is needed to try again
        conn.request_connect("a:1").unwrap();
        assert_eq!(conn.connector().open_count(), 2);
    }

    #[test]
    fn test_error_from_any_state() {
        let mut conn = open_connection();
        conn.connector().last_sink().send(TransportEvent::Error("reset".into()));
        drain(&mut conn);
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        let mut conn = open_connection();
        conn.request_disconnect().unwrap();
        conn.connector().last_sink().send(TransportEvent::Error("reset".into()));
        drain(&mut conn);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.has_handle());
    }

    #[test]
    fn test_close_while_connecting() {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("a:1").unwrap();
        conn.connector().last_sink().send(TransportEvent::Close);
        drain(&mut conn);
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_disconnect_only_from_open() {
        let mut conn = Connection::new(MockConnector::default());
        assert!(conn.request_disconnect().is_err());

        conn.request_connect("a:1").unwrap();
        assert!(conn.request_disconnect().is_err());
        assert_eq!(conn.state(), ConnectionState::Connecting);
        assert_eq!(conn.connector().close_count(), 0);
    }

    #[test]
    fn test_messages_only_delivered_while_open() {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("a:1").unwrap();
        let sink = conn.connector().last_sink();

        sink.send(TransportEvent::message(vec![1, 2, 3]));
        assert!(drain(&mut conn).is_empty());

        sink.send(TransportEvent::Open);
        sink.send(TransportEvent::message(vec![4, 5]));
        assert_eq!(drain(&mut conn), vec![vec![4, 5]]);

        conn.request_disconnect().unwrap();
        sink.send(TransportEvent::message(vec![6]));
        assert!(drain(&mut conn).is_empty());
    }

    #[test]
    fn test_message_keeps_transport_timestamp() {
        let mut conn = open_connection();
        let at = Local::now() - chrono::TimeDelta::seconds(3);
        conn.connector()
            .last_sink()
            .send(TransportEvent::Message(Payload::at(vec![7, 8], at)));

        let (id, event) = conn.try_next_event().unwrap();
        let payload = conn.handle_event(id, event).unwrap();
        assert_eq!(payload.bytes, vec![7, 8]);
        assert_eq!(payload.received_at, at);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut conn = Connection::new(MockConnector::default());
        conn.request_connect("a:1").unwrap();
        let old = conn.connector().last_sink();
        old.send(TransportEvent::Error("refused".into()));
        drain(&mut conn);

        conn.request_connect("a:1").unwrap();
        conn.connector().last_sink().send(TransportEvent::Open);
        drain(&mut conn);

        // Late close from the first attempt must not tear down the second
        old.send(TransportEvent::Close);
        drain(&mut conn);
        assert_eq!(conn.state(), ConnectionState::Open);
    }

    #[test]
    fn test_failed_open_stays_disconnected() {
        let mut conn = Connection::new(MockConnector::failing());
        let err = conn.request_connect("").unwrap_err();
        assert_eq!(err, TelemetryError::InvalidAddress(String::new()));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.has_handle());
    }

    #[test]
    fn test_waker_runs_on_event() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let mut conn = Connection::new(MockConnector::default());
        conn.set_waker(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        conn.request_connect("a:1").unwrap();
        conn.connector().last_sink().send(TransportEvent::Open);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }
}
