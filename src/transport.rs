//! WebSocket transport
//!
//! Each connection runs on its own thread with a single-threaded tokio
//! runtime. The thread never touches dashboard state: it reports lifecycle
//! signals and binary payloads through the [`EventSink`] and waits for a
//! close request on a oneshot channel.

use crate::connection::{Connector, EventSink, TransportEvent, TransportHandle};
use crate::error::{Result, TelemetryError};
use futures_util::StreamExt;
use log::{debug, warn};
use std::thread;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use url::Url;

/// Build the `ws://` URL for a `host:port` address
///
/// An explicit `ws://` prefix is accepted. Other schemes, empty input and
/// addresses without a host are rejected.
pub fn websocket_url(address: &str) -> Result<Url> {
    let address = address.trim();
    let invalid = || TelemetryError::InvalidAddress(address.to_string());

    if address.is_empty() || address.contains(char::is_whitespace) {
        return Err(invalid());
    }

    let target = address.strip_prefix("ws://").unwrap_or(address);
    if target.contains("://") {
        return Err(invalid());
    }

    let url = Url::parse(&format!("ws://{}", target)).map_err(|_| invalid())?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(invalid()),
    }
}

/// Opens WebSocket connections on background threads
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WsConnector {
    type Handle = WsHandle;

    fn open(&mut self, address: &str, events: EventSink) -> Result<WsHandle> {
        let url = websocket_url(address)?;
        let (close_tx, close_rx) = oneshot::channel();

        // Detached: the thread ends on its own once the socket closes
        thread::Builder::new()
            .name(format!("ws-{}", url.authority()))
            .spawn(move || run_transport(url, events, close_rx))
            .map_err(|e| TelemetryError::Transport(format!("Failed to spawn transport thread: {}", e)))?;

        Ok(WsHandle {
            close_tx: Some(close_tx),
        })
    }
}

/// Handle to a WebSocket transport thread
///
/// Dropping the handle has the same effect as [`TransportHandle::close`].
pub struct WsHandle {
    close_tx: Option<oneshot::Sender<()>>,
}

impl TransportHandle for WsHandle {
    fn close(&mut self) {
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Transport thread entry point
fn run_transport(url: Url, events: EventSink, close_rx: oneshot::Receiver<()>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            events.send(TransportEvent::Error(format!("Failed to start runtime: {}", e)));
            return;
        }
    };

    runtime.block_on(stream_frames(url, events, close_rx));
}

/// Connect, then forward binary messages until the socket closes
async fn stream_frames(url: Url, events: EventSink, mut close_rx: oneshot::Receiver<()>) {
    debug!("Connecting to {}", url);

    // No timeout: a connect that never resolves leaves the caller in Connecting
    let mut ws = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(e) => {
            events.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    if !events.send(TransportEvent::Open) {
        let _ = ws.close(None).await;
        return;
    }

    let mut close_requested = false;
    loop {
        tokio::select! {
            // Err means the handle was dropped, which also asks for a close
            _ = &mut close_rx, if !close_requested => {
                close_requested = true;
                debug!("Sending close frame to {}", url);
                if let Err(e) = ws.close(None).await {
                    finish(&events, e);
                    return;
                }
            }
            item = ws.next() => match item {
                Some(Ok(Message::Binary(payload))) => {
                    if !events.send(TransportEvent::message(payload.to_vec())) && !close_requested {
                        close_requested = true;
                        let _ = ws.close(None).await;
                    }
                }
                Some(Ok(Message::Text(text))) => {
                    warn!("Ignoring {}-byte text message", text.len());
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("Close frame received: {:?}", frame);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    finish(&events, e);
                    return;
                }
                None => {
                    events.send(TransportEvent::Close);
                    return;
                }
            }
        }
    }
}

/// Report the end of a connection that stopped with a tungstenite error
fn finish(events: &EventSink, error: WsError) {
    match error {
        WsError::ConnectionClosed | WsError::AlreadyClosed => {
            events.send(TransportEvent::Close);
        }
        other => {
            events.send(TransportEvent::Error(other.to_string()));
        }
    }
}
