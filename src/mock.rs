//! In-memory connector for exercising the state machine without a network

use crate::connection::{Connector, EventSink, TransportHandle};
use crate::error::{Result, TelemetryError};
use std::cell::Cell;
use std::rc::Rc;

/// Records every open request and hands the event sink back to the test
#[derive(Default)]
pub struct MockConnector {
    sinks: Vec<EventSink>,
    addresses: Vec<String>,
    closes: Rc<Cell<usize>>,
    fail_open: bool,
}

impl MockConnector {
    /// Connector whose `open` always rejects the address
    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Sink of the most recently opened connection
    pub fn last_sink(&self) -> EventSink {
        self.sinks.last().cloned().expect("no connection opened")
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses.clone()
    }

    pub fn open_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.get()
    }
}

pub struct MockHandle {
    closes: Rc<Cell<usize>>,
}

impl TransportHandle for MockHandle {
    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

impl Connector for MockConnector {
    type Handle = MockHandle;

    fn open(&mut self, address: &str, events: EventSink) -> Result<MockHandle> {
        if self.fail_open {
            return Err(TelemetryError::InvalidAddress(address.to_string()));
        }
        self.sinks.push(events);
        self.addresses.push(address.to_string());
        Ok(MockHandle {
            closes: self.closes.clone(),
        })
    }
}
