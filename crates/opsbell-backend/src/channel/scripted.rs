//! Scripted [`EventTransport`] for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{EventTransport, TransportError, TransportEvent};

pub(crate) type Emitted = Arc<Mutex<Vec<(String, Option<Value>)>>>;

/// Replays a fixed list of events. With `hold_open` the transport then
/// stays connected until closed, otherwise it ends.
pub(crate) struct ScriptedTransport {
    events: VecDeque<TransportEvent>,
    hold_open: bool,
    pub emitted: Emitted,
    pub closes: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(events: Vec<TransportEvent>, hold_open: bool) -> Self {
        Self {
            events: events.into(),
            hold_open,
            emitted: Emitted::default(),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn close_count(closes: &AtomicUsize) -> usize {
        closes.load(Ordering::SeqCst)
    }
}

impl EventTransport for ScriptedTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        match self.events.pop_front() {
            Some(event) => Some(event),
            None if self.hold_open => std::future::pending().await,
            None => None,
        }
    }

    async fn emit(&mut self, event: &str, payload: Option<Value>) -> Result<(), TransportError> {
        self.emitted.lock().unwrap().push((event.to_string(), payload));
        Ok(())
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
