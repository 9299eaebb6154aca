use std::time::Duration;

use crossterm::event::{self, Event};
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Source of terminal events so the shell can be driven without a real tty.
pub(crate) trait EventSource: Send + 'static {
    fn next(&mut self, timeout: Duration) -> anyhow::Result<Option<Event>>;
}

pub(crate) struct CrosstermEventSource;

impl EventSource for CrosstermEventSource {
    fn next(&mut self, timeout: Duration) -> anyhow::Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Reads `source` on its own thread and forwards what it yields. The thread
/// stops after the first error or once the receiver is gone.
pub(crate) fn spawn_events<S: EventSource>(mut source: S) -> mpsc::Receiver<anyhow::Result<Event>> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        loop {
            match source.next(POLL_INTERVAL) {
                Ok(Some(event)) => {
                    if tx.blocking_send(Ok(event)).is_err() {
                        break;
                    }
                }
                Ok(None) if tx.is_closed() => break,
                Ok(None) => {}
                Err(error) => {
                    let _ = tx.blocking_send(Err(error));
                    break;
                }
            }
        }
        log::debug!("Terminal input thread stopped");
    });
    rx
}
