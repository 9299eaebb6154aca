//! Server-sent events binding of the event channel.
//!
//! Server events arrive on `GET {server}/events?clientId=...`, the SSE
//! `event` field naming the event and `data` carrying its JSON payload. Emits
//! are posted to `{server}/emit` as `{"clientId", "event", "data"}`; the
//! client id ties them to the stream, so a join scopes that very stream.
//! Reconnects are handled by `reqwest-eventsource` with its default retry
//! policy and keep the id.

use chrono::Utc;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde_json::{Value, json};
use url::Url;

use super::{EventTransport, TransportError, TransportEvent};
use crate::endpoint::endpoint;

pub struct SseTransport {
    client: reqwest::Client,
    client_id: String,
    emit_url: Url,
    source: Option<EventSource>,
}

impl SseTransport {
    /// Prepares the event stream for `server_url`. The connection itself is
    /// opened lazily on the first [`EventTransport::next_event`] call.
    pub fn connect(client: reqwest::Client, server_url: &str) -> Result<Self, TransportError> {
        let base = Url::parse(server_url)?;
        let client_id = crate::store::generate_id(Utc::now());
        let events_url = events_url(&base, &client_id)?;
        let emit_url = endpoint(&base, "emit")?;
        log::info!("Opening notification event stream at {events_url}");

        let source = EventSource::new(client.get(events_url))?;
        Ok(Self {
            client,
            client_id,
            emit_url,
            source: Some(source),
        })
    }

    /// Identifier of this connection, sent with the stream request and with
    /// every emit.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn emit_body(&self, event: &str, payload: Option<Value>) -> Value {
        json!({ "clientId": self.client_id, "event": event, "data": payload })
    }
}

fn events_url(base: &Url, client_id: &str) -> Result<Url, url::ParseError> {
    let mut url = endpoint(base, "events")?;
    url.query_pairs_mut().append_pair("clientId", client_id);
    Ok(url)
}

/// Decodes an SSE data field; anything that is not JSON is passed on as a
/// plain string.
fn parse_payload(data: &str) -> Value {
    if data.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}

impl EventTransport for SseTransport {
    async fn next_event(&mut self) -> Option<TransportEvent> {
        let event = self.source.as_mut()?.next().await?;
        Some(match event {
            Ok(Event::Open) => TransportEvent::Connected,
            Ok(Event::Message(message)) => TransportEvent::Message {
                payload: parse_payload(&message.data),
                name: message.event,
            },
            Err(error) => TransportEvent::Disconnected(error.to_string()),
        })
    }

    async fn emit(&mut self, event: &str, payload: Option<Value>) -> Result<(), TransportError> {
        if self.source.is_none() {
            return Err(TransportError::Closed);
        }

        self.client
            .post(self.emit_url.clone())
            .json(&self.emit_body(event, payload))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.close();
        }
    }
}
