//! WebSocket transport to the collector.
//!
//! One persistent outbound connection, owned exclusively by
//! [`CollectorClient`]; each snapshot goes out as one complete UTF-8 JSON
//! text frame. A failed write drops the connection so the next send
//! reports [`TransportError::NotConnected`] and the scheduler can drive
//! the reconnect.

use futures_util::SinkExt;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::snapshot::Snapshot;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Borrowed counterpart of [`crate::snapshot::Envelope`], so encoding a
/// snapshot for the wire needs no clone.
#[derive(Serialize)]
struct EnvelopeRef<'a> {
    #[serde(rename = "host_report")]
    report: &'a Snapshot,
}

/// Client side of the persistent collector connection.
pub struct CollectorClient {
    url: String,
    stream: Option<WsStream>,
}

impl CollectorClient {
    /// Create a client for the given `ws://` or `wss://` URL. No
    /// connection is established until [`connect`](Self::connect).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
        }
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Establish (or re-establish) the connection.
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        match connect_async(self.url.as_str()).await {
            Ok((stream, _response)) => {
                info!(url = %self.url, "connected to collector");
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "failed to connect to collector");
                self.stream = None;
                Err(TransportError::NotConnected)
            }
        }
    }

    /// Encode a snapshot into the envelope and write it as one text frame.
    pub async fn send(&mut self, snapshot: &Snapshot) -> Result<(), TransportError> {
        let json = serde_json::to_string(&EnvelopeRef { report: snapshot })?;
        let frame_len = json.len();

        let Some(stream) = self.stream.as_mut() else {
            return Err(TransportError::NotConnected);
        };

        match stream.send(Message::Text(json)).await {
            Ok(()) => {
                debug!(bytes = frame_len, "snapshot frame sent");
                Ok(())
            }
            Err(e) => {
                // Connection is unusable; force a reconnect on next cycle.
                self.stream = None;
                Err(TransportError::WriteFailed(e.to_string()))
            }
        }
    }

    /// Close the connection, if any.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                debug!(error = %e, "error closing collector connection");
            }
        }
    }
}
