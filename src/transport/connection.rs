//! Transport traits and the WebSocket implementation.
//!
//! The pool talks to the feed through the [`Transport`] / [`Connection`]
//! pair so its routing and restore logic never touches sockets directly.
//! [`WsTransport`] is the production implementation backed by
//! `tokio-tungstenite`.
//!
//! # Event Loop
//!
//! Each open connection spawns a tokio task that handles:
//!
//! - Incoming text frames, forwarded to the shared [`TransportListener`]
//! - Outgoing payloads enqueued by [`Connection::send`]
//! - Transport failures, forwarded to the listener exactly once

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream type produced by [`connect_async`].
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Listener Trait
// ============================================================================

/// Callbacks invoked by a connection's event loop.
///
/// One listener instance is shared by every connection in a pool; messages
/// and failures carry the [`ConnectionId`] so the pool can resolve the
/// owning slot.
pub trait TransportListener: Send + Sync {
    /// Called for every inbound text payload.
    fn on_message(&self, connection_id: ConnectionId, payload: &str);

    /// Called once when the connection fails or closes unexpectedly.
    fn on_failure(&self, connection_id: ConnectionId, error: Error);
}

// ============================================================================
// Connection Trait
// ============================================================================

/// A single duplex channel to the feed.
///
/// `send` and `close` enqueue onto the connection's write channel and
/// return immediately; I/O happens in the connection's own task, which
/// preserves per-connection send order.
pub trait Connection: Send + Sync {
    /// Returns this connection's identity.
    fn id(&self) -> ConnectionId;

    /// Enqueues a payload for sending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has ended.
    fn send(&self, payload: String) -> Result<()>;

    /// Closes the connection with the given close code.
    fn close(&self, code: u16, reason: &str);
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Opens connections to the feed.
///
/// Abstracted so the pool can be driven by a fake transport in tests; the
/// production implementation is [`WsTransport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a connection to `url` with an `Authorization` header.
    ///
    /// The listener is installed before any I/O so no inbound message can
    /// be dropped between connect and subscribe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the connection cannot be
    /// established.
    async fn open(
        &self,
        url: &Url,
        auth_token: &str,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn Connection>>;
}

// ============================================================================
// WsTransport
// ============================================================================

/// Production transport backed by `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    async fn open(
        &self,
        url: &Url,
        auth_token: &str,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn Connection>> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| Error::connection(format!("invalid endpoint: {e}")))?;

        let auth_value = HeaderValue::from_str(auth_token)
            .map_err(|e| Error::connection(format!("invalid auth token: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, auth_value);

        let (ws_stream, _) = connect_async(request)
            .await
            .map_err(|e| Error::connection(format!("WebSocket connect failed: {e}")))?;

        let connection = WsConnection::spawn(ws_stream, listener);
        debug!(connection_id = %connection.id, url = %url, "WebSocket connection opened");

        Ok(Box::new(connection))
    }
}

// ============================================================================
// WsCommand
// ============================================================================

/// Internal commands for the event loop.
enum WsCommand {
    /// Send a text payload.
    Send(String),
    /// Close the connection with code and reason.
    Close(u16, String),
}

// ============================================================================
// WsConnection
// ============================================================================

/// One live WebSocket connection with its own event loop task.
struct WsConnection {
    /// Connection identity, fresh per open.
    id: ConnectionId,
    /// Channel into the event loop.
    command_tx: mpsc::UnboundedSender<WsCommand>,
}

impl WsConnection {
    /// Creates a connection from an established stream and spawns its
    /// event loop.
    fn spawn(ws_stream: WsStream, listener: Arc<dyn TransportListener>) -> Self {
        let id = ConnectionId::next();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::run_event_loop(id, ws_stream, command_rx, listener));

        Self { id, command_tx }
    }

    /// Event loop that handles WebSocket I/O.
    ///
    /// Terminates on local close, remote close, or transport error; the
    /// listener's failure callback fires for everything except local close.
    async fn run_event_loop(
        id: ConnectionId,
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<WsCommand>,
        listener: Arc<dyn TransportListener>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the feed
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            trace!(connection_id = %id, len = text.len(), "Frame received");
                            listener.on_message(id, text.as_str());
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(connection_id = %id, ?frame, "WebSocket closed by remote");
                            listener.on_failure(id, Error::transport("closed by remote"));
                            break;
                        }

                        Some(Err(e)) => {
                            warn!(connection_id = %id, error = %e, "WebSocket error");
                            listener.on_failure(id, Error::WebSocket(e));
                            break;
                        }

                        None => {
                            debug!(connection_id = %id, "WebSocket stream ended");
                            listener.on_failure(id, Error::transport("stream ended"));
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Outgoing payloads and close requests
                command = command_rx.recv() => {
                    match command {
                        Some(WsCommand::Send(payload)) => {
                            if let Err(e) = ws_write.send(Message::Text(payload.into())).await {
                                warn!(connection_id = %id, error = %e, "Send failed");
                                listener.on_failure(id, Error::WebSocket(e));
                                break;
                            }
                        }

                        Some(WsCommand::Close(code, reason)) => {
                            debug!(connection_id = %id, code, "Closing connection");
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: reason.into(),
                            };
                            let _ = ws_write.send(Message::Close(Some(frame))).await;
                            break;
                        }

                        None => {
                            debug!(connection_id = %id, "Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        debug!(connection_id = %id, "Event loop terminated");
    }
}

impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, payload: String) -> Result<()> {
        self.command_tx
            .send(WsCommand::Send(payload))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&self, code: u16, reason: &str) {
        let _ = self
            .command_tx
            .send(WsCommand::Close(code, reason.to_string()));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopListener;

    impl TransportListener for NoopListener {
        fn on_message(&self, _connection_id: ConnectionId, _payload: &str) {}
        fn on_failure(&self, _connection_id: ConnectionId, _error: Error) {}
    }

    #[tokio::test]
    async fn test_open_refused() {
        // Nothing listens on this port; connect must fail with a
        // connection error, not a panic.
        let url = Url::parse("ws://127.0.0.1:9").expect("url");
        let result = WsTransport
            .open(&url, "Bearer token", Arc::new(NoopListener))
            .await;

        match result {
            Ok(_) => panic!("expected connection error, got a connection"),
            Err(Error::Connection { .. }) => {}
            Err(other) => panic!("expected connection error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_open_invalid_auth_token() {
        let url = Url::parse("ws://127.0.0.1:9").expect("url");
        let result = WsTransport
            .open(&url, "bad\ntoken", Arc::new(NoopListener))
            .await;

        assert!(matches!(result, Err(Error::Connection { .. })));
    }
}
