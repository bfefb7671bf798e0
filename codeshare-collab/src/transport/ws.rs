//! WebSocket channel to the coordinating server.
//!
//! Provides:
//! - Explicit connection lifecycle (`connect` / `close`)
//! - A writer task draining the outbound queue in emission order
//! - A reader task decoding text frames and handing them to the listener
//!
//! There is no reconnect: after the socket drops, emissions fail with
//! `NotConnected` and the listener observes end of stream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::{lock, InboundSlot, Subscription, Transport, TransportError};
use crate::protocol::{ClientEvent, ServerEvent};

/// How long `close` waits for queued frames to flush.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Channel connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Items on the outbound queue. `Close` rides behind queued events so
/// they are flushed before the close frame.
enum Outbound {
    Frame(String),
    Close,
}

pub struct WsChannel {
    url: String,
    state: Arc<RwLock<ConnectionState>>,
    outgoing: Mutex<Option<mpsc::UnboundedSender<Outbound>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
    inbound: InboundSlot,
}

impl WsChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            outgoing: Mutex::new(None),
            writer: Mutex::new(None),
            inbound: InboundSlot::default(),
        }
    }

    /// Open the socket and spawn the writer and reader tasks.
    pub async fn connect(&self) -> Result<(), TransportError> {
        *self.state.write().await = ConnectionState::Connecting;

        let ws_stream = match tokio_tungstenite::connect_async(self.url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                *self.state.write().await = ConnectionState::Disconnected;
                return Err(TransportError::Connect(e));
            }
        };
        let (mut ws_writer, mut ws_reader) = ws_stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();
        let writer = tokio::spawn(async move {
            while let Some(item) = out_rx.recv().await {
                let message = match item {
                    Outbound::Frame(text) => Message::Text(text.into()),
                    Outbound::Close => {
                        let _ = ws_writer.send(Message::Close(None)).await;
                        break;
                    }
                };
                if let Err(e) = ws_writer.send(message).await {
                    log::warn!("Outbound frame lost: {e}");
                    break;
                }
            }
        });

        *lock(&self.outgoing) = Some(out_tx);
        *lock(&self.writer) = Some(writer);
        *self.state.write().await = ConnectionState::Connected;
        log::info!("Connected to {}", self.url);

        let state = self.state.clone();
        let inbound = self.inbound.clone();
        tokio::spawn(async move {
            while let Some(msg) = ws_reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match ServerEvent::decode(text.as_str()) {
                        Ok(event) => {
                            let name = event.name();
                            if !inbound.dispatch(event) {
                                log::debug!("No listener for {name}, discarding");
                            }
                        }
                        Err(e) => log::warn!("Dropping malformed frame: {e}"),
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }

            *state.write().await = ConnectionState::Disconnected;
            inbound.close();
            log::info!("Connection to server closed");
        });

        Ok(())
    }

    /// Flush queued frames, send a close frame and wait for the writer.
    pub async fn close(&self) {
        let outgoing = lock(&self.outgoing).take();
        if let Some(tx) = outgoing {
            let _ = tx.send(Outbound::Close);
        }

        let writer = lock(&self.writer).take();
        if let Some(handle) = writer {
            if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, handle).await.is_err() {
                log::warn!("Timed out flushing outbound frames");
            }
        }

        *self.state.write().await = ConnectionState::Disconnected;
    }

    /// Get the current connection state.
    pub async fn connection_state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Get the server URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WsChannel {
    fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        let frame = event.encode()?;
        let outgoing = lock(&self.outgoing);
        let tx = outgoing.as_ref().ok_or(TransportError::NotConnected)?;
        tx.send(Outbound::Frame(frame))
            .map_err(|_| TransportError::NotConnected)
    }

    fn subscribe(&self) -> Result<Subscription, TransportError> {
        self.inbound.register()
    }
}
