//! Transport channel between a room client and the coordinating server.
//!
//! One channel exists per process. It is constructed once, handed to every
//! component that emits, and reused across join/leave cycles.
//!
//! ```text
//!  emit(ClientEvent) ──► outbound queue ──► server
//!  Subscription ◄────── inbound slot ◄──── server
//! ```
//!
//! Emission is fire-and-forget: `emit` only enqueues. Events sent while
//! disconnected are lost, and inbound events that arrive with no listener
//! registered are discarded (at-most-once delivery).

mod memory;
mod ws;

pub use memory::MemoryChannel;
pub use ws::{ConnectionState, WsChannel};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::protocol::{ClientEvent, ProtocolError, ServerEvent};

/// Transport errors. None of these are fatal to a session.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Not connected")]
    NotConnected,
    #[error("An inbound listener is already registered")]
    AlreadySubscribed,
    #[error("Connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// A bidirectional named-event channel.
pub trait Transport: Send + Sync {
    /// Enqueue an outbound event. Never waits on the network.
    fn emit(&self, event: ClientEvent) -> Result<(), TransportError>;

    /// Register the inbound listener. Only one may be live at a time.
    fn subscribe(&self) -> Result<Subscription, TransportError>;
}

/// Shared handle injected into every emitting component.
pub type SharedTransport = Arc<dyn Transport>;

/// Inbound listener registration. Dropping it unregisters the listener.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<ServerEvent>,
    slot: InboundSlot,
}

impl Subscription {
    /// Wait for the next inbound event. `None` once the channel has closed.
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.rx.recv().await
    }

    /// Take an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.rx.close();
        self.slot.release();
    }
}

/// Single-listener slot shared by a channel and its live subscription.
#[derive(Clone, Default)]
pub(crate) struct InboundSlot {
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<ServerEvent>>>>,
}

impl InboundSlot {
    pub(crate) fn register(&self) -> Result<Subscription, TransportError> {
        let mut sender = lock(&self.sender);
        if sender.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return Err(TransportError::AlreadySubscribed);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *sender = Some(tx);
        Ok(Subscription {
            rx,
            slot: self.clone(),
        })
    }

    /// Hand an event to the listener. Returns `false` if nobody is listening.
    pub(crate) fn dispatch(&self, event: ServerEvent) -> bool {
        match lock(&self.sender).as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub(crate) fn is_registered(&self) -> bool {
        lock(&self.sender).as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Drop the sender so a waiting listener observes end of stream.
    pub(crate) fn close(&self) {
        lock(&self.sender).take();
    }

    /// Clear the slot if its listener is gone. Leaves a newer registration alone.
    fn release(&self) {
        let mut sender = lock(&self.sender);
        if sender.as_ref().is_some_and(|tx| tx.is_closed()) {
            sender.take();
        }
    }
}

/// Lock a std mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
