//! In-process loopback channel.
//!
//! Records every emitted event and lets the holder inject inbound events.
//! Used by tests and by embedders that drive the room without a network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{lock, InboundSlot, Subscription, Transport, TransportError};
use crate::protocol::{ClientEvent, ServerEvent};

#[derive(Clone)]
pub struct MemoryChannel {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    sent: Mutex<Vec<ClientEvent>>,
    online: AtomicBool,
    inbound: InboundSlot,
}

impl MemoryChannel {
    /// A connected channel with no listener.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                sent: Mutex::new(Vec::new()),
                online: AtomicBool::new(true),
                inbound: InboundSlot::default(),
            }),
        }
    }

    /// Deliver an inbound event. Returns `false` if nobody is listening.
    pub fn push(&self, event: ServerEvent) -> bool {
        self.inner.inbound.dispatch(event)
    }

    /// Every event emitted so far, in order.
    pub fn sent(&self) -> Vec<ClientEvent> {
        lock(&self.inner.sent).clone()
    }

    /// Drain the emitted events.
    pub fn take_sent(&self) -> Vec<ClientEvent> {
        std::mem::take(&mut *lock(&self.inner.sent))
    }

    /// Simulate a dropped connection: emissions fail and are not recorded.
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Whether an inbound listener is currently registered.
    pub fn has_subscriber(&self) -> bool {
        self.inner.inbound.is_registered()
    }

    /// End the inbound stream, as a server-side close would.
    pub fn close_inbound(&self) {
        self.inner.inbound.close();
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryChannel {
    fn emit(&self, event: ClientEvent) -> Result<(), TransportError> {
        if !self.is_online() {
            return Err(TransportError::NotConnected);
        }
        lock(&self.inner.sent).push(event);
        Ok(())
    }

    fn subscribe(&self) -> Result<Subscription, TransportError> {
        self.inner.inbound.register()
    }
}
