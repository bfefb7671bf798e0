//! # codeshare-collab — session synchronization for shared code rooms
//!
//! Participants join a named room and share one code buffer, a language
//! tag, and live typing/leave signals over a single event channel.
//!
//! ## Architecture
//!
//! ```text
//!  user action                                   coordinating server
//!      │                                                 ▲   │
//!      ▼                                                 │   │
//! ┌──────────────┐ join/leave ┌─────────────┐  emit      │   │
//! │  CodeRoom    │──────────► │ RoomControl │──────┐     │   │
//! │ (one task)   │  edits     ├─────────────┤      ▼     │   ▼
//! │              │──────────► │ SyncEmitter │──► Transport ──► Subscription
//! └──────┬───────┘            └─────────────┘                     │
//!        │ step()                                                 │
//!        ▼                                                        ▼
//! ┌──────────────┐   typing / left / copied    ┌─────────────────────┐
//! │ SessionStore │ ──────────────────────────► │ PresenceCoordinator │
//! │ (replica)    │                             │ (2s signals)        │
//! └──────────────┘                             └─────────────────────┘
//! ```
//!
//! Local edits apply before they are emitted. Inbound events replace whole
//! slices of the replica, so the last event processed for a slice wins.
//!
//! ## Modules
//!
//! - [`protocol`] — Named JSON events, both directions
//! - [`transport`] — Channel trait, WebSocket and in-memory channels
//! - [`store`] — Session state reducer
//! - [`presence`] — Self-expiring typing/leave/copy signals
//! - [`lifecycle`] — Join/leave state machine and unload listener
//! - [`emitter`] — Local edits → outbound events
//! - [`client`] — `CodeRoom`, the composed client
//! - [`config`] — Client configuration

pub mod client;
pub mod config;
pub mod emitter;
pub mod lifecycle;
pub mod presence;
pub mod protocol;
pub mod store;
pub mod transport;

// Re-exports for convenience
pub use client::{CodeRoom, RoomView, Step};
pub use config::ClientConfig;
pub use emitter::{Delivery, SyncEmitter};
pub use lifecycle::{JoinOutcome, RoomController, RoomState, Session, UnloadListener};
pub use presence::{short_id, PresenceCoordinator, Signal, SignalKind, DEFAULT_SIGNAL_TTL};
pub use protocol::{ClientEvent, Language, ProtocolError, ServerEvent, UnknownLanguage};
pub use store::{Applied, Document, SessionStore, DEFAULT_CONTENT};
pub use transport::{
    ConnectionState, MemoryChannel, SharedTransport, Subscription, Transport, TransportError,
    WsChannel,
};
