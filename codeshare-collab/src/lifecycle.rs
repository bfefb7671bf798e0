//! Room lifecycle controller — join/leave transitions.
//!
//! ```text
//!            join(room, user)            leave() / host unload
//!  Unjoined ─────────────────► Joined ─────────────────────────► Unjoined
//! ```
//!
//! Both transitions are optimistic: the intent is emitted and the local
//! state changes immediately, without waiting for the server. The server
//! is expected to push membership and buffer state after a join.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::protocol::ClientEvent;
use crate::transport::SharedTransport;

/// Identity of the room this client is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub room_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoomState {
    #[default]
    Unjoined,
    Joined(Session),
}

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// Room id or user name was empty; nothing happened.
    MissingField,
    /// Already in a room; leave first.
    AlreadyJoined,
}

impl JoinOutcome {
    pub fn is_joined(self) -> bool {
        self == JoinOutcome::Joined
    }
}

pub struct RoomController {
    transport: SharedTransport,
    state: RoomState,
}

impl RoomController {
    pub fn new(transport: SharedTransport) -> Self {
        Self {
            transport,
            state: RoomState::Unjoined,
        }
    }

    /// Emit a join intent and switch to Joined.
    pub fn join(&mut self, room_id: &str, user_name: &str) -> JoinOutcome {
        if room_id.is_empty() || user_name.is_empty() {
            log::debug!("Join ignored: room id and user name are both required");
            return JoinOutcome::MissingField;
        }
        if let RoomState::Joined(current) = &self.state {
            log::debug!("Join ignored: already in room {}", current.room_id);
            return JoinOutcome::AlreadyJoined;
        }

        let intent = ClientEvent::Join {
            room_id: room_id.to_string(),
            user_name: user_name.to_string(),
        };
        if let Err(e) = self.transport.emit(intent) {
            log::debug!("Join intent lost: {e}");
        }

        log::info!("Joined room {room_id} as {user_name}");
        self.state = RoomState::Joined(Session {
            room_id: room_id.to_string(),
            user_name: user_name.to_string(),
        });
        JoinOutcome::Joined
    }

    /// Emit a leave intent and switch to Unjoined. Returns the ended session.
    pub fn leave(&mut self) -> Option<Session> {
        let session = self.abandon()?;
        if let Err(e) = self.transport.emit(ClientEvent::LeaveRoom) {
            log::debug!("Leave intent lost: {e}");
        }
        log::info!("Left room {}", session.room_id);
        Some(session)
    }

    /// Switch to Unjoined without emitting (the intent was already sent).
    pub fn abandon(&mut self) -> Option<Session> {
        match std::mem::take(&mut self.state) {
            RoomState::Joined(session) => Some(session),
            RoomState::Unjoined => None,
        }
    }

    /// Emit a leave intent when `unload` resolves.
    ///
    /// The returned guard owns the listener; dropping it removes the
    /// listener without emitting.
    pub fn install_unload_listener<F>(&self, unload: F) -> UnloadListener
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let transport = self.transport.clone();
        let handle = tokio::spawn(async move {
            unload.await;
            log::info!("Host unloading, sending leave intent");
            if let Err(e) = transport.emit(ClientEvent::LeaveRoom) {
                log::debug!("Leave intent lost: {e}");
            }
        });
        UnloadListener {
            handle: Some(handle),
        }
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            RoomState::Joined(session) => Some(session),
            RoomState::Unjoined => None,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.state, RoomState::Joined(_))
    }
}

/// Scoped host-unload listener. Removed when dropped.
pub struct UnloadListener {
    handle: Option<JoinHandle<()>>,
}

impl UnloadListener {
    /// Resolves once the leave intent has been emitted. Pending forever
    /// after that, so it can sit in a `select!` loop.
    pub async fn fired(&mut self) {
        match self.handle.as_mut() {
            Some(handle) => {
                let _ = handle.await;
                self.handle = None;
            }
            None => std::future::pending().await,
        }
    }

    /// Whether the listener is still waiting for the host to unload.
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for UnloadListener {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
