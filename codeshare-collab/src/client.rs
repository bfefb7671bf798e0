//! Room client — composes lifecycle, emitter, store and presence over one
//! injected transport.
//!
//! Provides:
//! - Listener lifecycle (`start` / `teardown`)
//! - Join/leave and local edits (optimistic, local-first)
//! - One event-loop turn at a time via [`CodeRoom::step`]
//! - A render snapshot via [`CodeRoom::view`]
//!
//! Everything runs on one task: the room is mutated only between awaits,
//! by whichever event woke `step` or by a direct call from the host.

use std::future::Future;

use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::emitter::{Delivery, SyncEmitter};
use crate::lifecycle::{JoinOutcome, RoomController, Session, UnloadListener};
use crate::presence::{PresenceCoordinator, SignalKind};
use crate::protocol::{Language, ServerEvent};
use crate::store::{Applied, Document, SessionStore};
use crate::transport::{SharedTransport, Subscription, TransportError};

/// What woke one turn of the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// An inbound event was applied.
    Event(Applied),
    /// Presence signals cleared on their deadline.
    Expired(Vec<SignalKind>),
    /// The inbound stream ended and no signal is pending.
    Closed,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub session: Option<Session>,
    pub language: Language,
    pub content: String,
    pub members: Vec<String>,
    pub typing: Option<String>,
    pub user_left: Option<String>,
    pub copied: Option<String>,
}

impl RoomView {
    pub fn is_joined(&self) -> bool {
        self.session.is_some()
    }
}

enum Wake {
    Inbound(Option<ServerEvent>),
    Deadline,
}

pub struct CodeRoom {
    transport: SharedTransport,
    controller: RoomController,
    emitter: SyncEmitter,
    store: SessionStore,
    inbound: Option<Subscription>,
}

impl CodeRoom {
    pub fn new(transport: SharedTransport, config: &ClientConfig) -> Self {
        Self {
            controller: RoomController::new(transport.clone()),
            emitter: SyncEmitter::new(transport.clone()),
            store: SessionStore::new(
                config.initial_document(),
                PresenceCoordinator::with_ttl(config.signal_ttl),
            ),
            transport,
            inbound: None,
        }
    }

    /// Install the inbound listener. Calling it again while started is a no-op.
    pub fn start(&mut self) -> Result<(), TransportError> {
        if self.inbound.is_none() {
            self.inbound = Some(self.transport.subscribe()?);
        }
        Ok(())
    }

    /// Remove the inbound listener.
    pub fn teardown(&mut self) {
        self.inbound = None;
    }

    pub fn is_started(&self) -> bool {
        self.inbound.is_some()
    }

    pub fn join(&mut self, room_id: &str, user_name: &str) -> JoinOutcome {
        let outcome = self.controller.join(room_id, user_name);
        if outcome.is_joined() {
            self.store.activate();
        }
        outcome
    }

    /// Leave the room. Returns `false` if not in one.
    pub fn leave(&mut self) -> bool {
        let left = self.controller.leave().is_some();
        if left {
            self.store.reset();
        }
        left
    }

    /// Local reset after the unload listener already sent the leave intent.
    pub fn handle_unload(&mut self) {
        if self.controller.abandon().is_some() {
            self.store.reset();
        }
    }

    /// See [`RoomController::install_unload_listener`].
    pub fn install_unload_listener<F>(&self, unload: F) -> UnloadListener
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.controller.install_unload_listener(unload)
    }

    /// Replace the buffer with the user's edit. `None` when not in a room.
    pub fn on_local_content_change(&mut self, content: impl Into<String>) -> Option<Delivery> {
        let Some(session) = self.controller.session() else {
            log::debug!("Edit ignored outside a room");
            return None;
        };
        Some(
            self.emitter
                .content_changed(session, self.store.document_mut(), content.into()),
        )
    }

    /// Switch the buffer language. `None` when not in a room.
    pub fn on_local_language_change(&mut self, language: Language) -> Option<Delivery> {
        let Some(session) = self.controller.session() else {
            log::debug!("Language change ignored outside a room");
            return None;
        };
        Some(
            self.emitter
                .language_changed(session, self.store.document_mut(), language),
        )
    }

    /// Room id for the host's clipboard; raises the copy confirmation.
    pub fn copy_room_id(&mut self) -> Option<String> {
        let room_id = self.controller.session()?.room_id.clone();
        self.store.presence_mut().copied(Instant::now());
        Some(room_id)
    }

    pub fn handle_event(&mut self, event: ServerEvent) -> Applied {
        self.handle_event_at(event, Instant::now())
    }

    pub fn handle_event_at(&mut self, event: ServerEvent, now: Instant) -> Applied {
        self.store.apply(event, now)
    }

    pub fn expire_signals(&mut self, now: Instant) -> Vec<SignalKind> {
        self.store.presence_mut().expire(now)
    }

    pub fn next_signal_deadline(&self) -> Option<Instant> {
        self.store.presence().next_deadline()
    }

    /// Wait for the next inbound event or signal deadline and apply it.
    ///
    /// Cancel-safe: dropping the future loses nothing.
    pub async fn step(&mut self) -> Step {
        let deadline = self.next_signal_deadline();

        let wake = match self.inbound.as_mut() {
            Some(inbound) => tokio::select! {
                event = inbound.recv() => Wake::Inbound(event),
                () = sleep_until(deadline) => Wake::Deadline,
            },
            None if deadline.is_some() => {
                sleep_until(deadline).await;
                Wake::Deadline
            }
            None => Wake::Inbound(None),
        };

        match wake {
            Wake::Inbound(Some(event)) => Step::Event(self.handle_event(event)),
            Wake::Inbound(None) => {
                // Stream closed: drain remaining deadlines before reporting.
                self.inbound = None;
                match self.next_signal_deadline() {
                    Some(deadline) => {
                        sleep_until(Some(deadline)).await;
                        Step::Expired(self.expire_signals(Instant::now()))
                    }
                    None => Step::Closed,
                }
            }
            Wake::Deadline => Step::Expired(self.expire_signals(Instant::now())),
        }
    }

    pub fn view(&self) -> RoomView {
        let presence = self.store.presence();
        let document = self.store.document();
        RoomView {
            session: self.controller.session().cloned(),
            language: document.language,
            content: document.content.clone(),
            members: self.store.member_labels(),
            typing: presence.text(SignalKind::Typing).map(str::to_string),
            user_left: presence.text(SignalKind::UserLeft).map(str::to_string),
            copied: presence.text(SignalKind::Copied).map(str::to_string),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.controller.session()
    }

    pub fn is_joined(&self) -> bool {
        self.controller.is_joined()
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn members(&self) -> &[String] {
        self.store.members()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
