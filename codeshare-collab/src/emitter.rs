//! Sync emitter — turns local edits into outbound events.
//!
//! Every edit is a two-step contract:
//!
//! 1. **Local apply**: the document replica changes immediately, so the
//!    editor reflects the user's own keystroke with no network wait.
//! 2. **Publish**: the new state is emitted best-effort. A lost emission
//!    never rolls back step 1.
//!
//! No debouncing happens here: every content change publishes the full
//! buffer followed by a typing signal.

use crate::lifecycle::Session;
use crate::protocol::{ClientEvent, Language};
use crate::store::Document;
use crate::transport::SharedTransport;

/// Outcome of the publish step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every event was handed to the transport.
    Sent,
    /// At least one event was lost (transport disconnected).
    Dropped,
}

pub struct SyncEmitter {
    transport: SharedTransport,
}

impl SyncEmitter {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }

    /// Replace the buffer locally, then publish it.
    pub fn content_changed(
        &self,
        session: &Session,
        document: &mut Document,
        content: String,
    ) -> Delivery {
        document.replace_content(content);
        self.publish_content(session, &document.content)
    }

    /// Publish the full buffer followed by a typing signal.
    pub fn publish_content(&self, session: &Session, content: &str) -> Delivery {
        let code = self.send(ClientEvent::CodeChange {
            room_id: session.room_id.clone(),
            code: content.to_string(),
        });
        let typing = self.send(ClientEvent::Typing {
            room_id: session.room_id.clone(),
            user_name: session.user_name.clone(),
        });

        if code == Delivery::Sent && typing == Delivery::Sent {
            Delivery::Sent
        } else {
            Delivery::Dropped
        }
    }

    /// Switch the language locally, then publish it.
    pub fn language_changed(
        &self,
        session: &Session,
        document: &mut Document,
        language: Language,
    ) -> Delivery {
        document.set_language(language);
        self.publish_language(session, language)
    }

    pub fn publish_language(&self, session: &Session, language: Language) -> Delivery {
        log::info!(
            "Emitting language change: {language} to room: {}",
            session.room_id
        );
        self.send(ClientEvent::LanguageChange {
            room_id: session.room_id.clone(),
            language,
        })
    }

    fn send(&self, event: ClientEvent) -> Delivery {
        let name = event.name();
        match self.transport.emit(event) {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                log::debug!("Dropping {name}: {e}");
                Delivery::Dropped
            }
        }
    }
}
