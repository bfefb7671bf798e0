//! Session state store — this client's replica of the room.
//!
//! Every inbound event goes through [`SessionStore::apply`], one exhaustive
//! match. Each slice (membership, buffer, language) is replaced wholesale
//! by its event: the last event processed for a slice wins and no merged
//! state is representable. Concurrent edits from different participants
//! are therefore last-writer-wins.
//!
//! The store only accepts events while a room is joined. Events that
//! arrive outside a room are ignored; the client cannot check which room
//! an event belongs to beyond trusting the transport.

use tokio::time::Instant;

use crate::presence::{short_id, PresenceCoordinator};
use crate::protocol::{Language, ServerEvent};

/// Default buffer text.
pub const DEFAULT_CONTENT: &str = "//start coding here";

/// The shared buffer and its language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub language: Language,
    pub content: String,
}

impl Document {
    /// Whole-buffer replacement.
    pub fn replace_content(&mut self, content: String) {
        self.content = content;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self {
            language: Language::default(),
            content: DEFAULT_CONTENT.to_string(),
        }
    }
}

/// What an inbound event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Membership replaced; carries the new member count.
    Members(usize),
    Content,
    Language(Language),
    /// Informational join notice, no state change.
    PeerJoined(String),
    Typing(String),
    PeerLeft(String),
    /// Not in a room; event discarded.
    Ignored,
}

pub struct SessionStore {
    document: Document,
    initial: Document,
    members: Vec<String>,
    presence: PresenceCoordinator,
    active: bool,
}

impl SessionStore {
    pub fn new(initial: Document, presence: PresenceCoordinator) -> Self {
        Self {
            document: initial.clone(),
            initial,
            members: Vec::new(),
            presence,
            active: false,
        }
    }

    /// Apply one inbound event.
    pub fn apply(&mut self, event: ServerEvent, now: Instant) -> Applied {
        if !self.active {
            log::debug!("Ignoring {} outside a room", event.name());
            return Applied::Ignored;
        }

        match event {
            ServerEvent::UserJoined(members) => {
                let count = members.len();
                self.members = members;
                Applied::Members(count)
            }
            ServerEvent::CodeUpdate(code) => {
                self.document.replace_content(code);
                Applied::Content
            }
            ServerEvent::PeerJoined(user) => {
                log::info!("{user} joined the room");
                Applied::PeerJoined(user)
            }
            ServerEvent::UserTyping(user) => {
                self.presence.user_typing(&user, now);
                Applied::Typing(user)
            }
            ServerEvent::LanguageUpdate(language) => {
                log::info!("Received language change: {language}");
                self.document.set_language(language);
                Applied::Language(language)
            }
            ServerEvent::PeerLeft(user) => {
                self.presence.user_left(&user, now);
                Applied::PeerLeft(user)
            }
        }
    }

    /// Start accepting inbound events (room joined).
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Back to the initial document and an empty membership.
    ///
    /// Presence signals are left alone; they clear on their own deadlines.
    pub fn reset(&mut self) {
        self.active = false;
        self.document = self.initial.clone();
        self.members.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Membership as last reported by the server.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Membership with identifiers shortened for display.
    pub fn member_labels(&self) -> Vec<String> {
        self.members.iter().map(|member| short_id(member)).collect()
    }

    pub fn presence(&self) -> &PresenceCoordinator {
        &self.presence
    }

    pub fn presence_mut(&mut self) -> &mut PresenceCoordinator {
        &mut self.presence
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Document::default(), PresenceCoordinator::new())
    }
}
