//! Named-event protocol between a room client and the coordinating server.
//!
//! Wire format (one JSON text frame per event):
//! ```text
//! {"event": "join",       "data": {"roomId": "r1", "userName": "alice"}}
//! {"event": "leaveRoom"}
//! {"event": "codeChange", "data": {"roomId": "r1", "code": "fn main() {}"}}
//! {"event": "userJoined", "data": ["alice", "bob"]}
//! {"event": "codeUpdate", "data": "fn main() {}"}
//! ```
//!
//! Outbound and inbound events are separate enums: a handler can only
//! match the events its direction actually carries, and an unknown event
//! name fails to decode instead of falling through a string lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language tag of the shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    Java,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::JavaScript,
        Language::Python,
        Language::Java,
        Language::Cpp,
    ];

    /// Wire tag, also the editor's language id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Human-readable name for selectors.
    pub fn label(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Cpp => "C++",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == tag)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// A language tag outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown language: {0}")]
pub struct UnknownLanguage(pub String);

/// Client → server events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Request to join (or create) a room.
    #[serde(rename = "join", rename_all = "camelCase")]
    Join { room_id: String, user_name: String },

    /// Leave the current room. Carries no payload.
    #[serde(rename = "leaveRoom")]
    LeaveRoom,

    /// Full-buffer replacement.
    #[serde(rename = "codeChange", rename_all = "camelCase")]
    CodeChange { room_id: String, code: String },

    /// Transient "I am typing" signal.
    #[serde(rename = "typing", rename_all = "camelCase")]
    Typing { room_id: String, user_name: String },

    /// Language tag update.
    #[serde(rename = "languageChange", rename_all = "camelCase")]
    LanguageChange { room_id: String, language: Language },
}

impl ClientEvent {
    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::LeaveRoom => "leaveRoom",
            ClientEvent::CodeChange { .. } => "codeChange",
            ClientEvent::Typing { .. } => "typing",
            ClientEvent::LanguageChange { .. } => "languageChange",
        }
    }

    /// Serialize to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Serialization)
    }

    /// Deserialize from a JSON text frame.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Deserialization)
    }
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Full membership snapshot, in server order.
    #[serde(rename = "userJoined")]
    UserJoined(Vec<String>),

    /// Full buffer text.
    #[serde(rename = "codeUpdate")]
    CodeUpdate(String),

    /// Informational notice that one participant joined.
    #[serde(rename = "user-joined")]
    PeerJoined(String),

    /// A participant is typing.
    #[serde(rename = "userTyping")]
    UserTyping(String),

    /// Language tag replacement.
    #[serde(rename = "languageUpdate")]
    LanguageUpdate(Language),

    /// A participant left.
    #[serde(rename = "user-left")]
    PeerLeft(String),
}

impl ServerEvent {
    /// Wire event name.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::UserJoined(_) => "userJoined",
            ServerEvent::CodeUpdate(_) => "codeUpdate",
            ServerEvent::PeerJoined(_) => "user-joined",
            ServerEvent::UserTyping(_) => "userTyping",
            ServerEvent::LanguageUpdate(_) => "languageUpdate",
            ServerEvent::PeerLeft(_) => "user-left",
        }
    }

    /// Serialize to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Serialization)
    }

    /// Deserialize from a JSON text frame.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Deserialization)
    }
}

/// Frame codec errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),
}
