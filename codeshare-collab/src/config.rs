//! Client configuration.

use std::time::Duration;

use crate::presence::DEFAULT_SIGNAL_TTL;
use crate::protocol::Language;
use crate::store::{Document, DEFAULT_CONTENT};

/// Room client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the coordinating server
    pub server_url: String,
    /// How long presence signals stay visible
    pub signal_ttl: Duration,
    /// Buffer shown before any server content arrives, and after leaving
    pub initial_content: String,
    /// Language selected before any server update arrives
    pub initial_language: Language,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:5000".to_string(),
            signal_ttl: DEFAULT_SIGNAL_TTL,
            initial_content: DEFAULT_CONTENT.to_string(),
            initial_language: Language::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_signal_ttl(mut self, ttl: Duration) -> Self {
        self.signal_ttl = ttl;
        self
    }

    /// The document a fresh or just-left room starts from.
    pub fn initial_document(&self) -> Document {
        Document {
            language: self.initial_language,
            content: self.initial_content.clone(),
        }
    }
}
