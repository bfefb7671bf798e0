//! Presence coordinator — short-lived UI signals derived from room events.
//!
//! ## Data flow
//!
//! ```text
//!  userTyping("alice-laptop")   user-left("bob")   copy_room_id()
//!        │                           │                   │
//!        ▼                           ▼                   ▼
//!   Typing slot                UserLeft slot        Copied slot
//!   "alice-la... is Typing"    "bob... left the room"   "Copied!"
//!        │
//!        │  deadline = raised_at + ttl  (newest raise replaces the slot)
//!        ▼
//!  PresenceCoordinator::expire(now)  ── clears slots whose deadline passed
//! ```
//!
//! Each kind holds at most one signal. Raising a kind that is already
//! showing replaces its text and discards the old deadline, so the clear
//! is always measured from the most recent raise.
//!
//! The clock is `tokio::time::Instant` so the event loop can sleep until
//! [`PresenceCoordinator::next_deadline`] and tests can run on paused time.

use std::time::Duration;
use tokio::time::Instant;

/// How long a signal stays visible.
pub const DEFAULT_SIGNAL_TTL: Duration = Duration::from_millis(2000);

/// Identifiers are cut to this many characters for display.
const SHORT_ID_CHARS: usize = 8;

/// Kinds of presence signal. One slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Typing,
    UserLeft,
    Copied,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [SignalKind::Typing, SignalKind::UserLeft, SignalKind::Copied];
}

/// A visible, self-expiring signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub kind: SignalKind,
    pub text: String,
    pub raised_at: Instant,
    pub expires_at: Instant,
}

impl Signal {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// First eight characters of an identifier followed by `...`.
///
/// Counts characters, not bytes, so multi-byte names are never split.
pub fn short_id(id: &str) -> String {
    let head: String = id.chars().take(SHORT_ID_CHARS).collect();
    format!("{head}...")
}

/// Holds the current signal of each kind and their deadlines.
#[derive(Debug, Clone)]
pub struct PresenceCoordinator {
    ttl: Duration,
    typing: Option<Signal>,
    user_left: Option<Signal>,
    copied: Option<Signal>,
}

impl PresenceCoordinator {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SIGNAL_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            typing: None,
            user_left: None,
            copied: None,
        }
    }

    /// Show "<user> is Typing".
    pub fn user_typing(&mut self, user: &str, now: Instant) -> &Signal {
        self.raise(SignalKind::Typing, format!("{} is Typing", short_id(user)), now)
    }

    /// Show "<user> left the room".
    pub fn user_left(&mut self, user: &str, now: Instant) -> &Signal {
        self.raise(SignalKind::UserLeft, format!("{} left the room", short_id(user)), now)
    }

    /// Show the copy confirmation.
    pub fn copied(&mut self, now: Instant) -> &Signal {
        self.raise(SignalKind::Copied, "Copied!".to_string(), now)
    }

    /// Replace the slot for `kind`, cancelling any pending clear.
    pub fn raise(&mut self, kind: SignalKind, text: String, now: Instant) -> &Signal {
        let expires_at = now + self.ttl;
        let slot = self.slot_mut(kind);
        if slot.take().is_some_and(|previous| !previous.is_expired(now)) {
            log::trace!("{kind:?} signal superseded before expiry");
        }
        slot.insert(Signal {
            kind,
            text,
            raised_at: now,
            expires_at,
        })
    }

    /// Clear every signal whose deadline has passed. Returns the kinds cleared.
    pub fn expire(&mut self, now: Instant) -> Vec<SignalKind> {
        let mut cleared = Vec::new();
        for kind in SignalKind::ALL {
            let slot = self.slot_mut(kind);
            if slot.as_ref().is_some_and(|signal| signal.is_expired(now)) {
                *slot = None;
                cleared.push(kind);
            }
        }
        cleared
    }

    /// Earliest pending deadline, if any signal is showing.
    pub fn next_deadline(&self) -> Option<Instant> {
        SignalKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|signal| signal.expires_at))
            .min()
    }

    pub fn get(&self, kind: SignalKind) -> Option<&Signal> {
        self.slot(kind).as_ref()
    }

    /// Display text of the signal of `kind`, if showing.
    pub fn text(&self, kind: SignalKind) -> Option<&str> {
        self.get(kind).map(|signal| signal.text.as_str())
    }

    /// Number of signals currently showing.
    pub fn active_count(&self) -> usize {
        SignalKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
            .count()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn slot(&self, kind: SignalKind) -> &Option<Signal> {
        match kind {
            SignalKind::Typing => &self.typing,
            SignalKind::UserLeft => &self.user_left,
            SignalKind::Copied => &self.copied,
        }
    }

    fn slot_mut(&mut self, kind: SignalKind) -> &mut Option<Signal> {
        match kind {
            SignalKind::Typing => &mut self.typing,
            SignalKind::UserLeft => &mut self.user_left,
            SignalKind::Copied => &mut self.copied,
        }
    }
}

impl Default for PresenceCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    // ── short_id ─────────────────────────────────────────────────

    #[test]
    fn test_short_id_truncates() {
        assert_eq!(short_id("abcdefghijkl"), "abcdefgh...");
    }

    #[test]
    fn test_short_id_short_input_still_marked() {
        assert_eq!(short_id("bob"), "bob...");
        assert_eq!(short_id(""), "...");
    }

    #[test]
    fn test_short_id_counts_chars() {
        assert_eq!(short_id("ünïcödé-naмe"), "ünïcödé-...");
    }

    // ── Raising signals ──────────────────────────────────────────

    #[test]
    fn test_typing_text() {
        let mut presence = PresenceCoordinator::new();
        let now = Instant::now();
        let signal = presence.user_typing("alice-laptop", now);

        assert_eq!(signal.text, "alice-la... is Typing");
        assert_eq!(signal.expires_at, now + DEFAULT_SIGNAL_TTL);
    }

    #[test]
    fn test_user_left_and_copied_text() {
        let mut presence = PresenceCoordinator::new();
        let now = Instant::now();
        presence.user_left("bob", now);
        presence.copied(now);

        assert_eq!(presence.text(SignalKind::UserLeft), Some("bob... left the room"));
        assert_eq!(presence.text(SignalKind::Copied), Some("Copied!"));
        assert_eq!(presence.active_count(), 2);
    }

    #[test]
    fn test_same_kind_collapses_to_latest() {
        let mut presence = PresenceCoordinator::new();
        let t0 = Instant::now();
        presence.user_typing("alice", t0);
        presence.user_typing("carol", t0 + ms(500));

        assert_eq!(presence.active_count(), 1);
        assert_eq!(presence.text(SignalKind::Typing), Some("carol... is Typing"));
    }

    // ── Expiry ───────────────────────────────────────────────────

    #[test]
    fn test_expires_after_ttl() {
        let mut presence = PresenceCoordinator::new();
        let t0 = Instant::now();
        presence.user_typing("alice", t0);

        assert!(presence.expire(t0 + ms(1999)).is_empty());
        assert!(presence.get(SignalKind::Typing).is_some());

        assert_eq!(presence.expire(t0 + ms(2000)), vec![SignalKind::Typing]);
        assert!(presence.get(SignalKind::Typing).is_none());
    }

    #[test]
    fn test_reraise_restarts_window() {
        let mut presence = PresenceCoordinator::new();
        let t0 = Instant::now();
        presence.user_typing("alice", t0);
        presence.user_typing("alice", t0 + ms(1500));

        // The first raise's deadline no longer applies.
        assert!(presence.expire(t0 + ms(2000)).is_empty());
        assert!(presence.expire(t0 + ms(3499)).is_empty());
        assert_eq!(presence.expire(t0 + ms(3500)), vec![SignalKind::Typing]);
    }

    #[test]
    fn test_kinds_expire_independently() {
        let mut presence = PresenceCoordinator::new();
        let t0 = Instant::now();
        presence.user_left("bob", t0);
        presence.user_typing("alice", t0 + ms(1000));

        assert_eq!(presence.expire(t0 + ms(2000)), vec![SignalKind::UserLeft]);
        assert_eq!(presence.text(SignalKind::Typing), Some("alice... is Typing"));
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut presence = PresenceCoordinator::with_ttl(ms(100));
        assert_eq!(presence.next_deadline(), None);

        let t0 = Instant::now();
        presence.copied(t0 + ms(50));
        presence.user_left("bob", t0);

        assert_eq!(presence.next_deadline(), Some(t0 + ms(100)));
        presence.expire(t0 + ms(100));
        assert_eq!(presence.next_deadline(), Some(t0 + ms(150)));
    }

    #[test]
    fn test_custom_ttl() {
        let presence = PresenceCoordinator::with_ttl(ms(250));
        assert_eq!(presence.ttl(), ms(250));
        assert_eq!(PresenceCoordinator::default().ttl(), DEFAULT_SIGNAL_TTL);
    }
}
