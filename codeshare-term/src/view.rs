//! Plain-text rendering of a room snapshot.

use std::fmt::Write;

use codeshare_collab::{Applied, RoomView};

const RULE: &str = "────────────────────────────────────────";

/// Full view: header, members, live signals, then the buffer.
pub fn render(view: &RoomView) -> String {
    let Some(session) = &view.session else {
        return "Not in a room. Use :join <room> <name> (or :help).".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "Code Room: {}", session.room_id);
    let _ = writeln!(out, "You: {}   Language: {}", session.user_name, view.language.label());
    let _ = writeln!(out, "Users in Room: {}", view.members.join(", "));
    for line in signal_lines(view) {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", view.content);
    out.push_str(RULE);
    out
}

/// The live signals currently showing, one per line.
pub fn signal_lines(view: &RoomView) -> Vec<&str> {
    [&view.typing, &view.user_left, &view.copied]
        .into_iter()
        .filter_map(|signal| signal.as_deref())
        .collect()
}

/// One-line notice for an applied inbound event, if it deserves one.
pub fn notice(applied: &Applied, view: &RoomView) -> Option<String> {
    match applied {
        Applied::Members(count) => Some(format!("{count} in room: {}", view.members.join(", "))),
        Applied::Content => Some(format!(
            "Buffer updated ({} lines)",
            view.content.lines().count()
        )),
        Applied::Language(language) => Some(format!("Language is now {}", language.label())),
        Applied::PeerJoined(user) => Some(format!("{user} joined")),
        Applied::Typing(_) => view.typing.clone(),
        Applied::PeerLeft(_) => view.user_left.clone(),
        Applied::Ignored => None,
    }
}
