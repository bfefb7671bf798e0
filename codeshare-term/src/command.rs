//! Line commands typed at the prompt.
//!
//! Lines starting with `:` are commands; anything else is appended to the
//! shared buffer as a new line.

use codeshare_collab::Language;

pub const HELP: &str = "\
Commands:
  :join <room> <name>   join a room
  :leave                leave the current room
  :lang <language>      javascript | python | java | cpp
  :copy                 print the room id to share
  :set <text>           replace the whole buffer
  :clear                empty the buffer
  :show                 print the room and buffer
  :help                 show this help
  :quit                 leave and exit
Any other line is appended to the buffer.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join { room_id: String, user_name: String },
    Leave,
    Language(Language),
    Copy,
    Set(String),
    Append(String),
    Show,
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Append(line.to_string());
        };

        let (name, raw_args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let args = raw_args.trim();

        match name {
            "join" | "j" => {
                let mut parts = args.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(room_id), Some(user_name), None) => Command::Join {
                        room_id: room_id.to_string(),
                        user_name: user_name.to_string(),
                    },
                    _ => Command::Invalid("usage: :join <room> <name>".into()),
                }
            }
            "leave" => Command::Leave,
            "lang" | "language" => match args.parse::<Language>() {
                Ok(language) => Command::Language(language),
                Err(e) => Command::Invalid(e.to_string()),
            },
            "copy" => Command::Copy,
            // Only the first separator is consumed so leading indentation survives.
            "set" => Command::Set(raw_args.to_string()),
            "clear" => Command::Set(String::new()),
            "show" | "s" => Command::Show,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command :{other} (try :help)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_appends() {
        assert_eq!(
            Command::parse("    return x;"),
            Command::Append("    return x;".into())
        );
        assert_eq!(Command::parse(""), Command::Append(String::new()));
    }

    #[test]
    fn test_join() {
        assert_eq!(
            Command::parse(":join room1 alice"),
            Command::Join {
                room_id: "room1".into(),
                user_name: "alice".into()
            }
        );
        assert!(matches!(Command::parse(":join room1"), Command::Invalid(_)));
        assert!(matches!(Command::parse(":join a b c"), Command::Invalid(_)));
    }

    #[test]
    fn test_language() {
        assert_eq!(
            Command::parse(":lang Python"),
            Command::Language(Language::Python)
        );
        assert_eq!(Command::parse(":lang cpp"), Command::Language(Language::Cpp));
        assert_eq!(
            Command::parse(":lang cobol"),
            Command::Invalid("Unknown language: cobol".into())
        );
    }

    #[test]
    fn test_set_keeps_indentation() {
        assert_eq!(
            Command::parse(":set   indented"),
            Command::Set("  indented".into())
        );
        assert_eq!(Command::parse(":set"), Command::Set(String::new()));
        assert_eq!(Command::parse(":clear"), Command::Set(String::new()));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse(":leave"), Command::Leave);
        assert_eq!(Command::parse(":copy"), Command::Copy);
        assert_eq!(Command::parse(":show"), Command::Show);
        assert_eq!(Command::parse(":help"), Command::Help);
        assert_eq!(Command::parse(":q"), Command::Quit);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse(":frobnicate"),
            Command::Invalid("unknown command :frobnicate (try :help)".into())
        );
    }
}
