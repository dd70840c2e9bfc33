// src/cli/render.rs — Terminal formatting for sessions and transcripts

use chrono::{DateTime, Utc};

use crate::history::{ChatSession, Message};
use crate::util::{preview, relative_time};

const TITLE_WIDTH: usize = 40;

/// One sidebar row: marker, index, title, age, mode and model.
pub fn session_line(
    index: usize,
    session: &ChatSession,
    is_current: bool,
    now: DateTime<Utc>,
) -> String {
    let marker = if is_current { "*" } else { " " };
    format!(
        "{marker} {:>2}. {:<width$}  {:<16} [{} · {}]",
        index + 1,
        preview(session.display_title(), TITLE_WIDTH),
        relative_time(session.updated, now),
        session.config.mode,
        session.config.model,
        width = TITLE_WIDTH,
    )
}

pub fn print_sessions(sessions: &[ChatSession], current: Option<&str>) {
    if sessions.is_empty() {
        eprintln!("  No chat history yet. Start a conversation to see it here.");
        return;
    }
    let now = Utc::now();
    for (i, s) in sessions.iter().enumerate() {
        eprintln!("{}", session_line(i, s, current == Some(s.id.as_str()), now));
    }
}

pub fn format_message(message: &Message) -> String {
    let who = if message.is_user { "you" } else { "assistant" };
    format!("{who}> {}", message.content)
}

pub fn print_transcript<'a>(messages: impl Iterator<Item = &'a Message>) {
    let mut any = false;
    for m in messages {
        any = true;
        println!("{}\n", format_message(m));
    }
    if !any {
        eprintln!("  What can I help with?");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{ChatConfig, ChatMode, ChatModel};
    use chrono::TimeZone;

    #[test]
    fn test_session_line() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let s = ChatSession {
            id: "abc".into(),
            title: Some("Install on Windows".into()),
            messages: vec![],
            config: ChatConfig {
                model: ChatModel::Gpt4,
                mode: ChatMode::Gemini,
            },
            created: 0,
            updated: now.timestamp_millis() - 120_000,
        };
        let line = session_line(0, &s, true, now);
        assert!(line.starts_with("*  1. Install on Windows"));
        assert!(line.contains("2 minutes ago"));
        assert!(line.ends_with("[gemini · gpt-4]"));
    }

    #[test]
    fn test_format_message() {
        assert_eq!(format_message(&Message::user("hi")), "you> hi");
        assert_eq!(format_message(&Message::bot("hello")), "assistant> hello");
    }
}
