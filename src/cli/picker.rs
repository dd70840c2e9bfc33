// src/cli/picker.rs — Resolving session references and interactive pickers

use inquire::Select;
use std::fmt;

use crate::history::{ChatMode, ChatModel, ChatSession};

/// Find a session by 1-based list index, exact id, or unique id prefix.
pub fn resolve_session_ref<'a>(sessions: &'a [ChatSession], arg: &str) -> Option<&'a ChatSession> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }
    if let Ok(n) = arg.parse::<usize>() {
        if n >= 1 && n <= sessions.len() && arg.len() <= 3 {
            return sessions.get(n - 1);
        }
    }
    if let Some(exact) = sessions.iter().find(|s| s.id == arg) {
        return Some(exact);
    }
    let mut matches = sessions.iter().filter(|s| s.id.starts_with(arg));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

struct SessionOption<'a> {
    session: &'a ChatSession,
}

impl fmt::Display for SessionOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<40} [{} · {}]",
            crate::util::preview(self.session.display_title(), 40),
            self.session.config.mode,
            self.session.config.model
        )
    }
}

/// Pick a session interactively. `None` when cancelled or nothing to pick.
pub fn pick_session(sessions: &[ChatSession]) -> Option<String> {
    if sessions.is_empty() {
        return None;
    }
    let options: Vec<SessionOption> = sessions.iter().map(|session| SessionOption { session }).collect();
    Select::new("Open chat:", options)
        .prompt()
        .ok()
        .map(|o| o.session.id.clone())
}

struct ModelOption(ChatModel);

impl fmt::Display for ModelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16} {}", self.0.label(), self.0.id())
    }
}

pub fn pick_model(current: ChatModel) -> Option<ChatModel> {
    let options: Vec<ModelOption> = ChatModel::ALL.into_iter().map(ModelOption).collect();
    let start = ChatModel::ALL.iter().position(|m| *m == current).unwrap_or(0);
    Select::new("Model:", options)
        .with_starting_cursor(start)
        .prompt()
        .ok()
        .map(|o| o.0)
}

struct ModeOption(ChatMode);

impl fmt::Display for ModeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12} {}", self.0.label(), self.0.description())
    }
}

pub fn pick_mode(current: ChatMode) -> Option<ChatMode> {
    let options: Vec<ModeOption> = ChatMode::ALL.into_iter().map(ModeOption).collect();
    let start = ChatMode::ALL.iter().position(|m| *m == current).unwrap_or(0);
    Select::new("Mode:", options)
        .with_starting_cursor(start)
        .prompt()
        .ok()
        .map(|o| o.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ChatConfig;

    fn session(id: &str) -> ChatSession {
        ChatSession {
            id: id.into(),
            title: None,
            messages: vec![],
            config: ChatConfig::default(),
            created: 0,
            updated: 0,
        }
    }

    #[test]
    fn test_resolve_by_index() {
        let list = vec![session("aaa-1"), session("bbb-2")];
        assert_eq!(resolve_session_ref(&list, "2").unwrap().id, "bbb-2");
        assert!(resolve_session_ref(&list, "3").is_none());
        assert!(resolve_session_ref(&list, "0").is_none());
    }

    #[test]
    fn test_resolve_by_prefix() {
        let list = vec![session("abc-1"), session("abd-2")];
        assert_eq!(resolve_session_ref(&list, "abc").unwrap().id, "abc-1");
        assert!(resolve_session_ref(&list, "ab").is_none());
        assert_eq!(resolve_session_ref(&list, "abd-2").unwrap().id, "abd-2");
        assert!(resolve_session_ref(&list, "").is_none());
    }
}
