// src/infra/paths.rs — Local path management
//
// All paths respect the SUPPORT_CHAT_HOME environment variable for isolation.
// When unset, everything lives under ~/.support-chat/.

use std::path::PathBuf;

/// Returns the SUPPORT_CHAT_HOME override, if set.
fn support_chat_home() -> Option<PathBuf> {
    std::env::var_os("SUPPORT_CHAT_HOME").map(PathBuf::from)
}

/// Configuration directory: $SUPPORT_CHAT_HOME/ or ~/.support-chat/
pub fn config_dir() -> PathBuf {
    if let Some(home) = support_chat_home() {
        return home;
    }
    dirs_home().join(".support-chat")
}

/// Home directory, or the working directory when no home can be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// State directory: ~/.support-chat/state/ (visitor identity, preferences)
pub fn state_dir() -> PathBuf {
    config_dir().join("state")
}

/// Visitor identity record (the client-side equivalent of the id cookie)
pub fn identity_path() -> PathBuf {
    state_dir().join("visitor.json")
}

/// Local device preferences (selected mode, sidebar flag)
pub fn prefs_path() -> PathBuf {
    state_dir().join("prefs.json")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
