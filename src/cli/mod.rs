// src/cli/mod.rs — CLI definition (clap derive)

pub mod ask;
pub mod chat;
pub mod picker;
pub mod render;
pub mod sessions;

use clap::{Parser, Subcommand};

use crate::history::{ChatMode, ChatModel};

#[derive(Parser)]
#[command(name = "support-chat", about = "Chat with the support assistant", version)]
pub struct Cli {
    /// Model to record for new and switched sessions
    #[arg(short, long, value_enum)]
    pub model: Option<ChatModel>,

    /// Response mode: gemini (direct) or mcp (knowledge tools)
    #[arg(long, value_enum)]
    pub mode: Option<ChatMode>,

    /// Backend base URL (overrides config and SUPPORT_CHAT_BACKEND_URL)
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive multi-session chat (default)
    Chat {
        /// Open this session instead of the most recent one
        #[arg(long)]
        session: Option<String>,
    },
    /// Ask a single question without saving history
    Ask {
        /// The question
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
        /// Read the question from stdin
        #[arg(long)]
        stdin: bool,
    },
    /// List saved sessions, most recent first
    Sessions,
    /// Print the transcript of a session
    Show {
        /// Session id (or unique prefix)
        id: String,
    },
    /// Rename a session
    Rename {
        /// Session id (or unique prefix)
        id: String,
        /// New title; blank resets to "New Chat"
        #[arg(trailing_var_arg = true)]
        title: Vec<String>,
    },
    /// Delete a session
    Delete {
        /// Session id (or unique prefix)
        id: String,
    },
    /// Show the anonymous visitor id
    Identity {
        /// Forget the stored id and create a new one
        #[arg(long)]
        reset: bool,
    },
}
