// src/lib.rs — Library root for support-chat

pub mod assistant;
pub mod cli;
pub mod conversation;
pub mod history;
pub mod infra;
pub mod util;
