// src/cli/chat.rs — Interactive REPL

use std::time::Duration;

use super::picker::{self, resolve_session_ref};
use super::render;
use crate::conversation::ConversationController;
use crate::history::{ChatMode, ChatModel};
use crate::infra::errors::ChatError;
use crate::infra::prefs::{PreferenceStore, Preferences};

/// How long to wait for pending title generation on exit.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// REPL-local view state.
struct ChatState {
    prefs: Preferences,
}

/// Run the interactive chat REPL on an initialized controller.
pub async fn run_chat(
    controller: &mut ConversationController,
    prefs_store: &PreferenceStore,
    prefs: Preferences,
) -> anyhow::Result<()> {
    let selection = controller.selection();
    eprintln!(
        "support-chat v{} | {} · {} | {} session(s)\n",
        env!("CARGO_PKG_VERSION"),
        selection.mode.label(),
        selection.model.label(),
        controller.sessions().len(),
    );

    let mut state = ChatState { prefs };
    if state.prefs.sidebar_open {
        render::print_sessions(controller.sessions(), controller.current_session_id());
        eprintln!();
    }
    render::print_transcript(controller.transcript());

    while let Some(input) = read_input() {
        controller.apply_title_results();
        let trimmed = input.trim();

        // Handle quit
        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }

        // Handle slash commands
        if trimmed.starts_with('/') {
            handle_slash_command(trimmed, controller, prefs_store, &mut state).await;
            continue;
        }

        // Empty input
        if trimmed.is_empty() {
            continue;
        }

        eprintln!("  ...");
        match controller.send_message(trimmed).await {
            Some(reply) => println!("\n{}\n", render::format_message(&reply)),
            None => eprintln!("  Not sent (no active chat or a reply is still pending)."),
        }
    }

    if tokio::time::timeout(SETTLE_TIMEOUT, controller.settle())
        .await
        .is_err()
    {
        tracing::debug!("Gave up waiting for title generation");
    }
    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

fn after_list_change(controller: &ConversationController, state: &ChatState) {
    if state.prefs.sidebar_open {
        render::print_sessions(controller.sessions(), controller.current_session_id());
    }
}

async fn handle_slash_command(
    input: &str,
    controller: &mut ConversationController,
    prefs_store: &PreferenceStore,
    state: &mut ChatState,
) {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/new" => {
            controller.create_new_chat().await;
            eprintln!("  Started a new chat.");
            after_list_change(controller, state);
        }

        "/sessions" => {
            controller.refresh_sessions().await;
            render::print_sessions(controller.sessions(), controller.current_session_id());
        }

        "/switch" => {
            let target = if arg.is_empty() {
                picker::pick_session(controller.sessions())
            } else {
                resolve_session_ref(controller.sessions(), arg).map(|s| s.id.clone())
            };
            let Some(target) = target else {
                eprintln!("  No matching chat. Usage: /switch <number|id>");
                return;
            };
            if !controller.select_session(&target).await {
                eprintln!("  That chat is no longer available.");
            }
            after_list_change(controller, state);
            render::print_transcript(controller.transcript());
        }

        "/rename" => {
            let Some(id) = controller.current_session_id().map(String::from) else {
                eprintln!("  {}.", ChatError::NoActiveSession);
                return;
            };
            if controller.rename_session(&id, arg).await {
                let title = controller
                    .current_session()
                    .map(|s| s.display_title().to_string())
                    .unwrap_or_default();
                eprintln!("  Renamed to \"{title}\"");
                after_list_change(controller, state);
            } else {
                eprintln!("  Could not rename this chat.");
            }
        }

        "/delete" => {
            let target = if arg.is_empty() {
                controller.current_session_id().map(String::from)
            } else {
                resolve_session_ref(controller.sessions(), arg).map(|s| s.id.clone())
            };
            let Some(target) = target else {
                eprintln!("  No matching chat. Usage: /delete [number|id]");
                return;
            };
            let confirmed = inquire::Confirm::new("Delete this chat?")
                .with_default(false)
                .prompt()
                .unwrap_or(false);
            if !confirmed {
                eprintln!("  Cancelled.");
                return;
            }
            if controller.delete_session(&target).await {
                eprintln!("  Deleted.");
            } else {
                eprintln!("  Could not delete that chat.");
            }
            after_list_change(controller, state);
        }

        "/model" => {
            let current = controller.selection().model;
            let chosen = if arg.is_empty() {
                picker::pick_model(current)
            } else {
                match arg.parse::<ChatModel>() {
                    Ok(m) => Some(m),
                    Err(e) => {
                        eprintln!("  {e}");
                        None
                    }
                }
            };
            if let Some(model) = chosen {
                controller.set_model(model).await;
                eprintln!("  Model: {}", model.label());
            }
        }

        "/mode" => {
            let current = controller.selection().mode;
            let chosen = if arg.is_empty() {
                picker::pick_mode(current)
            } else {
                match arg.parse::<ChatMode>() {
                    Ok(m) => Some(m),
                    Err(e) => {
                        eprintln!("  {e}");
                        None
                    }
                }
            };
            if let Some(mode) = chosen {
                controller.set_mode(mode).await;
                state.prefs = prefs_store.update(|p| p.mode = Some(mode));
                eprintln!("  Mode: {}", mode.label());
            }
        }

        "/sidebar" => {
            state.prefs = prefs_store.update(|p| p.sidebar_open = !p.sidebar_open);
            if state.prefs.sidebar_open {
                eprintln!("  Session list shown after changes.");
                render::print_sessions(controller.sessions(), controller.current_session_id());
            } else {
                eprintln!("  Session list hidden.");
            }
        }

        "/history" => {
            render::print_transcript(controller.transcript());
        }

        "/status" => {
            let selection = controller.selection();
            let title = controller
                .current_session()
                .map(|s| s.display_title().to_string())
                .unwrap_or_else(|| "(none)".into());
            eprintln!("  Chat: {title}");
            if let Some(id) = controller.current_session_id() {
                eprintln!("  Session id: {id}");
            }
            eprintln!("  Mode: {} | Model: {}", selection.mode.label(), selection.model.label());
            eprintln!("  Visitor: {}", controller.user_id());
            eprintln!("  Sessions: {}", controller.sessions().len());
        }

        "/help" => {
            eprintln!("Slash commands:");
            eprintln!("  /new               Start a new chat");
            eprintln!("  /sessions          List your chats");
            eprintln!("  /switch [n|id]     Open another chat (picker if omitted)");
            eprintln!("  /rename <title>    Rename the current chat");
            eprintln!("  /delete [n|id]     Delete a chat (current if omitted)");
            eprintln!("  /model [name]      Show or switch model (gemini, gpt-3.5-turbo, gpt-4)");
            eprintln!("  /mode [name]       Show or switch mode (mcp, gemini)");
            eprintln!("  /sidebar           Toggle the session list after changes");
            eprintln!("  /history           Reprint the current transcript");
            eprintln!("  /status            Show current chat and settings");
            eprintln!("  /help              Show this help");
            eprintln!("  /quit, quit, exit  End session");
        }

        _ => {
            eprintln!("Unknown command: {}. Type /help for commands.", cmd);
        }
    }
}
