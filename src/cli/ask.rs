// src/cli/ask.rs — Stateless single question
//
// Each run uses a fresh session id and nothing is written to the history
// service.

use uuid::Uuid;

use crate::assistant::{prompt, AskRequest, Assistant};
use crate::history::ChatMode;
use crate::infra::config::Config;

/// Build the question from CLI words or stdin.
pub fn read_question(words: &[String], from_stdin: bool) -> anyhow::Result<String> {
    let question = if from_stdin {
        std::io::read_to_string(std::io::stdin())?
    } else {
        words.join(" ")
    };
    let question = question.trim().to_string();
    if question.is_empty() {
        anyhow::bail!("No question given. Usage: support-chat ask <question>");
    }
    Ok(question)
}

/// Ask once. Failures print the apology text, like the chat does.
pub async fn run_ask(
    assistant: &dyn Assistant,
    config: &Config,
    mode: ChatMode,
    question: &str,
) -> anyhow::Result<()> {
    let request = AskRequest {
        session_id: Uuid::new_v4().to_string(),
        message: question.to_string(),
        system_instruction: Some(prompt::resolve(
            config.chat.system_instruction.as_deref(),
            prompt::QUICK_INSTRUCTION,
        )),
        history: Vec::new(),
    };

    match assistant.ask(mode, request).await {
        Ok(answer) => println!("{answer}"),
        Err(e) => {
            tracing::warn!("Assistant request failed: {e}");
            println!("{}", config.chat.apology_message);
        }
    }
    Ok(())
}
