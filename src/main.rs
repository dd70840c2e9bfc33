// src/main.rs — support-chat entry point

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use support_chat::assistant::{Assistant, HttpAssistant};
use support_chat::cli::{self, Cli, Commands};
use support_chat::conversation::{ControllerSettings, ConversationController};
use support_chat::history::{ChatConfig, HttpSessionStore, SessionStore};
use support_chat::infra::config::Config;
use support_chat::infra::identity::IdentityResolver;
use support_chat::infra::logger;
use support_chat::infra::paths;
use support_chat::infra::prefs::PreferenceStore;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    if let Some(ref url) = cli.backend_url {
        config.backend.base_url = url.clone();
    }

    let timeout = Duration::from_secs(config.backend.timeout_seconds);
    let prefs_store = PreferenceStore::new(paths::prefs_path());
    let prefs = prefs_store.load();
    let resolver = IdentityResolver::new(paths::identity_path());

    // Commands that don't need the visitor identity
    match &cli.command {
        Some(Commands::Identity { reset }) => {
            if *reset {
                resolver.clear()?;
            }
            let identity = resolver.resolve(!config.backend.is_local());
            println!("{}", identity.user_id);
            if let Some(stored) = resolver.stored() {
                eprintln!("  expires {}", stored.expires_at.format("%Y-%m-%d"));
            }
            return Ok(());
        }
        Some(Commands::Ask { question, stdin }) => {
            let question = cli::ask::read_question(question, *stdin)?;
            let assistant = HttpAssistant::new(&config.backend.base_url, timeout)?;
            let mode = cli.mode.or(prefs.mode).unwrap_or(config.chat.default_mode);
            return cli::ask::run_ask(&assistant, &config, mode, &question).await;
        }
        _ => {}
    }

    // Everything below is scoped to the visitor
    let identity = resolver.resolve(!config.backend.is_local());
    tracing::debug!("Visitor {}", identity.user_id);

    let store: Arc<dyn SessionStore> =
        Arc::new(HttpSessionStore::new(&config.backend.base_url, timeout)?);

    match cli.command {
        Some(Commands::Sessions) => cli::sessions::run_list(store.as_ref(), &identity).await,
        Some(Commands::Show { ref id }) => {
            cli::sessions::run_show(store.as_ref(), &identity, id).await
        }
        Some(Commands::Rename { ref id, ref title }) => {
            cli::sessions::run_rename(store.as_ref(), &identity, id, &title.join(" ")).await
        }
        Some(Commands::Delete { ref id }) => {
            cli::sessions::run_delete(store.as_ref(), &identity, id).await
        }
        Some(Commands::Chat { ref session }) => {
            let session = session.clone();
            run_interactive(&cli, &config, store, identity, &prefs_store, session).await
        }
        _ => run_interactive(&cli, &config, store, identity, &prefs_store, None).await,
    }
}

async fn run_interactive(
    cli: &Cli,
    config: &Config,
    store: Arc<dyn SessionStore>,
    identity: support_chat::infra::identity::IdentityState,
    prefs_store: &PreferenceStore,
    open_session: Option<String>,
) -> anyhow::Result<()> {
    let prefs = prefs_store.load();
    let timeout = Duration::from_secs(config.backend.timeout_seconds);
    let assistant: Arc<dyn Assistant> =
        Arc::new(HttpAssistant::new(&config.backend.base_url, timeout)?);

    // Mode: CLI flag > saved preference > config default
    let mode_preference = cli.mode.or(prefs.mode);
    let selection = ChatConfig {
        model: cli.model.unwrap_or(config.chat.default_model),
        mode: mode_preference.unwrap_or(config.chat.default_mode),
    };

    let mut controller = ConversationController::new(
        store,
        assistant,
        identity,
        ControllerSettings::from_config(&config.chat),
        selection,
    )?;
    controller.initialize(mode_preference).await;

    if let Some(model) = cli.model {
        controller.set_model(model).await;
    }
    if let Some(ref id) = open_session {
        let target = cli::picker::resolve_session_ref(controller.sessions(), id)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| id.clone());
        if !controller.select_session(&target).await {
            eprintln!("  Session '{id}' not found; opened the most recent chat instead.");
        }
    }

    cli::chat::run_chat(&mut controller, prefs_store, prefs).await
}
