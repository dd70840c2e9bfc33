// src/cli/sessions.rs — Non-interactive session management

use anyhow::anyhow;

use super::picker::resolve_session_ref;
use super::render;
use crate::history::{normalize_title, ChatSession, SessionStore};
use crate::infra::identity::IdentityState;

async fn find_session(
    store: &dyn SessionStore,
    identity: &IdentityState,
    id: &str,
) -> anyhow::Result<ChatSession> {
    let sessions = store.list_sessions(&identity.user_id).await?;
    resolve_session_ref(&sessions, id)
        .cloned()
        .ok_or_else(|| anyhow!("No session matches '{id}'. Run `support-chat sessions` to list them."))
}

pub async fn run_list(store: &dyn SessionStore, identity: &IdentityState) -> anyhow::Result<()> {
    let sessions = store.list_sessions(&identity.user_id).await?;
    render::print_sessions(&sessions, None);
    Ok(())
}

pub async fn run_show(
    store: &dyn SessionStore,
    identity: &IdentityState,
    id: &str,
) -> anyhow::Result<()> {
    let summary = find_session(store, identity, id).await?;
    let session = store.get_session(&identity.user_id, &summary.id).await?;
    eprintln!(
        "{} | {} · {} | {}\n",
        session.display_title(),
        session.config.mode,
        session.config.model,
        session.id
    );
    render::print_transcript(session.visible_messages());
    Ok(())
}

pub async fn run_rename(
    store: &dyn SessionStore,
    identity: &IdentityState,
    id: &str,
    title: &str,
) -> anyhow::Result<()> {
    let session = find_session(store, identity, id).await?;
    let renamed = store
        .rename_session(&identity.user_id, &session.id, normalize_title(title))
        .await?;
    eprintln!("  Renamed to \"{}\"", renamed.display_title());
    Ok(())
}

pub async fn run_delete(
    store: &dyn SessionStore,
    identity: &IdentityState,
    id: &str,
) -> anyhow::Result<()> {
    let session = find_session(store, identity, id).await?;
    store.delete_session(&identity.user_id, &session.id).await?;
    eprintln!("  Deleted \"{}\"", session.display_title());
    Ok(())
}
