// src/conversation/mod.rs — Conversation controller
//
// Keeps the local view of a visitor's chats (session list, active session,
// transcript, selected model/mode) consistent with the remote history store.
// Local state is updated first; remote writes are best-effort and never
// retried. Failures are logged and turned into fallbacks, never surfaced as
// raw errors.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use uuid::Uuid;

use crate::assistant::{history_from, prompt, AskRequest, Assistant};
use crate::history::{
    normalize_title, ChatConfig, ChatMode, ChatModel, ChatSession, Message, SessionStore,
};
use crate::infra::config::{ChatSettings, ConfigSync};
use crate::infra::errors::ChatError;
use crate::infra::identity::IdentityState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    FetchingHistory,
    Ready,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub system_instruction: String,
    pub config_sync: ConfigSync,
    pub apology_message: String,
}

impl ControllerSettings {
    pub fn from_config(chat: &ChatSettings) -> Self {
        Self {
            system_instruction: prompt::resolve(
                chat.system_instruction.as_deref(),
                prompt::SUPPORT_INSTRUCTION,
            ),
            config_sync: chat.config_sync,
            apology_message: chat.apology_message.clone(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&ChatSettings::default())
    }
}

/// Holds the controller's sending flag; dropping it (on completion or
/// when a pending reply is abandoned) clears the flag.
struct SendGuard(Arc<AtomicBool>);

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An inference call that has been issued but not yet applied.
///
/// Obtained from [`ConversationController::prepare_send`] and normally
/// handed back through [`ConversationController::complete_send`]. Dropping
/// it instead discards the reply and re-enables sending.
pub struct PendingReply {
    guard: SendGuard,
    token: u64,
    session_id: String,
    mode: ChatMode,
    request: AskRequest,
    assistant: Arc<dyn Assistant>,
}

pub struct ResolvedReply {
    guard: SendGuard,
    token: u64,
    session_id: String,
    result: Result<String, ChatError>,
}

impl PendingReply {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn request(&self) -> &AskRequest {
        &self.request
    }

    pub async fn resolve(self) -> ResolvedReply {
        let result = self.assistant.ask(self.mode, self.request).await;
        ResolvedReply {
            guard: self.guard,
            token: self.token,
            session_id: self.session_id,
            result,
        }
    }
}

type TitleResult = Option<(String, String)>;

pub struct ConversationController {
    store: Arc<dyn SessionStore>,
    assistant: Arc<dyn Assistant>,
    identity: IdentityState,
    settings: ControllerSettings,
    phase: Phase,
    /// Sidebar cache, most-recent-first.
    sessions: Vec<ChatSession>,
    current_session_id: Option<String>,
    messages: Vec<Message>,
    selection: ChatConfig,
    /// Last config known to be written for each session.
    persisted_configs: HashMap<String, ChatConfig>,
    sending: Arc<AtomicBool>,
    /// Bumped on every session activation; replies carrying an older token are stale.
    activation: u64,
    title_tasks: JoinSet<TitleResult>,
}

impl ConversationController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        assistant: Arc<dyn Assistant>,
        identity: IdentityState,
        settings: ControllerSettings,
        selection: ChatConfig,
    ) -> Result<Self, ChatError> {
        if !identity.is_ready() {
            return Err(ChatError::IdentityNotLoaded);
        }
        Ok(Self {
            store,
            assistant,
            identity,
            settings,
            phase: Phase::Uninitialized,
            sessions: Vec::new(),
            current_session_id: None,
            messages: Vec::new(),
            selection,
            persisted_configs: HashMap::new(),
            sending: Arc::new(AtomicBool::new(false)),
            activation: 0,
            title_tasks: JoinSet::new(),
        })
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        let id = self.current_session_id.as_deref()?;
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Raw message list of the active session, config markers included.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages to show the visitor.
    pub fn transcript(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_config_marker())
    }

    pub fn selection(&self) -> ChatConfig {
        self.selection
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Load the visitor's sessions and activate the most recent one, or
    /// start a new chat when there is none (or the store is unreachable).
    ///
    /// A locally saved mode preference wins over the session's stored mode.
    pub async fn initialize(&mut self, mode_preference: Option<ChatMode>) {
        self.phase = Phase::FetchingHistory;
        if let Some(mode) = mode_preference {
            self.selection.mode = mode;
        }

        match self.store.list_sessions(&self.identity.user_id).await {
            Ok(sessions) if !sessions.is_empty() => {
                self.sessions = sessions;
                let first = self.sessions[0].clone();
                self.selection = ChatConfig {
                    model: first.config.model,
                    mode: mode_preference.unwrap_or(first.config.mode),
                };
                self.activate(&first);
                self.sync_config().await;
            }
            Ok(_) => {
                tracing::debug!("No stored sessions; starting a new chat");
                self.create_new_chat().await;
            }
            Err(e) => {
                tracing::warn!("Failed to load chat history: {e}");
                self.create_new_chat().await;
            }
        }

        self.phase = Phase::Ready;
    }

    /// Start an empty conversation. Local state switches immediately; the
    /// remote session is created afterwards. Returns the new session id.
    pub async fn create_new_chat(&mut self) -> String {
        self.apply_title_results();

        let session_id = Uuid::new_v4().to_string();
        self.activation += 1;
        self.current_session_id = Some(session_id.clone());
        self.messages.clear();

        let created = match self
            .store
            .create_session(&self.identity.user_id, &session_id, None, self.selection)
            .await
        {
            Ok(session) => {
                self.persisted_configs
                    .insert(session_id.clone(), session.config);
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Failed to create session {session_id}: {e}");
                None
            }
        };

        self.refresh_sessions().await;
        if let Some(session) = created {
            self.upsert(session);
        }
        session_id
    }

    /// Switch to another session. Returns whether `session_id` is now active.
    ///
    /// An id missing from the cached list (or deleted server-side) means the
    /// cache is stale: the list is refetched and its first entry, or a new
    /// chat, becomes active instead.
    pub async fn select_session(&mut self, session_id: &str) -> bool {
        self.apply_title_results();

        if self.current_session_id.as_deref() == Some(session_id) {
            return true;
        }

        if !self.sessions.iter().any(|s| s.id == session_id) {
            let stale = ChatError::StaleCache {
                session_id: session_id.to_string(),
            };
            tracing::debug!("{stale}; refreshing");
            self.recover_stale_selection().await;
            return self.current_session_id.as_deref() == Some(session_id);
        }

        match self
            .store
            .get_session(&self.identity.user_id, session_id)
            .await
        {
            Ok(session) => {
                self.activate(&session);
                self.upsert(session);
                self.sync_config().await;
                true
            }
            Err(e) if e.is_missing_session() => {
                tracing::warn!("Session {session_id} disappeared: {e}");
                self.sessions.retain(|s| s.id != session_id);
                self.persisted_configs.remove(session_id);
                self.recover_stale_selection().await;
                false
            }
            Err(e) => {
                tracing::warn!("Failed to load session {session_id}: {e}");
                false
            }
        }
    }

    /// Delete a session. Returns whether it is gone from the store; one the
    /// store no longer knows counts as deleted.
    pub async fn delete_session(&mut self, session_id: &str) -> bool {
        self.apply_title_results();

        let deleted = match self
            .store
            .delete_session(&self.identity.user_id, session_id)
            .await
        {
            Ok(()) => true,
            Err(e) if e.is_missing_session() => {
                tracing::debug!("Session {session_id} was already gone: {e}");
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete session {session_id}: {e}");
                false
            }
        };
        if deleted {
            self.sessions.retain(|s| s.id != session_id);
            self.persisted_configs.remove(session_id);
        }

        if deleted && self.current_session_id.as_deref() == Some(session_id) {
            // create_new_chat refreshes the list itself
            self.create_new_chat().await;
        } else {
            self.refresh_sessions().await;
        }
        deleted
    }

    pub async fn rename_session(&mut self, session_id: &str, title: &str) -> bool {
        self.apply_title_results();

        match self
            .store
            .rename_session(&self.identity.user_id, session_id, normalize_title(title))
            .await
        {
            Ok(session) => {
                self.upsert(session);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to rename session {session_id}: {e}");
                false
            }
        }
    }

    /// Replace the cached session list with the store's. Returns false (and
    /// keeps the old list) when the store is unreachable.
    pub async fn refresh_sessions(&mut self) -> bool {
        match self.store.list_sessions(&self.identity.user_id).await {
            Ok(sessions) => {
                self.sessions = sessions;
                self.overlay_known_configs();
                true
            }
            Err(e) => {
                tracing::warn!("Failed to refresh session list: {e}");
                false
            }
        }
    }

    // ── Model / mode selection ──────────────────────────────────

    pub async fn set_model(&mut self, model: ChatModel) {
        self.selection.model = model;
        self.sync_config().await;
    }

    pub async fn set_mode(&mut self, mode: ChatMode) {
        self.selection.mode = mode;
        self.sync_config().await;
    }

    // ── Sending ─────────────────────────────────────────────────

    /// Send a visitor message and wait for the reply. Returns the reply
    /// (answer or apology), or `None` when the send was skipped.
    pub async fn send_message(&mut self, text: &str) -> Option<Message> {
        let pending = self.prepare_send(text).await?;
        let resolved = pending.resolve().await;
        Some(self.complete_send(resolved).await)
    }

    /// First half of a send: append and persist the visitor message, start
    /// title generation for a session's first message, and build the
    /// inference request.
    ///
    /// Skipped for blank text, without an active session, or while another
    /// send is in flight.
    pub async fn prepare_send(&mut self, text: &str) -> Option<PendingReply> {
        self.apply_title_results();

        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.is_sending() {
            tracing::debug!("Send already in flight; ignoring");
            return None;
        }
        let session_id = self.current_session_id.clone()?;
        self.sending.store(true, Ordering::Release);
        let guard = SendGuard(Arc::clone(&self.sending));

        let is_first = !self.messages.iter().any(|m| m.is_user);
        let history = history_from(&self.messages);

        let user_message = Message::user(text);
        self.messages.push(user_message.clone());
        self.persist_message(&session_id, &user_message).await;

        if is_first {
            self.spawn_title_generation(&session_id, text);
        }

        Some(PendingReply {
            guard,
            token: self.activation,
            session_id: session_id.clone(),
            mode: self.selection.mode,
            request: AskRequest {
                session_id,
                message: text.to_string(),
                system_instruction: Some(self.settings.system_instruction.clone()),
                history,
            },
            assistant: Arc::clone(&self.assistant),
        })
    }

    /// Second half of a send. The reply (or the apology on failure) is always
    /// persisted to the session it was asked from, but only appended to the
    /// local transcript if that session is still the active one.
    pub async fn complete_send(&mut self, reply: ResolvedReply) -> Message {
        drop(reply.guard);

        let message = match reply.result {
            Ok(answer) => Message::bot(answer),
            Err(e) => {
                tracing::warn!("Assistant request failed: {e}");
                Message::bot(self.settings.apology_message.clone())
            }
        };

        if reply.token == self.activation
            && self.current_session_id.as_deref() == Some(reply.session_id.as_str())
        {
            self.messages.push(message.clone());
        } else {
            tracing::debug!(
                "Reply for session {} arrived after a switch; not shown",
                reply.session_id
            );
        }

        self.persist_message(&reply.session_id, &message).await;
        message
    }

    // ── Title generation ────────────────────────────────────────

    /// Apply titles from finished generation tasks without waiting.
    pub fn apply_title_results(&mut self) {
        while let Some(joined) = self.title_tasks.try_join_next() {
            self.apply_title(joined);
        }
    }

    /// Wait for all outstanding title generation and apply the results.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.title_tasks.join_next().await {
            self.apply_title(joined);
        }
    }

    fn spawn_title_generation(&mut self, session_id: &str, first_message: &str) {
        let store = Arc::clone(&self.store);
        let user_id = self.identity.user_id.clone();
        let session_id = session_id.to_string();
        let first_message = first_message.to_string();

        self.title_tasks.spawn(async move {
            match store
                .generate_title(&user_id, &session_id, &first_message)
                .await
            {
                Ok(title) => Some((session_id, title)),
                Err(e) => {
                    tracing::warn!("Title generation failed for {session_id}: {e}");
                    None
                }
            }
        });
    }

    fn apply_title(&mut self, joined: Result<TitleResult, JoinError>) {
        match joined {
            Ok(Some((session_id, title))) => {
                if let Some(s) = self.sessions.iter_mut().find(|s| s.id == session_id) {
                    s.title = Some(title);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Title task aborted: {e}"),
        }
    }

    // ── Internals ───────────────────────────────────────────────

    fn activate(&mut self, session: &ChatSession) {
        self.activation += 1;
        self.current_session_id = Some(session.id.clone());
        self.messages = session.messages.clone();
        match self.settings.config_sync {
            ConfigSync::Direct => {
                self.persisted_configs
                    .insert(session.id.clone(), session.config);
            }
            // marker-only stores keep reporting the config they were created with
            ConfigSync::Sentinel => {
                self.persisted_configs
                    .entry(session.id.clone())
                    .or_insert(session.config);
            }
        }
    }

    async fn recover_stale_selection(&mut self) {
        if !self.refresh_sessions().await {
            return;
        }
        match self.sessions.first().cloned() {
            Some(first) => {
                self.activate(&first);
                self.sync_config().await;
            }
            None => {
                self.create_new_chat().await;
            }
        }
    }

    /// Write the current selection to the active session if it differs from
    /// what was last persisted. The active selection always wins over the
    /// session's stored config.
    async fn sync_config(&mut self) {
        let Some(session_id) = self.current_session_id.clone() else {
            return;
        };
        let config = self.selection;
        if self.persisted_configs.get(&session_id) == Some(&config) {
            return;
        }

        // Nothing is recorded on failure, so the next switch into this
        // session retries the write.
        let written = match self.settings.config_sync {
            ConfigSync::Direct => self
                .store
                .update_config(&self.identity.user_id, &session_id, config)
                .await
                .map_err(|e| tracing::warn!("Failed to update config of {session_id}: {e}")),
            ConfigSync::Sentinel => {
                let marker = Message::config_marker();
                let result = self
                    .store
                    .append_message(&self.identity.user_id, &session_id, &marker)
                    .await
                    .map_err(|e| {
                        tracing::warn!("Failed to record config change for {session_id}: {e}")
                    });
                if result.is_ok() {
                    self.messages.push(marker);
                }
                result
            }
        };

        if let Ok(session) = written {
            self.persisted_configs.insert(session_id, config);
            self.upsert(session);
        }
    }

    async fn persist_message(&mut self, session_id: &str, message: &Message) {
        match self
            .store
            .append_message(&self.identity.user_id, session_id, message)
            .await
        {
            Ok(session) => self.upsert(session),
            Err(e) => tracing::warn!("Failed to save message to {session_id}: {e}"),
        }
    }

    /// Merge a session returned by a write into the cache, keeping
    /// most-recent-first order.
    fn upsert(&mut self, session: ChatSession) {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session,
            None => self.sessions.push(session),
        }
        self.sessions.sort_by(|a, b| b.updated.cmp(&a.updated));
        self.overlay_known_configs();
    }

    /// Stores that take config changes as marker messages may still report
    /// the old config; what this client last wrote is authoritative.
    fn overlay_known_configs(&mut self) {
        for s in &mut self.sessions {
            if let Some(config) = self.persisted_configs.get(&s.id) {
                s.config = *config;
            }
        }
    }
}
