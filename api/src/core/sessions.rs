//! Per-session conversation state and the `X-Session-Id` extractor.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::sync::Mutex;
use tracing::debug;
use vision_chat::ConversationState;

use crate::error_handler::AppError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";
const MAX_SESSION_ID_LEN: usize = 128;

pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

/// Conversation handle; the mutex serializes a session's read-modify-write.
pub type SharedConversation = Arc<Mutex<ConversationState>>;

struct SessionEntry {
    conversation: SharedConversation,
    last_used: Instant,
    /// Monotonic use counter; orders entries for least-recently-used eviction.
    seq: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    next_seq: u64,
}

/// Bounded set of live conversations.
///
/// - at most `max_sessions` entries; creating one more evicts the least
///   recently used
/// - entries idle for `idle_ttl` or longer are dropped when a new session is created
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    /// Returns the conversation for `id`, creating an empty one on first use.
    pub async fn session(&self, id: &str) -> SharedConversation {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        sessions.next_seq += 1;
        let seq = sessions.next_seq;

        if let Some(entry) = sessions.entries.get_mut(id) {
            entry.last_used = now;
            entry.seq = seq;
            return entry.conversation.clone();
        }

        let idle_ttl = self.idle_ttl;
        let before = sessions.entries.len();
        sessions
            .entries
            .retain(|_, entry| now.duration_since(entry.last_used) < idle_ttl);
        let expired = before - sessions.entries.len();
        if expired > 0 {
            debug!(expired, "idle conversation sessions dropped");
        }

        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(key, _)| key.clone());
            let Some(oldest) = oldest else { break };
            sessions.entries.remove(&oldest);
            debug!(session = %oldest, "least recently used session evicted");
        }

        debug!(session = id, "new conversation session");
        let conversation = Arc::new(Mutex::new(ConversationState::new()));
        sessions.entries.insert(
            id.to_string(),
            SessionEntry {
                conversation: conversation.clone(),
                last_used: now,
                seq,
            },
        );
        conversation
    }

    /// Forgets `id` entirely. Unknown ids are a no-op.
    ///
    /// A request still holding the conversation keeps working on its own copy;
    /// the next request for `id` starts from an empty state.
    pub async fn reset(&self, id: &str) {
        if self.sessions.lock().await.entries.remove(id).is_some() {
            debug!(session = id, "conversation session reset");
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }
}

/// Session id from the `X-Session-Id` header, or [`DEFAULT_SESSION`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(SESSION_HEADER) else {
            return Ok(SessionId(DEFAULT_SESSION.to_string()));
        };

        let raw = value
            .to_str()
            .map_err(|_| AppError::BadRequest("X-Session-Id must be ASCII".into()))?
            .trim();

        if raw.is_empty() {
            return Ok(SessionId(DEFAULT_SESSION.to_string()));
        }
        if raw.len() > MAX_SESSION_ID_LEN
            || !raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(AppError::BadRequest(
                "X-Session-Id may only contain letters, digits, '-', '_' or '.' (max 128)".into(),
            ));
        }
        Ok(SessionId(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_isolated() {
        let registry = SessionRegistry::default();
        registry
            .session("a")
            .await
            .lock()
            .await
            .set_context("I can see a dog in the image.");

        assert!(registry.session("b").await.lock().await.image_context().is_none());
        assert!(registry.session("a").await.lock().await.image_context().is_some());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn reset_clears_only_the_target() {
        let registry = SessionRegistry::default();
        for id in ["a", "b"] {
            registry.session(id).await.lock().await.set_context("ctx");
        }

        registry.reset("a").await;
        registry.reset("missing").await;

        assert!(registry.session("a").await.lock().await.image_context().is_none());
        assert_eq!(registry.session("b").await.lock().await.image_context(), Some("ctx"));
    }

    #[tokio::test]
    async fn reset_removes_the_entry() {
        let registry = SessionRegistry::default();
        for i in 0..10_000 {
            let id = format!("client-{i}");
            registry.session(&id).await;
            registry.reset(&id).await;
        }
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn distinct_ids_never_exceed_the_cap() {
        let registry = SessionRegistry::new(16, DEFAULT_SESSION_IDLE);
        for i in 0..10_000 {
            registry.session(&format!("client-{i}")).await;
        }
        assert_eq!(registry.len().await, 16);
    }

    #[tokio::test]
    async fn least_recently_used_is_evicted_first() {
        let registry = SessionRegistry::new(2, DEFAULT_SESSION_IDLE);
        registry.session("a").await.lock().await.set_context("ctx a");
        registry.session("b").await.lock().await.set_context("ctx b");
        // Touch `a` so `b` becomes the oldest.
        registry.session("a").await;
        registry.session("c").await;

        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.session("a").await.lock().await.image_context(), Some("ctx a"));
        // `b` was evicted and comes back empty.
        assert!(registry.session("b").await.lock().await.image_context().is_none());
    }

    #[tokio::test]
    async fn idle_sessions_expire_when_a_new_one_is_created() {
        let registry = SessionRegistry::new(DEFAULT_MAX_SESSIONS, Duration::ZERO);
        registry.session("a").await;
        registry.session("b").await;
        registry.session("c").await;
        assert_eq!(registry.len().await, 1);
    }
}
