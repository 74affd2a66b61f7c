use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::http::{header, HeaderMap, HeaderValue};
use tokio::sync::RwLock;
use tracing::debug;

/// Flash messages and old input waiting for the next page render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PageState {
    pub(crate) flash: BTreeMap<String, String>,
    pub(crate) old_input: Vec<(String, String)>,
}

impl PageState {
    pub(crate) fn is_empty(&self) -> bool {
        self.flash.is_empty() && self.old_input.is_empty()
    }
}

/// The caller's session id, and whether the response must hand it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionHandle {
    pub(crate) id: String,
    pub(crate) is_new: bool,
}

impl SessionHandle {
    pub(crate) fn resolve(headers: &HeaderMap, cookie_name: &str) -> Self {
        match cookie_value(headers, cookie_name) {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: uuid::Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    pub(crate) fn set_cookie_header(&self, cookie_name: &str) -> Option<HeaderValue> {
        if !self.is_new {
            return None;
        }
        HeaderValue::from_str(&format!(
            "{cookie_name}={}; Path=/; HttpOnly; SameSite=Lax",
            self.id
        ))
        .ok()
    }
}

/// How long flashed state waits for the page render that reads it.
pub(crate) const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct PendingPage {
    state: PageState,
    stored_at: Instant,
}

/// Server-side session data, keyed by session id.
///
/// Only pending page state is kept: an entry is dropped as soon as a page
/// render takes it, or once it is older than the store's ttl. Stale entries
/// are swept on every write.
#[derive(Clone)]
pub(crate) struct SessionStore {
    inner: Arc<RwLock<HashMap<String, PendingPage>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_PENDING_TTL)
    }
}

impl SessionStore {
    pub(crate) fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
        }
    }

    pub(crate) async fn flash(&self, session_id: &str, key: &str, value: impl Into<String>) {
        let mut sessions = self.inner.write().await;
        self.evict_stale(&mut sessions);
        self.entry(&mut sessions, session_id)
            .flash
            .insert(key.to_string(), value.into());
    }

    pub(crate) async fn remember_input(&self, session_id: &str, fields: Vec<(String, String)>) {
        let mut sessions = self.inner.write().await;
        self.evict_stale(&mut sessions);
        self.entry(&mut sessions, session_id).old_input = fields;
    }

    /// Removes and returns everything flashed for this session.
    pub(crate) async fn take_page_state(&self, session_id: &str) -> PageState {
        let mut sessions = self.inner.write().await;
        sessions
            .remove(session_id)
            .filter(|pending| pending.stored_at.elapsed() < self.ttl)
            .map(|pending| pending.state)
            .unwrap_or_default()
    }

    /// Puts back state taken for a render that failed. Anything flashed in
    /// the meantime wins.
    pub(crate) async fn restore_page_state(&self, session_id: &str, state: PageState) {
        if state.is_empty() {
            return;
        }
        let mut sessions = self.inner.write().await;
        self.evict_stale(&mut sessions);
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| PendingPage {
                state,
                stored_at: Instant::now(),
            });
    }

    fn entry<'a>(
        &self,
        sessions: &'a mut HashMap<String, PendingPage>,
        session_id: &str,
    ) -> &'a mut PageState {
        let pending = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| PendingPage {
                state: PageState::default(),
                stored_at: Instant::now(),
            });
        pending.stored_at = Instant::now();
        &mut pending.state
    }

    fn evict_stale(&self, sessions: &mut HashMap<String, PendingPage>) {
        let before = sessions.len();
        sessions.retain(|_, pending| pending.stored_at.elapsed() < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "dropped stale session state");
        }
    }

    #[cfg(test)]
    pub(crate) async fn pending(&self, session_id: &str) -> Option<PageState> {
        self.inner
            .read()
            .await
            .get(session_id)
            .map(|pending| pending.state.clone())
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
