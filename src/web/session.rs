use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "sid";

/// Per-browser state: the access token once OAuth completes, and the CSRF
/// nonce while the authorize round-trip is in flight.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<String>,
    pub oauth_state: Option<String>,
}

/// In-memory session map. Sessions are independent per user; nothing is
/// shared across them but this store.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> String {
        let id = random_id();
        self.inner
            .lock()
            .await
            .insert(id.clone(), Session::default());
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.inner.lock().await.get(id).cloned()
    }

    pub async fn set_oauth_state(&self, id: &str, state: String) {
        if let Some(session) = self.inner.lock().await.get_mut(id) {
            session.oauth_state = Some(state);
        }
    }

    /// Store the exchanged token and clear the spent nonce.
    pub async fn set_access_token(&self, id: &str, token: String) {
        if let Some(session) = self.inner.lock().await.get_mut(id) {
            session.access_token = Some(token);
            session.oauth_state = None;
        }
    }
}

pub fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
