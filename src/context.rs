use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::ApiClient;
use crate::error::ConsoleError;
use crate::storage::{self, ScopeStore, Session, SessionStore};

/// Application context tying the persistent stores and the HTTP client
/// together. Built once at startup from persisted state and passed to the
/// components that need it; session and scope are mutated only through
/// its methods.
pub struct AppContext {
    config_dir: PathBuf,
    sessions: Arc<SessionStore>,
    scope: Arc<ScopeStore>,
    client: ApiClient,
    session_expired: Arc<AtomicBool>,
}

impl AppContext {
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let dir = storage::config_dir()?;
        let base_url = storage::load_base_url(&dir);
        Ok(Self::with_base_url(dir, base_url)?)
    }

    /// Build a context rooted at an explicit directory and base URL.
    /// Tests use this to isolate state and point at a local backend.
    pub fn with_base_url(
        config_dir: PathBuf,
        base_url: impl Into<String>,
    ) -> Result<Arc<Self>, ConsoleError> {
        let sessions = Arc::new(SessionStore::new(&config_dir));
        let scope = Arc::new(ScopeStore::new(&config_dir));
        let session_expired = Arc::new(AtomicBool::new(false));

        // 401/403 clears session and scope and flags the expiry for the
        // driver to route back to login. Clearing already-cleared state
        // is a no-op, so concurrent responses may each fire this safely.
        let on_unauthorized = {
            let sessions = Arc::clone(&sessions);
            let scope = Arc::clone(&scope);
            let session_expired = Arc::clone(&session_expired);
            Arc::new(move || {
                if let Err(e) = sessions.clear() {
                    tracing::error!("failed to clear session after 401/403: {}", e);
                }
                if let Err(e) = scope.set(None) {
                    tracing::error!("failed to clear scope after 401/403: {}", e);
                }
                session_expired.store(true, Ordering::SeqCst);
            }) as Arc<dyn Fn() + Send + Sync>
        };

        let client = ApiClient::new(base_url, Arc::clone(&sessions), on_unauthorized)?;

        Ok(Arc::new(Self { config_dir, sessions, scope, client, session_expired }))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.get()
    }

    pub fn establish_session(&self, session: &Session) -> Result<(), ConsoleError> {
        self.sessions.set(session)?;
        self.session_expired.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Clears both session and active scope.
    pub fn logout(&self) -> Result<(), ConsoleError> {
        self.sessions.clear()?;
        self.scope.set(None)?;
        Ok(())
    }

    pub fn active_workgroup(&self) -> Option<String> {
        self.scope.get()
    }

    pub fn set_active_workgroup(&self, id: Option<&str>) -> Result<(), ConsoleError> {
        self.scope.set(id)?;
        Ok(())
    }

    /// Set when any call through the client came back 401/403.
    pub fn session_expired(&self) -> bool {
        self.session_expired.load(Ordering::SeqCst)
    }

    /// Persists the base URL override; takes effect on the next startup.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), ConsoleError> {
        storage::save_base_url(&self.config_dir, base_url)?;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }
}
