use chrono::{DateTime, Utc};
use reelscout_config::StoredSession;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: String,
    pub token: String,
    pub started_at: DateTime<Utc>,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self {
            user: stored.user,
            token: stored.token,
            started_at: stored.started_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            token: session.token.clone(),
            started_at: Some(session.started_at),
        }
    }
}

/// Who is logged in. Passed explicitly to whatever needs it; clones share
/// the same state and every change is pushed to subscribers.
#[derive(Clone)]
pub struct AuthState {
    session: Arc<watch::Sender<Option<Session>>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthState {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            session: Arc::new(session),
        }
    }

    /// Start from a persisted session, if there is one.
    pub fn restore(stored: Option<StoredSession>) -> Self {
        let state = Self::new();
        if let Some(stored) = stored {
            info!("Restored session for {}", stored.user);
            state.session.send_replace(Some(stored.into()));
        }
        state
    }

    pub fn login(&self, user: &str, token: &str) -> Session {
        let session = Session {
            user: user.to_string(),
            token: token.to_string(),
            started_at: Utc::now(),
        };
        info!("Logged in as {}", session.user);
        self.session.send_replace(Some(session.clone()));
        session
    }

    /// Returns the session that was ended, if any.
    pub fn logout(&self) -> Option<Session> {
        let previous = self.session.send_replace(None);
        if let Some(session) = &previous {
            info!("Logged out {}", session.user);
        }
        previous
    }

    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_and_logout() {
        let auth = AuthState::new();
        assert!(!auth.is_logged_in());

        let session = auth.login("ada", "tok-1");
        assert!(auth.is_logged_in());
        assert_eq!(auth.session(), Some(session.clone()));

        assert_eq!(auth.logout(), Some(session));
        assert!(!auth.is_logged_in());
        assert_eq!(auth.logout(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let auth = AuthState::new();
        let other = auth.clone();
        auth.login("ada", "tok-1");
        assert_eq!(other.session().map(|s| s.user), Some("ada".to_string()));
    }

    #[test]
    fn test_subscribers_are_notified() {
        let auth = AuthState::new();
        let mut updates = auth.subscribe();
        assert!(!updates.has_changed().unwrap());

        auth.login("ada", "tok-1");
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_some());

        auth.logout();
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().is_none());
    }

    #[test]
    fn test_restore_from_stored_session() {
        let started_at = Utc::now();
        let auth = AuthState::restore(Some(StoredSession {
            user: "ada".to_string(),
            token: "tok-1".to_string(),
            started_at: Some(started_at),
        }));
        let session = auth.session().unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.started_at, started_at);

        let stored = StoredSession::from(&session);
        assert_eq!(stored.started_at, Some(started_at));

        assert!(!AuthState::restore(None).is_logged_in());
    }
}
