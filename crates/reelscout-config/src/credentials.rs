use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const SESSION_USER: &str = "session_user";
const SESSION_TOKEN: &str = "session_token";
const SESSION_STARTED_AT: &str = "session_started_at";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// A persisted login, the on-disk counterpart of the in-memory auth state.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub user: String,
    pub token: String,
    pub started_at: Option<DateTime<Utc>>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn session(&self) -> Option<StoredSession> {
        let token = self.get(SESSION_TOKEN).filter(|t| !t.is_empty())?;
        let user = self.get(SESSION_USER).cloned().unwrap_or_default();
        let started_at = self
            .get(SESSION_STARTED_AT)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Some(StoredSession {
            user,
            token: token.clone(),
            started_at,
        })
    }

    pub fn set_session(&mut self, session: &StoredSession) {
        self.set(SESSION_USER.to_string(), session.user.clone());
        self.set(SESSION_TOKEN.to_string(), session.token.clone());
        match session.started_at {
            Some(at) => self.set(SESSION_STARTED_AT.to_string(), at.to_rfc3339()),
            None => self.remove(SESSION_STARTED_AT),
        }
    }

    pub fn clear_session(&mut self) {
        self.remove(SESSION_USER);
        self.remove(SESSION_TOKEN);
        self.remove(SESSION_STARTED_AT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_session_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let started_at = Utc::now();

        let mut store = CredentialStore::new(path.clone());
        store.set_session(&StoredSession {
            user: "ada".to_string(),
            token: "tok-123".to_string(),
            started_at: Some(started_at),
        });
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        let session = loaded_store.session().unwrap();
        assert_eq!(session.user, "ada");
        assert_eq!(session.token, "tok-123");
        // Allow 1 second difference for serialization
        assert!((session.started_at.unwrap() - started_at).num_seconds().abs() < 2);
    }

    #[test]
    fn test_clear_session() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/reelscout-test"));
        store.set_session(&StoredSession {
            user: "ada".to_string(),
            token: "tok".to_string(),
            started_at: None,
        });
        assert!(store.session().is_some());
        store.clear_session();
        assert!(store.session().is_none());
    }

    #[test]
    fn test_empty_token_is_no_session() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/reelscout-test"));
        store.set(SESSION_TOKEN.to_string(), String::new());
        assert!(store.session().is_none());
    }
}
