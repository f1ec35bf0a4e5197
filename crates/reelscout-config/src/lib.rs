pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, ConfigError, FeedConfig, LoggingConfig, TmdbConfig, API_KEY_ENV, MAX_SUGGESTIONS, PLACEHOLDER_API_KEY};
pub use credentials::{CredentialStore, StoredSession};
pub use paths::PathManager;
