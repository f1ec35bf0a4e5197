use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog API returned status {status}{}", message_suffix(.message))]
    Api { status: u16, message: Option<String> },

    #[error("missing API credential: set tmdb.api_key in config.toml or the TMDB_API_KEY environment variable")]
    MissingCredential,

    #[error("unexpected response from catalog API: {0}")]
    Decode(#[from] serde_json::Error),
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

impl CatalogError {
    /// HTTP status for API errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Api { status, .. } => Some(*status),
            CatalogError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
