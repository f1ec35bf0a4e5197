pub mod auth;
pub mod browse;
pub mod config;
pub mod details;
pub mod explore;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod search;

use color_eyre::Result;
use reelscout_config::Config;
use reelscout_sources::TmdbClient;
use std::sync::Arc;

/// Build the catalog client, failing early with a hint when the config is
/// unusable or no API key is set.
pub fn catalog(config: &Config) -> Result<Arc<TmdbClient>> {
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration is invalid: {}", e))?;

    if !config.is_api_key_configured() {
        return Err(color_eyre::eyre::eyre!(
            "No TMDB API key configured. Run 'reelscout config set-key' or set {}.",
            reelscout_config::API_KEY_ENV
        ));
    }

    Ok(Arc::new(TmdbClient::from_config(config)))
}
