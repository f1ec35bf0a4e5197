use super::progress::Spinner;
use super::render;
use crate::boundary;
use crate::output::Output;
use color_eyre::Result;
use reelscout_config::Config;
use reelscout_core::{FeedController, FeedSettings};
use reelscout_models::MediaKind;
use std::time::Duration;

/// Upper bound on waiting for the debounced suggestion fetch to land.
const SUGGESTION_WAIT: Duration = Duration::from_secs(20);

pub async fn run_search(config: &Config, kind: MediaKind, text: &str, output: &Output) -> Result<()> {
    if text.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Search text must not be empty"));
    }
    let client = super::catalog(config)?;
    let controller = FeedController::new(client, kind, FeedSettings::from(&config.feed));

    let spinner = Spinner::start(format!("Searching {} for '{}'...", kind.lowercase_label(), text.trim()), output);
    controller.set_search_term(text).await;
    controller.search().await;
    spinner.finish();

    let view = controller.view();
    if let Some(error) = &view.error {
        return Err(color_eyre::eyre::eyre!("Search failed: {}", error));
    }
    boundary::guarded("search results", output, || render::render_feed(&view, output));
    Ok(())
}

/// Type-ahead suggestions for `text`, going through the same debounce as the
/// interactive search box.
pub async fn run_suggest(config: &Config, kind: MediaKind, text: &str, output: &Output) -> Result<()> {
    if text.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Suggestion text must not be empty"));
    }
    let client = super::catalog(config)?;
    let controller = FeedController::new(client, kind, FeedSettings::from(&config.feed));
    let mut updates = controller.subscribe();

    controller.set_search_term(text).await;
    updates.borrow_and_update();

    // The next change after the keystroke is the suggestion result landing
    let wait = controller.settings().debounce + SUGGESTION_WAIT;
    match tokio::time::timeout(wait, updates.changed()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => return Err(color_eyre::eyre::eyre!("Feed closed before suggestions arrived")),
        Err(_) => return Err(color_eyre::eyre::eyre!("Timed out waiting for suggestions")),
    }

    let view = controller.view();
    boundary::guarded("suggestions", output, || {
        render::render_suggestions(view.visible_suggestions(), output)
    });
    Ok(())
}
