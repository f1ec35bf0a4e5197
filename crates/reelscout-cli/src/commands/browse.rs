use super::progress::Spinner;
use super::render;
use crate::boundary;
use crate::output::Output;
use color_eyre::Result;
use reelscout_config::Config;
use reelscout_core::{FeedController, FeedSettings};
use reelscout_models::{DiscoverFilters, MediaKind, SortOrder};
use reelscout_sources::CatalogSource;
use std::sync::Arc;

pub struct BrowseFilters {
    pub genre: Option<u32>,
    pub year: Option<i32>,
    pub min_rating: Option<f32>,
    pub sort: SortOrder,
}

impl From<BrowseFilters> for DiscoverFilters {
    fn from(f: BrowseFilters) -> Self {
        DiscoverFilters {
            genre: f.genre,
            year: f.year,
            min_rating: f.min_rating,
            sort: f.sort,
        }
    }
}

pub async fn run_browse(
    config: &Config,
    kind: MediaKind,
    filters: BrowseFilters,
    pages: u32,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Browse command started");
    let client = super::catalog(config)?;
    let filters = DiscoverFilters::from(filters);
    tracing::debug!(url = %client.discover_url(kind, &filters, 1), "Browse request");
    let source: Arc<dyn CatalogSource> = client;
    let controller = FeedController::new(source.clone(), kind, FeedSettings::from(&config.feed));

    let spinner = Spinner::start(format!("Loading popular {}...", kind.lowercase_label()), output);

    // Genre names are only decoration, so a failure there is not fatal
    let genre_id = filters.genre;
    let (_, genres) = futures::join!(controller.set_filters(filters), source.genres(kind));

    // Each extra page is what scrolling to the bottom of the list would load
    while controller.view().page < pages.max(1) {
        spinner.set_message(format!("Loading page {}...", controller.view().page + 1));
        if !controller.sentinel_visible(0).await {
            break;
        }
    }
    spinner.finish();

    let view = controller.view();
    if let Some(error) = &view.error {
        if view.items.is_empty() {
            return Err(color_eyre::eyre::eyre!("Failed to load {}: {}", kind.lowercase_label(), error));
        }
        output.warn(format!("Stopped at page {}: {}", view.page, error));
    }

    if let (Some(id), Ok(genres)) = (genre_id, &genres) {
        if let Some(genre) = genres.iter().find(|g| g.id == id) {
            output.println(format!("Genre: {}", genre.name));
        }
    } else if let Err(e) = &genres {
        tracing::warn!("Could not load genre list: {}", e);
    }

    boundary::guarded("feed", output, || render::render_feed(&view, output));
    Ok(())
}

pub async fn run_genres(config: &Config, kind: MediaKind, output: &Output) -> Result<()> {
    let client = super::catalog(config)?;
    let spinner = Spinner::start(format!("Loading {} genres...", kind.lowercase_label()), output);
    let genres = client.genres(kind).await;
    spinner.finish();

    let genres = genres.map_err(|e| color_eyre::eyre::eyre!("Failed to load genres: {}", e))?;
    boundary::guarded("genres", output, || render::render_genres(&genres, output));
    Ok(())
}
