//! An in-memory catalog with scripted latency and failures for controller tests.

use async_trait::async_trait;
use reelscout_models::{
    Credits, DiscoverFilters, Genre, MediaDetails, MediaItem, MediaKind, Page,
};
use reelscout_sources::{CatalogError, CatalogSource};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const ITEMS_PER_PAGE: u64 = 3;
pub const SEARCH_RESULTS: u64 = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Discover { kind: MediaKind, filters: DiscoverFilters, page: u32 },
    Search { kind: MediaKind, query: String },
    Details { kind: MediaKind, id: u64 },
    Genres(MediaKind),
}

pub struct ScriptedSource {
    total_pages: u32,
    discover_delay: Duration,
    search_delay: Duration,
    details_delays: HashMap<u64, Duration>,
    failing_pages: Vec<u32>,
    failing_genres: Vec<u32>,
    fail_search: bool,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            total_pages: 5,
            discover_delay: Duration::from_millis(10),
            search_delay: Duration::from_millis(10),
            details_delays: HashMap::new(),
            failing_pages: Vec::new(),
            failing_genres: Vec::new(),
            fail_search: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = total_pages;
        self
    }

    pub fn with_discover_delay(mut self, delay: Duration) -> Self {
        self.discover_delay = delay;
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_details_delay(mut self, id: u64, delay: Duration) -> Self {
        self.details_delays.insert(id, delay);
        self
    }

    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.push(page);
        self
    }

    pub fn failing_genre(mut self, genre: u32) -> Self {
        self.failing_genres.push(genre);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn discover_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Discover { .. }))
            .collect()
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search { query, .. } => Some(query),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn scripted_failure() -> CatalogError {
    CatalogError::Api {
        status: 500,
        message: Some("scripted failure".to_string()),
    }
}

pub fn create_item(id: u64, title: &str, kind: MediaKind) -> MediaItem {
    MediaItem {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{}.jpg", id)),
        backdrop_path: None,
        release_date: None,
        rating: 7.0,
        kind,
        overview: String::new(),
    }
}

/// Discover ids encode genre and page: `genre * 10_000 + page * 100 + n`.
pub fn genre_of(item: &MediaItem) -> u64 {
    item.id / 10_000
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn discover(
        &self,
        kind: MediaKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> Result<Page<MediaItem>, CatalogError> {
        self.record(Call::Discover { kind, filters: filters.clone(), page });
        tokio::time::sleep(self.discover_delay).await;

        let genre = filters.genre.unwrap_or(0);
        if self.failing_pages.contains(&page) || self.failing_genres.contains(&genre) {
            return Err(scripted_failure());
        }

        let results = (0..ITEMS_PER_PAGE)
            .map(|n| {
                let id = genre as u64 * 10_000 + page as u64 * 100 + n;
                create_item(id, &format!("g{} p{} #{}", genre, page, n), kind)
            })
            .collect();
        Ok(Page {
            page,
            total_pages: self.total_pages,
            total_results: self.total_pages * ITEMS_PER_PAGE as u32,
            results,
        })
    }

    async fn search(&self, kind: MediaKind, query: &str, page: u32) -> Result<Page<MediaItem>, CatalogError> {
        self.record(Call::Search { kind, query: query.to_string() });
        tokio::time::sleep(self.search_delay).await;

        if self.fail_search {
            return Err(scripted_failure());
        }

        let results = (0..SEARCH_RESULTS)
            .map(|n| create_item(90_000 + n, &format!("{} {}", query, n), kind))
            .collect();
        Ok(Page {
            page,
            total_pages: 3,
            total_results: 60,
            results,
        })
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, CatalogError> {
        self.record(Call::Details { kind, id });
        let delay = self
            .details_delays
            .get(&id)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;

        if id == 0 {
            return Err(CatalogError::Api {
                status: 404,
                message: Some("The resource you requested could not be found.".to_string()),
            });
        }

        Ok(MediaDetails {
            id,
            kind,
            title: format!("Title {}", id),
            tagline: None,
            overview: String::new(),
            release_date: None,
            rating: Some(7.5),
            vote_count: 10,
            runtime: Some(120),
            episode_run_time: Vec::new(),
            genres: Vec::new(),
            poster_path: None,
            backdrop_path: None,
            imdb_id: None,
            homepage: None,
            budget: None,
            revenue: None,
            credits: Credits::default(),
            videos: Vec::new(),
            reviews: Vec::new(),
            similar: Vec::new(),
        })
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, CatalogError> {
        self.record(Call::Genres(kind));
        Ok(vec![
            Genre { id: 28, name: "Action".to_string() },
            Genre { id: 12, name: "Adventure".to_string() },
        ])
    }
}
