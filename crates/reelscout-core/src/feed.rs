//! The content feed controller.
//!
//! Owns the query and list state behind a browse/search screen: debounced
//! suggestions, filter-driven first-page fetches, search, and
//! sentinel-driven pagination. Every mutation publishes a [`FeedView`]
//! snapshot to subscribers.
//!
//! Feed fetches (browse pages and searches) share one generation counter and
//! suggestion fetches have their own, so a response is only applied when it
//! belongs to the most recent request of its family.

use crate::debounce::Debouncer;
use crate::generation::GenerationCounter;
use crate::query::{FeedMode, FilterChange, QueryState};
use crate::sentinel::ScrollSentinel;
use reelscout_config::{FeedConfig, MAX_SUGGESTIONS};
use reelscout_models::{DiscoverFilters, MediaItem, MediaKind, Page};
use reelscout_sources::{CatalogError, CatalogSource};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub debounce: Duration,
    pub suggestion_limit: usize,
    pub scroll_threshold: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for FeedSettings {
    fn from(config: &FeedConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            suggestion_limit: config.suggestion_limit,
            scroll_threshold: config.scroll_threshold_px,
        }
    }
}

/// What the rendering layer sees.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub kind: MediaKind,
    pub mode: FeedMode,
    pub search_text: String,
    pub filters: DiscoverFilters,
    pub page: u32,
    pub has_more: bool,
    pub items: Vec<MediaItem>,
    pub loading: bool,
    pub error: Option<Arc<CatalogError>>,
    pub suggestions: Vec<MediaItem>,
    pub show_suggestions: bool,
    pub sentinel_attached: bool,
}

impl FeedView {
    pub fn heading(&self) -> String {
        match self.mode {
            FeedMode::Browse => format!("Popular {}", self.kind.plural_label()),
            FeedMode::Search => format!(
                "Search Results for \"{}\" in {}",
                self.search_text.trim(),
                self.kind.plural_label()
            ),
        }
    }

    pub fn visible_suggestions(&self) -> &[MediaItem] {
        if self.show_suggestions {
            &self.suggestions
        } else {
            &[]
        }
    }
}

#[derive(Debug)]
struct FeedState {
    items: Vec<MediaItem>,
    /// Which family produced `items`.
    content: FeedMode,
    loading: bool,
    error: Option<Arc<CatalogError>>,
    suggestions: Vec<MediaItem>,
    show_suggestions: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            content: FeedMode::Browse,
            loading: false,
            error: None,
            suggestions: Vec::new(),
            show_suggestions: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FeedRequest {
    /// Page 1 replaces the list, later pages append to it.
    Browse { page: u32 },
    Search,
}

/// A feed request that has been registered but not yet sent.
struct FeedTicket {
    generation: u64,
    request: FeedRequest,
    kind: MediaKind,
    filters: DiscoverFilters,
    text: String,
}

/// Undoes `begin_feed_fetch` if the fetch future is dropped before its
/// response is applied. Only acts while its generation is still the latest.
struct InFlight<'a> {
    controller: &'a FeedController,
    generation: u64,
    request: FeedRequest,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.controller.lock();
        if !inner.feed_generation.is_current(self.generation) {
            return;
        }
        debug!(generation = self.generation, "Feed fetch abandoned before completion");
        inner.feed.loading = false;
        if let FeedRequest::Browse { page } = self.request {
            if page > 1 {
                inner.query.page = page - 1;
            }
        }
        self.controller.publish(&mut inner);
    }
}

struct FeedInner {
    query: QueryState,
    feed: FeedState,
    feed_generation: GenerationCounter,
    suggestion_generation: GenerationCounter,
    debouncer: Debouncer,
    sentinel: ScrollSentinel,
}

impl FeedInner {
    fn view(&self) -> FeedView {
        FeedView {
            kind: self.query.kind,
            mode: self.query.mode(),
            search_text: self.query.search_text.clone(),
            filters: self.query.filters.clone(),
            page: self.query.page,
            has_more: self.query.has_more,
            items: self.feed.items.clone(),
            loading: self.feed.loading,
            error: self.feed.error.clone(),
            suggestions: self.feed.suggestions.clone(),
            show_suggestions: self.feed.show_suggestions,
            sentinel_attached: self.sentinel.is_attached(),
        }
    }

    fn clear_suggestions(&mut self) {
        self.debouncer.cancel();
        self.suggestion_generation.invalidate();
        self.feed.suggestions.clear();
        self.feed.show_suggestions = false;
    }

    fn reset_search(&mut self) {
        self.query.search_text.clear();
        self.clear_suggestions();
    }

    /// Browse results are dropped, and any browse page still in flight must
    /// not land in the search list.
    fn enter_search_mode(&mut self) {
        self.feed_generation.invalidate();
        self.feed.items.clear();
        self.feed.content = FeedMode::Search;
        self.feed.loading = false;
        self.feed.error = None;
        self.query.page = 1;
        self.query.has_more = false;
    }

    fn apply_page(&mut self, request: FeedRequest, page: Page<MediaItem>) {
        let has_more = page.has_more();
        match request {
            FeedRequest::Browse { page: 1 } => {
                self.feed.items = page.results;
                self.query.page = 1;
                self.query.has_more = has_more;
            }
            FeedRequest::Browse { page: requested } => {
                self.feed.items.extend(page.results);
                self.query.page = requested;
                self.query.has_more = has_more;
            }
            FeedRequest::Search => {
                // Search results are a single page
                self.feed.items = page.results;
                self.query.page = 1;
                self.query.has_more = false;
            }
        }
    }

    fn apply_error(&mut self, request: FeedRequest, error: CatalogError) {
        match request {
            FeedRequest::Browse { page } if page > 1 => {
                warn!("Failed to load page {}: {}", page, error);
                // Keep what is already on screen; the cursor goes back to the last good page
                self.query.page = page - 1;
            }
            _ => {
                warn!("Failed to load {} feed: {}", self.query.kind, error);
                self.feed.items.clear();
            }
        }
        self.feed.error = Some(Arc::new(error));
    }

    /// The sentinel stays attached only while there is another browse page to load.
    fn sync_sentinel(&mut self) {
        let paginating = self.query.mode() == FeedMode::Browse
            && self.query.has_more
            && self.feed.error.is_none();

        if paginating && !self.sentinel.is_attached() {
            self.sentinel.attach();
            debug!("Scroll sentinel attached");
        } else if !paginating && self.sentinel.is_attached() {
            self.sentinel.detach();
            debug!("Scroll sentinel detached");
        }
    }
}

struct Shared {
    source: Arc<dyn CatalogSource>,
    settings: FeedSettings,
    state: Mutex<FeedInner>,
    updates: watch::Sender<FeedView>,
}

/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct FeedController {
    shared: Arc<Shared>,
}

impl FeedController {
    pub fn new(source: Arc<dyn CatalogSource>, kind: MediaKind, settings: FeedSettings) -> Self {
        let inner = FeedInner {
            query: QueryState::new(kind),
            feed: FeedState::default(),
            feed_generation: GenerationCounter::new(),
            suggestion_generation: GenerationCounter::new(),
            debouncer: Debouncer::new(settings.debounce),
            sentinel: ScrollSentinel::new(settings.scroll_threshold),
        };
        let (updates, _) = watch::channel(inner.view());
        debug!("Feed for {} backed by {}", kind.lowercase_label(), source.source_name());

        Self {
            shared: Arc::new(Shared {
                source,
                settings,
                state: Mutex::new(inner),
                updates,
            }),
        }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.shared.settings
    }

    pub fn view(&self) -> FeedView {
        self.lock().view()
    }

    /// Receives a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.shared.updates.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, inner: &mut FeedInner) {
        inner.sync_sentinel();
        self.shared.updates.send_replace(inner.view());
    }

    /// Initial load: page one of the current browse filters.
    pub async fn start(&self) {
        let kind = self.lock().query.kind;
        info!("Loading popular {}", kind.lowercase_label());
        self.refetch_first_page(|_| {}).await;
    }

    /// Switch between movies and series. Filters reset because genre ids are
    /// not shared between the two catalogs.
    pub async fn set_kind(&self, kind: MediaKind) {
        info!("Switching feed to {}", kind.lowercase_label());
        self.refetch_first_page(move |inner| {
            inner.query.kind = kind;
            inner.query.filters = DiscoverFilters::default();
            inner.feed.items.clear();
        })
        .await;
    }

    pub async fn set_filter(&self, change: FilterChange) {
        info!("Filter changed: {:?}", change);
        self.refetch_first_page(move |inner| inner.query.apply(change)).await;
    }

    /// Replace every filter at once with a single page-one fetch.
    pub async fn set_filters(&self, filters: DiscoverFilters) {
        info!("Filters replaced: {:?}", filters);
        self.refetch_first_page(move |inner| inner.query.filters = filters).await;
    }

    /// Drop every filter; sort goes back to `popularity.desc`.
    pub async fn clear_filters(&self) {
        info!("Clearing filters");
        self.refetch_first_page(|inner| inner.query.filters = DiscoverFilters::default())
            .await;
    }

    /// Leaves search mode, resets pagination and replaces the list with page one.
    async fn refetch_first_page<F>(&self, prepare: F)
    where
        F: FnOnce(&mut FeedInner) + Send,
    {
        let ticket = {
            let mut inner = self.lock();
            prepare(&mut inner);
            inner.reset_search();
            inner.query.reset_pagination();
            inner.feed.content = FeedMode::Browse;
            self.begin_feed_fetch(&mut inner, FeedRequest::Browse { page: 1 })
        };
        self.complete_feed_fetch(ticket).await;
    }

    /// Fetch and append the next browse page. Returns false without fetching
    /// while a fetch is in flight, when there are no more pages, or in search mode.
    pub async fn load_next_page(&self) -> bool {
        let ticket = {
            let mut inner = self.lock();
            if inner.feed.loading || !inner.query.has_more || inner.query.is_searching() {
                debug!(
                    loading = inner.feed.loading,
                    has_more = inner.query.has_more,
                    searching = inner.query.is_searching(),
                    "Skipping next page"
                );
                return false;
            }
            inner.query.page += 1;
            let page = inner.query.page;
            debug!("Loading page {}", page);
            self.begin_feed_fetch(&mut inner, FeedRequest::Browse { page })
        };
        self.complete_feed_fetch(ticket).await;
        true
    }

    /// Viewport signal from the rendering layer: the sentinel is `distance`
    /// away from becoming visible. Pages only while the sentinel is attached.
    pub async fn sentinel_visible(&self, distance: u32) -> bool {
        let fire = self.lock().sentinel.should_fire(distance);
        if !fire {
            return false;
        }
        self.load_next_page().await
    }

    /// Run the current search text immediately. Blank text leaves search mode
    /// and, if the list was showing search results, reloads the browse feed.
    pub async fn search(&self) {
        let ticket = {
            let mut inner = self.lock();
            let text = inner.query.search_text.trim().to_string();
            if text.is_empty() {
                inner.clear_suggestions();
                let revert = inner.feed.content == FeedMode::Search;
                self.publish(&mut inner);
                if !revert {
                    return;
                }
                None
            } else {
                info!("Searching {} for '{}'", inner.query.kind.lowercase_label(), text);
                inner.debouncer.cancel();
                inner.suggestion_generation.invalidate();
                inner.feed.show_suggestions = false;
                inner.feed.content = FeedMode::Search;
                inner.query.page = 1;
                inner.query.has_more = false;
                Some(self.begin_feed_fetch(&mut inner, FeedRequest::Search))
            }
        };

        match ticket {
            Some(ticket) => self.complete_feed_fetch(ticket).await,
            None => self.refetch_first_page(|_| {}).await,
        }
    }

    /// Keystroke handler. Schedules a debounced suggestion fetch for non-blank
    /// text; blank text hides suggestions and returns to browsing.
    pub async fn set_search_term(&self, text: &str) {
        let revert = {
            let mut inner = self.lock();
            let was_searching = inner.query.is_searching();
            inner.query.search_text = text.to_string();
            // A pending suggestion for older text must not render
            inner.suggestion_generation.invalidate();

            if inner.query.is_searching() {
                if !was_searching {
                    inner.enter_search_mode();
                }
                let term = inner.query.search_text.trim().to_string();
                let controller = self.clone();
                inner
                    .debouncer
                    .schedule(move || controller.fetch_suggestions(term));
                self.publish(&mut inner);
                false
            } else {
                inner.clear_suggestions();
                self.publish(&mut inner);
                inner.feed.content == FeedMode::Search
            }
        };

        if revert {
            debug!("Search text cleared, returning to browse feed");
            self.refetch_first_page(|_| {}).await;
        }
    }

    /// Input lost focus: hide suggestions and drop any that are still pending.
    pub fn blur(&self) {
        let mut inner = self.lock();
        inner.debouncer.cancel();
        inner.suggestion_generation.invalidate();
        inner.feed.show_suggestions = false;
        self.publish(&mut inner);
    }

    /// Input regained focus: re-show suggestions we already have.
    pub fn focus(&self) {
        let mut inner = self.lock();
        if inner.query.is_searching() && !inner.feed.suggestions.is_empty() {
            inner.feed.show_suggestions = true;
            self.publish(&mut inner);
        }
    }

    /// Pick a suggestion: its title becomes the search text and is searched.
    /// Returns false if `index` is out of range.
    pub async fn select_suggestion(&self, index: usize) -> bool {
        {
            let mut inner = self.lock();
            let Some(item) = inner.feed.suggestions.get(index) else {
                return false;
            };
            let title = item.title.clone();
            if !inner.query.is_searching() {
                inner.enter_search_mode();
            }
            inner.query.search_text = title;
            inner.clear_suggestions();
        }
        self.search().await;
        true
    }

    fn begin_feed_fetch(&self, inner: &mut FeedInner, request: FeedRequest) -> FeedTicket {
        let generation = inner.feed_generation.issue();
        inner.feed.loading = true;
        inner.feed.error = None;
        let ticket = FeedTicket {
            generation,
            request,
            kind: inner.query.kind,
            filters: inner.query.filters.clone(),
            text: inner.query.search_text.trim().to_string(),
        };
        self.publish(inner);
        ticket
    }

    async fn complete_feed_fetch(&self, ticket: FeedTicket) {
        let mut in_flight = InFlight {
            controller: self,
            generation: ticket.generation,
            request: ticket.request,
            armed: true,
        };
        let source = &self.shared.source;
        let result = match ticket.request {
            FeedRequest::Browse { page } => source.discover(ticket.kind, &ticket.filters, page).await,
            FeedRequest::Search => source.search(ticket.kind, &ticket.text, 1).await,
        };
        // No await points remain, so the response is always applied from here on
        in_flight.disarm();

        let mut inner = self.lock();
        if !inner.feed_generation.is_current(ticket.generation) {
            debug!(
                generation = ticket.generation,
                latest = inner.feed_generation.latest(),
                "Discarding stale feed response"
            );
            return;
        }

        match result {
            Ok(page) => {
                debug!(
                    page = page.page,
                    total_pages = page.total_pages,
                    results = page.results.len(),
                    "Feed page received"
                );
                inner.apply_page(ticket.request, page);
            }
            Err(e) => inner.apply_error(ticket.request, e),
        }
        inner.feed.loading = false;
        self.publish(&mut inner);
    }

    /// Runs when the debounce timer fires. The request is detached so that
    /// later keystrokes can only stop its result from rendering.
    fn fetch_suggestions(&self, term: String) {
        let (generation, kind) = {
            let mut inner = self.lock();
            (inner.suggestion_generation.issue(), inner.query.kind)
        };
        debug!("Fetching suggestions for '{}'", term);

        let controller = self.clone();
        tokio::spawn(async move {
            let result = controller.shared.source.search(kind, &term, 1).await;
            controller.apply_suggestions(generation, &term, result);
        });
    }

    fn apply_suggestions(&self, generation: u64, term: &str, result: Result<Page<MediaItem>, CatalogError>) {
        let mut inner = self.lock();
        if !inner.suggestion_generation.is_current(generation) || inner.query.search_text.trim() != term {
            debug!("Discarding stale suggestions for '{}'", term);
            return;
        }

        match result {
            Ok(page) => {
                let mut suggestions = page.results;
                suggestions.truncate(self.shared.settings.suggestion_limit.min(MAX_SUGGESTIONS));
                inner.feed.show_suggestions = !suggestions.is_empty();
                inner.feed.suggestions = suggestions;
            }
            Err(e) => {
                warn!("Failed to fetch suggestions for '{}': {}", term, e);
                inner.feed.suggestions.clear();
                inner.feed.show_suggestions = false;
            }
        }
        self.publish(&mut inner);
    }
}
