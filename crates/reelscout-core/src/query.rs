use reelscout_models::{DiscoverFilters, MediaKind, SortOrder};

/// Which list the feed is showing. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Browse,
    Search,
}

/// A single user edit to the browse filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterChange {
    Genre(Option<u32>),
    Year(Option<i32>),
    MinRating(Option<f32>),
    Sort(SortOrder),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub kind: MediaKind,
    pub search_text: String,
    pub filters: DiscoverFilters,
    pub page: u32,
    pub has_more: bool,
}

impl QueryState {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            search_text: String::new(),
            filters: DiscoverFilters::default(),
            page: 1,
            has_more: true,
        }
    }

    /// Search mode is active whenever there is non-blank search text.
    pub fn mode(&self) -> FeedMode {
        if self.search_text.trim().is_empty() {
            FeedMode::Browse
        } else {
            FeedMode::Search
        }
    }

    pub fn is_searching(&self) -> bool {
        self.mode() == FeedMode::Search
    }

    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Genre(genre) => self.filters.genre = genre,
            FilterChange::Year(year) => self.filters.year = year,
            FilterChange::MinRating(rating) => self.filters.min_rating = rating,
            FilterChange::Sort(sort) => self.filters.sort = sort,
        }
    }

    /// Back to page one of a list that may have more pages.
    pub fn reset_pagination(&mut self) {
        self.page = 1;
        self.has_more = true;
    }
}
