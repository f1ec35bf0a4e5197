use crate::error::CatalogError;
use async_trait::async_trait;
use reelscout_models::{DiscoverFilters, Genre, MediaDetails, MediaItem, MediaKind, Page};

/// A media catalog the feed and detail controllers can query.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Browse the catalog with filters. Unset filters are not sent.
    async fn discover(
        &self,
        kind: MediaKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> Result<Page<MediaItem>, CatalogError>;

    async fn search(&self, kind: MediaKind, query: &str, page: u32) -> Result<Page<MediaItem>, CatalogError>;

    /// Full details including videos, credits, reviews and similar titles.
    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, CatalogError>;

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, CatalogError>;
}
