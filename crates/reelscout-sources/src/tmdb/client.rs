use crate::error::CatalogError;
use crate::tmdb::api::{self, Endpoint};
use crate::traits::CatalogSource;
use async_trait::async_trait;
use reelscout_config::Config;
use reelscout_models::{image_url, DiscoverFilters, Genre, ImageSize, MediaDetails, MediaItem, MediaKind, Page};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = concat!("reelscout/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct TmdbSettings {
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub api_key: Option<String>,
}

impl TmdbSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.tmdb.base_url.clone(),
            image_base_url: config.tmdb.image_base_url.clone(),
            language: config.tmdb.language.clone(),
            api_key: config.resolved_api_key(),
        }
    }
}

/// Create a reqwest Client with a product user agent and a request timeout
pub fn create_tmdb_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    settings: TmdbSettings,
}

impl TmdbClient {
    pub fn new(settings: TmdbSettings) -> Self {
        if settings.api_key.is_none() {
            info!("No TMDB API key configured; catalog requests will fail until one is set");
        }
        Self {
            client: Arc::new(create_tmdb_client()),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TmdbSettings::from_config(config))
    }

    /// The credential is checked before any request goes out.
    fn endpoint(&self) -> Result<Endpoint<'_>, CatalogError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(CatalogError::MissingCredential)?;
        Ok(Endpoint {
            base_url: &self.settings.base_url,
            api_key,
            language: &self.settings.language,
        })
    }

    pub fn image_url(&self, size: ImageSize, path: &str) -> String {
        image_url(&self.settings.image_base_url, size, path)
    }

    /// Redacted URL a discover call would hit.
    pub fn discover_url(&self, kind: MediaKind, filters: &DiscoverFilters, page: u32) -> String {
        api::request_url(
            &self.settings.base_url,
            &api::discover_path(kind),
            &api::discover_params(kind, filters, page),
        )
    }
}

#[async_trait]
impl CatalogSource for TmdbClient {
    fn source_name(&self) -> &str {
        "tmdb"
    }

    async fn discover(
        &self,
        kind: MediaKind,
        filters: &DiscoverFilters,
        page: u32,
    ) -> Result<Page<MediaItem>, CatalogError> {
        let endpoint = self.endpoint()?;
        api::discover(&self.client, &endpoint, kind, filters, page).await
    }

    async fn search(&self, kind: MediaKind, query: &str, page: u32) -> Result<Page<MediaItem>, CatalogError> {
        let endpoint = self.endpoint()?;
        api::search(&self.client, &endpoint, kind, query, page).await
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, CatalogError> {
        let endpoint = self.endpoint()?;
        api::details(&self.client, &endpoint, kind, id).await
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, CatalogError> {
        let endpoint = self.endpoint()?;
        api::genres(&self.client, &endpoint, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelscout_models::SortOrder;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> TmdbClient {
        TmdbClient::new(TmdbSettings {
            base_url: server.uri(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            language: "en-US".to_string(),
            api_key: api_key.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_discover_sends_filters_and_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .and(query_param("api_key", "secret"))
            .and(query_param("page", "1"))
            .and(query_param("with_genres", "28"))
            .and(query_param("primary_release_year", "2020"))
            .and(query_param("vote_average.gte", "7"))
            .and(query_param("sort_by", "popularity.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "total_pages": 5,
                "total_results": 100,
                "results": [
                    {"id": 1, "title": "Tenet", "release_date": "2020-08-22", "vote_average": 7.2},
                    {"id": 2, "title": "Extraction", "release_date": "2020-04-24", "vote_average": 7.4}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let filters = DiscoverFilters {
            genre: Some(28),
            year: Some(2020),
            min_rating: Some(7.0),
            sort: SortOrder::PopularityDesc,
        };
        let page = client.discover(MediaKind::Movie, &filters, 1).await.unwrap();

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].title, "Tenet");
        assert!(page.has_more());
    }

    #[tokio::test]
    async fn test_search_series_maps_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/tv"))
            .and(query_param("query", "breaking bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "total_pages": 1,
                "total_results": 1,
                "results": [{"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20", "vote_average": 8.9}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let page = client.search(MediaKind::Series, "breaking bad", 1).await.unwrap();

        assert_eq!(page.results[0].title, "Breaking Bad");
        assert_eq!(page.results[0].kind, MediaKind::Series);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_details_requests_appended_sections() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movie/438631"))
            .and(query_param("append_to_response", "videos,credits,reviews,similar"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 438631,
                "title": "Dune",
                "runtime": 155,
                "vote_average": 7.8,
                "vote_count": 9000,
                "imdb_id": "tt1160419",
                "genres": [{"id": 878, "name": "Science Fiction"}],
                "credits": {
                    "cast": [{"name": "Timothée Chalamet", "character": "Paul Atreides"}],
                    "crew": [{"name": "Denis Villeneuve", "job": "Director"}]
                },
                "videos": {"results": [{"key": "n9xhJrPXop4", "site": "YouTube", "type": "Trailer"}]},
                "reviews": {"results": []},
                "similar": {"results": [{"id": 841, "title": "Dune", "release_date": "1984-12-14"}]}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let details = client.details(MediaKind::Movie, 438631).await.unwrap();

        assert_eq!(details.director(), Some("Denis Villeneuve"));
        assert_eq!(details.runtime_label(), "2h 35m");
        assert_eq!(details.trailer_url().as_deref(), Some("https://www.youtube.com/watch?v=n9xhJrPXop4"));
        assert_eq!(details.similar.len(), 1);
        assert_eq!(details.genre_names(), "Science Fiction");
    }

    #[tokio::test]
    async fn test_genres() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/tv/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "genres": [{"id": 18, "name": "Drama"}, {"id": 35, "name": "Comedy"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let genres = client.genres(MediaKind::Series).await.unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0].name, "Drama");
    }

    #[tokio::test]
    async fn test_json_error_envelope_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status_code": 7,
                "status_message": "Invalid API key: You must be granted a valid key.",
                "success": false
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("wrong"));
        let err = client
            .discover(MediaKind::Movie, &DiscoverFilters::default(), 1)
            .await
            .unwrap_err();

        match err {
            CatalogError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Invalid API key: You must be granted a valid key."));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/movie"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let err = client.search(MediaKind::Movie, "dune", 1).await.unwrap_err();

        assert!(matches!(err, CatalogError::Api { status: 502, message: None }));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.genres(MediaKind::Movie).await.unwrap_err();
        assert!(matches!(err, CatalogError::MissingCredential));
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        let page = client.search(MediaKind::Movie, "   ", 1).await.unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn test_image_url_uses_configured_base() {
        let client = TmdbClient::new(TmdbSettings {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            language: "en-US".to_string(),
            api_key: None,
        });
        assert_eq!(
            client.image_url(ImageSize::W500, "/poster.jpg"),
            "https://image.tmdb.org/t/p/w500/poster.jpg"
        );
    }

    #[test]
    fn test_discover_url_is_redacted() {
        let client = TmdbClient::new(TmdbSettings {
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            language: "en-US".to_string(),
            api_key: Some("secret".to_string()),
        });
        let url = client.discover_url(MediaKind::Movie, &DiscoverFilters::default(), 2);
        assert_eq!(url, "https://api.themoviedb.org/3/discover/movie?page=2&sort_by=popularity.desc");
        assert!(!url.contains("secret"));
    }
}
