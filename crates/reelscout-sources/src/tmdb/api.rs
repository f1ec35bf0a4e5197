use crate::error::CatalogError;
use chrono::NaiveDate;
use reelscout_models::{
    CastMember, Credits, CrewMember, DiscoverFilters, Genre, MediaDetails, MediaItem, MediaKind,
    Page, Review, Video,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Extra detail sections requested alongside the details call.
pub const DETAIL_SECTIONS: &str = "videos,credits,reviews,similar";

/// Where and as whom to send requests.
pub struct Endpoint<'a> {
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u32,
    #[serde(default)]
    results: Vec<RawListItem>,
}

fn first_page() -> u32 {
    1
}

// Movies carry `title`/`release_date`, series carry `name`/`first_air_date`
#[derive(Debug, Deserialize)]
struct RawListItem {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResults<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

impl<T> Default for RawResults<T> {
    fn default() -> Self {
        Self { results: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct RawDetails {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    tagline: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
    #[serde(default)]
    vote_count: u32,
    runtime: Option<u32>,
    #[serde(default)]
    episode_run_time: Vec<u32>,
    #[serde(default)]
    genres: Vec<Genre>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    imdb_id: Option<String>,
    homepage: Option<String>,
    budget: Option<u64>,
    revenue: Option<u64>,
    #[serde(default)]
    credits: RawCredits,
    #[serde(default)]
    videos: RawResults<RawVideo>,
    #[serde(default)]
    reviews: RawResults<RawReview>,
    #[serde(default)]
    similar: RawResults<RawListItem>,
}

#[derive(Debug, Deserialize, Default)]
struct RawCredits {
    #[serde(default)]
    cast: Vec<RawCast>,
    #[serde(default)]
    crew: Vec<RawCrew>,
}

#[derive(Debug, Deserialize)]
struct RawCast {
    name: String,
    character: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCrew {
    name: String,
    #[serde(default)]
    job: String,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    key: String,
    #[serde(default)]
    site: String,
    #[serde(rename = "type", default)]
    video_type: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGenres {
    #[serde(default)]
    genres: Vec<Genre>,
}

/// Error body the API sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    status_message: Option<String>,
}

/// Parse an API date, treating empty or malformed values as absent.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

impl RawListItem {
    fn into_media_item(self, kind: MediaKind) -> MediaItem {
        let release_date = parse_date(self.release_date.as_deref().or(self.first_air_date.as_deref()));
        MediaItem {
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            poster_path: non_empty(self.poster_path),
            backdrop_path: non_empty(self.backdrop_path),
            release_date,
            rating: self.vote_average.unwrap_or_default(),
            kind,
            overview: self.overview.unwrap_or_default(),
        }
    }
}

impl RawPage {
    fn into_page(self, kind: MediaKind) -> Page<MediaItem> {
        Page {
            page: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            results: self
                .results
                .into_iter()
                .map(|item| item.into_media_item(kind))
                .collect(),
        }
    }
}

impl RawDetails {
    fn into_details(self, kind: MediaKind) -> MediaDetails {
        let release_date = parse_date(self.release_date.as_deref().or(self.first_air_date.as_deref()));
        MediaDetails {
            id: self.id,
            kind,
            title: self.title.or(self.name).unwrap_or_default(),
            tagline: non_empty(self.tagline),
            overview: self.overview.unwrap_or_default(),
            release_date,
            rating: self.vote_average,
            vote_count: self.vote_count,
            runtime: self.runtime,
            episode_run_time: self.episode_run_time,
            genres: self.genres,
            poster_path: non_empty(self.poster_path),
            backdrop_path: non_empty(self.backdrop_path),
            imdb_id: non_empty(self.imdb_id),
            homepage: non_empty(self.homepage),
            budget: self.budget.filter(|b| *b > 0),
            revenue: self.revenue.filter(|r| *r > 0),
            credits: Credits {
                cast: self
                    .credits
                    .cast
                    .into_iter()
                    .map(|c| CastMember { name: c.name, character: c.character })
                    .collect(),
                crew: self
                    .credits
                    .crew
                    .into_iter()
                    .map(|c| CrewMember { name: c.name, job: c.job })
                    .collect(),
            },
            videos: self
                .videos
                .results
                .into_iter()
                .map(|v| Video { key: v.key, site: v.site, video_type: v.video_type, name: v.name })
                .collect(),
            reviews: self
                .reviews
                .results
                .into_iter()
                .map(|r| Review { author: r.author, content: r.content, url: r.url })
                .collect(),
            similar: self
                .similar
                .results
                .into_iter()
                .map(|item| item.into_media_item(kind))
                .collect(),
        }
    }
}

/// Query parameters for the discover endpoint. Filters left unset are omitted.
pub fn discover_params(kind: MediaKind, filters: &DiscoverFilters, page: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", page.to_string()),
        ("sort_by", filters.sort.api_key(kind).to_string()),
    ];

    if let Some(genre) = filters.genre {
        params.push(("with_genres", genre.to_string()));
    }

    if let Some(year) = filters.year {
        let key = match kind {
            MediaKind::Movie => "primary_release_year",
            MediaKind::Series => "first_air_date_year",
        };
        params.push((key, year.to_string()));
    }

    if let Some(min_rating) = filters.min_rating {
        params.push(("vote_average.gte", min_rating.to_string()));
    }

    params
}

pub fn search_params(query: &str, page: u32) -> Vec<(&'static str, String)> {
    vec![("query", query.to_string()), ("page", page.to_string())]
}

/// Render a request URL without the credential, for logs.
pub fn request_url(base_url: &str, path: &str, params: &[(&'static str, String)]) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    for (i, (key, value)) in params.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

pub fn discover_path(kind: MediaKind) -> String {
    format!("/discover/{}", kind.api_segment())
}

pub fn search_path(kind: MediaKind) -> String {
    format!("/search/{}", kind.api_segment())
}

pub fn details_path(kind: MediaKind, id: u64) -> String {
    format!("/{}/{}", kind.api_segment(), id)
}

pub fn genres_path(kind: MediaKind) -> String {
    format!("/genre/{}/list", kind.api_segment())
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    endpoint: &Endpoint<'_>,
    path: &str,
    params: &[(&'static str, String)],
) -> Result<T, CatalogError> {
    let url = format!("{}{}", endpoint.base_url.trim_end_matches('/'), path);
    debug!("GET {}", request_url(endpoint.base_url, path, params));

    let response = client
        .get(&url)
        .query(&[("api_key", endpoint.api_key), ("language", endpoint.language)])
        .query(params)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);
        let body = response.text().await.unwrap_or_default();
        let message = if is_json {
            serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.status_message)
        } else {
            None
        };
        debug!("GET {} failed with {}", path, status);
        return Err(CatalogError::Api { status: status.as_u16(), message });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn discover(
    client: &Client,
    endpoint: &Endpoint<'_>,
    kind: MediaKind,
    filters: &DiscoverFilters,
    page: u32,
) -> Result<Page<MediaItem>, CatalogError> {
    let params = discover_params(kind, filters, page);
    let raw: RawPage = get_json(client, endpoint, &discover_path(kind), &params).await?;
    Ok(raw.into_page(kind))
}

pub async fn search(
    client: &Client,
    endpoint: &Endpoint<'_>,
    kind: MediaKind,
    query: &str,
    page: u32,
) -> Result<Page<MediaItem>, CatalogError> {
    // The search endpoint rejects a blank query
    if query.trim().is_empty() {
        return Ok(Page::empty());
    }
    let params = search_params(query, page);
    let raw: RawPage = get_json(client, endpoint, &search_path(kind), &params).await?;
    Ok(raw.into_page(kind))
}

pub async fn details(
    client: &Client,
    endpoint: &Endpoint<'_>,
    kind: MediaKind,
    id: u64,
) -> Result<MediaDetails, CatalogError> {
    let params = vec![("append_to_response", DETAIL_SECTIONS.to_string())];
    let raw: RawDetails = get_json(client, endpoint, &details_path(kind, id), &params).await?;
    Ok(raw.into_details(kind))
}

pub async fn genres(
    client: &Client,
    endpoint: &Endpoint<'_>,
    kind: MediaKind,
) -> Result<Vec<Genre>, CatalogError> {
    let raw: RawGenres = get_json(client, endpoint, &genres_path(kind), &[]).await?;
    Ok(raw.genres)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelscout_models::SortOrder;

    #[test]
    fn test_discover_params_include_all_set_filters() {
        let filters = DiscoverFilters {
            genre: Some(28),
            year: Some(2020),
            min_rating: Some(7.0),
            sort: SortOrder::PopularityDesc,
        };
        let params = discover_params(MediaKind::Movie, &filters, 1);

        assert!(params.contains(&("page", "1".to_string())));
        assert!(params.contains(&("with_genres", "28".to_string())));
        assert!(params.contains(&("primary_release_year", "2020".to_string())));
        assert!(params.contains(&("vote_average.gte", "7".to_string())));
        assert!(params.contains(&("sort_by", "popularity.desc".to_string())));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_discover_params_omit_unset_filters() {
        let filters = DiscoverFilters {
            genre: Some(28),
            ..DiscoverFilters::default()
        };
        let params = discover_params(MediaKind::Movie, &filters, 3);
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();

        assert_eq!(keys, vec!["page", "sort_by", "with_genres"]);
        assert!(!keys.contains(&"primary_release_year"));
        assert!(!keys.contains(&"vote_average.gte"));
    }

    #[test]
    fn test_discover_params_series_year_key() {
        let filters = DiscoverFilters {
            year: Some(2008),
            sort: SortOrder::ReleaseDateDesc,
            ..DiscoverFilters::default()
        };
        let params = discover_params(MediaKind::Series, &filters, 1);
        assert!(params.contains(&("first_air_date_year", "2008".to_string())));
        assert!(params.contains(&("sort_by", "first_air_date.desc".to_string())));
    }

    #[test]
    fn test_request_url_encodes_values() {
        let url = request_url(
            "https://api.themoviedb.org/3/",
            &search_path(MediaKind::Movie),
            &search_params("the matrix", 1),
        );
        assert_eq!(url, "https://api.themoviedb.org/3/search/movie?query=the%20matrix&page=1");
    }

    #[test]
    fn test_paths() {
        assert_eq!(discover_path(MediaKind::Series), "/discover/tv");
        assert_eq!(details_path(MediaKind::Movie, 550), "/movie/550");
        assert_eq!(genres_path(MediaKind::Movie), "/genre/movie/list");
    }

    #[test]
    fn test_series_item_maps_name_and_first_air_date() {
        let raw: RawListItem = serde_json::from_str(
            r#"{"id": 1396, "name": "Breaking Bad", "first_air_date": "2008-01-20", "vote_average": 8.9, "poster_path": ""}"#,
        )
        .unwrap();
        let item = raw.into_media_item(MediaKind::Series);
        assert_eq!(item.title, "Breaking Bad");
        assert_eq!(item.release_date, NaiveDate::from_ymd_opt(2008, 1, 20));
        assert_eq!(item.poster_path, None);
        assert_eq!(item.kind, MediaKind::Series);
    }

    #[test]
    fn test_malformed_date_is_absent() {
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(Some("2020")), None);
        assert_eq!(parse_date(None), None);
    }
}
