use crate::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort orders supported by the discover endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PopularityDesc,
    PopularityAsc,
    RatingDesc,
    RatingAsc,
    ReleaseDateDesc,
    ReleaseDateAsc,
    TitleAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 7] = [
        SortOrder::PopularityDesc,
        SortOrder::PopularityAsc,
        SortOrder::RatingDesc,
        SortOrder::RatingAsc,
        SortOrder::ReleaseDateDesc,
        SortOrder::ReleaseDateAsc,
        SortOrder::TitleAsc,
    ];

    /// Wire value for `sort_by`. Date and title fields differ between movies and series.
    pub fn api_key(&self, kind: MediaKind) -> &'static str {
        match (self, kind) {
            (SortOrder::PopularityDesc, _) => "popularity.desc",
            (SortOrder::PopularityAsc, _) => "popularity.asc",
            (SortOrder::RatingDesc, _) => "vote_average.desc",
            (SortOrder::RatingAsc, _) => "vote_average.asc",
            (SortOrder::ReleaseDateDesc, MediaKind::Movie) => "primary_release_date.desc",
            (SortOrder::ReleaseDateDesc, MediaKind::Series) => "first_air_date.desc",
            (SortOrder::ReleaseDateAsc, MediaKind::Movie) => "primary_release_date.asc",
            (SortOrder::ReleaseDateAsc, MediaKind::Series) => "first_air_date.asc",
            (SortOrder::TitleAsc, MediaKind::Movie) => "original_title.asc",
            (SortOrder::TitleAsc, MediaKind::Series) => "name.asc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Movie keys are the canonical spelling users type on the command line
        write!(f, "{}", self.api_key(MediaKind::Movie))
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        for order in SortOrder::ALL {
            if order.api_key(MediaKind::Movie) == normalized
                || order.api_key(MediaKind::Series) == normalized
            {
                return Ok(order);
            }
        }
        match normalized.as_str() {
            "popular" | "popularity" => Ok(SortOrder::PopularityDesc),
            "rating" | "top-rated" => Ok(SortOrder::RatingDesc),
            "newest" => Ok(SortOrder::ReleaseDateDesc),
            "oldest" => Ok(SortOrder::ReleaseDateAsc),
            "title" => Ok(SortOrder::TitleAsc),
            _ => Err(format!(
                "Invalid sort order: {}. Use e.g. 'popularity.desc', 'vote_average.desc' or 'newest'",
                s
            )),
        }
    }
}

/// Filter selection for the discover endpoint. `None` means "not set" and is
/// left out of the request entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscoverFilters {
    pub genre: Option<u32>,
    pub year: Option<i32>,
    pub min_rating: Option<f32>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl DiscoverFilters {
    pub fn is_default(&self) -> bool {
        self == &DiscoverFilters::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_popularity_desc() {
        assert_eq!(SortOrder::default(), SortOrder::PopularityDesc);
        assert_eq!(DiscoverFilters::default().sort.api_key(MediaKind::Movie), "popularity.desc");
    }

    #[test]
    fn test_sort_key_depends_on_kind() {
        assert_eq!(SortOrder::ReleaseDateDesc.api_key(MediaKind::Movie), "primary_release_date.desc");
        assert_eq!(SortOrder::ReleaseDateDesc.api_key(MediaKind::Series), "first_air_date.desc");
        assert_eq!(SortOrder::TitleAsc.api_key(MediaKind::Series), "name.asc");
    }

    #[test]
    fn test_sort_from_str() {
        assert_eq!("vote_average.desc".parse::<SortOrder>().unwrap(), SortOrder::RatingDesc);
        assert_eq!("first_air_date.asc".parse::<SortOrder>().unwrap(), SortOrder::ReleaseDateAsc);
        assert_eq!("newest".parse::<SortOrder>().unwrap(), SortOrder::ReleaseDateDesc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
