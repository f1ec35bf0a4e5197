use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single title as shown in a list or a suggestion dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: f32,
    pub kind: MediaKind,
    #[serde(default)]
    pub overview: String,
}

impl MediaItem {
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.release_date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment the catalog API uses for this kind.
    pub fn api_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }

    /// Plural label used in headings ("Popular Movies").
    pub fn plural_label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movies",
            MediaKind::Series => "TV Series",
        }
    }

    pub fn lowercase_label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Series => "TV series",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMediaKindError(pub String);

impl fmt::Display for ParseMediaKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown media kind '{}' (expected movie or series)", self.0)
    }
}

impl std::error::Error for ParseMediaKindError {}

impl FromStr for MediaKind {
    type Err = ParseMediaKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaKind::Movie),
            "series" | "tv" | "show" | "shows" => Ok(MediaKind::Series),
            other => Err(ParseMediaKindError(other.to_string())),
        }
    }
}
