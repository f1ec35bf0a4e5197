use crate::genre::Genre;
use crate::media::{MediaItem, MediaKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetails {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f32>,
    pub vote_count: u32,
    /// Movie runtime in minutes.
    pub runtime: Option<u32>,
    /// Series episode run times in minutes.
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub imdb_id: Option<String>,
    pub homepage: Option<String>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub similar: Vec<MediaItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub name: String,
    pub job: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub author: String,
    pub content: String,
    pub url: Option<String>,
}

impl MediaDetails {
    pub fn director(&self) -> Option<&str> {
        self.credits
            .crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name.as_str())
    }

    pub fn top_cast(&self, n: usize) -> Vec<&str> {
        self.credits.cast.iter().take(n).map(|c| c.name.as_str()).collect()
    }

    /// First YouTube trailer, if the catalog lists one.
    pub fn trailer_url(&self) -> Option<String> {
        self.videos
            .iter()
            .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
    }

    pub fn imdb_url(&self) -> Option<String> {
        self.imdb_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("https://www.imdb.com/title/{}/", id))
    }

    pub fn runtime_label(&self) -> String {
        match self.kind {
            MediaKind::Movie => match self.runtime {
                Some(minutes) if minutes > 0 => format!("{}h {}m", minutes / 60, minutes % 60),
                _ => "N/A".to_string(),
            },
            MediaKind::Series => match self.episode_run_time.first() {
                Some(minutes) => format!("{}m/episode", minutes),
                None => "N/A".to_string(),
            },
        }
    }

    pub fn genre_names(&self) -> String {
        if self.genres.is_empty() {
            return "N/A".to_string();
        }
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
