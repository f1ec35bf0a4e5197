pub mod details;
pub mod filters;
pub mod genre;
pub mod image;
pub mod media;
pub mod page;

pub use details::{CastMember, Credits, CrewMember, MediaDetails, Review, Video};
pub use filters::{DiscoverFilters, SortOrder};
pub use genre::Genre;
pub use image::{image_url, ImageSize};
pub use media::{MediaItem, MediaKind, ParseMediaKindError};
pub use page::Page;
