pub mod auth;
pub mod debounce;
pub mod detail;
pub mod feed;
pub mod generation;
pub mod query;
pub mod sentinel;

#[cfg(test)]
mod testing;

pub use auth::{AuthState, Session};
pub use debounce::Debouncer;
pub use detail::{DetailController, DetailView};
pub use feed::{FeedController, FeedSettings, FeedView};
pub use generation::GenerationCounter;
pub use query::{FeedMode, FilterChange, QueryState};
pub use sentinel::ScrollSentinel;
