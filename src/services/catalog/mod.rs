/// Movie catalog abstraction
///
/// The recommendation core and the HTTP handlers only talk to the catalog through
/// this trait, so the TMDB client can be swapped for a fake in tests or for another
/// catalog later.
use crate::{
    error::AppResult,
    models::{DiscoverFilter, ItemMetadata, MovieId, MovieSummary, SearchFilters},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for third-party movie catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch genres, credits and keywords for one movie
    async fn fetch_metadata(&self, id: MovieId) -> AppResult<ItemMetadata>;

    /// Run a discovery query filtered on a single signal category
    ///
    /// Results are sorted by descending popularity and limited to the first page.
    async fn discover(&self, filter: &DiscoverFilter) -> AppResult<Vec<MovieSummary>>;

    /// Popular movies matching genre, release year and runtime filters
    async fn discover_movies(&self, filters: &SearchFilters) -> AppResult<Vec<MovieSummary>>;

    /// Search movies by title
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>>;

    /// Movies trending this week
    async fn trending_movies(&self) -> AppResult<Vec<MovieSummary>>;

    /// Best-rated movies directed by a person
    async fn directed_movies(&self, person_id: u64) -> AppResult<Vec<MovieSummary>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
