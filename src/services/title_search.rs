use crate::{
    error::{AppError, AppResult},
    models::{MovieSummary, SearchFilters},
    services::catalog::CatalogProvider,
};
use futures::future::join_all;
use std::sync::Arc;

/// Service function for movie search
///
/// - With a query: title search, narrowed by genre and release year. Runtime
///   bounds need each result's details, so they cost one lookup per result.
/// - Without a query but with filters: a popularity-ordered discovery query.
/// - With neither: this week's trending movies rather than an empty page.
pub async fn search_titles(
    provider: Arc<dyn CatalogProvider>,
    query: Option<&str>,
    filters: &SearchFilters,
) -> AppResult<Vec<MovieSummary>> {
    if let (Some(min), Some(max)) = (filters.min_runtime, filters.max_runtime) {
        if min > max {
            return Err(AppError::InvalidInput(format!(
                "min_runtime {} is greater than max_runtime {}",
                min, max
            )));
        }
    }

    match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => {
            let mut movies = provider.search_movies(query).await?;
            movies.retain(|movie| filters.matches(movie));
            if filters.has_runtime() {
                movies = filter_by_runtime(provider.as_ref(), movies, filters).await;
            }
            Ok(movies)
        }
        None if !filters.is_empty() => provider.discover_movies(filters).await,
        None => provider.trending_movies().await,
    }
}

/// Keeps movies within the runtime bounds. A movie whose details cannot be
/// loaded stays in the list.
async fn filter_by_runtime(
    provider: &dyn CatalogProvider,
    movies: Vec<MovieSummary>,
    filters: &SearchFilters,
) -> Vec<MovieSummary> {
    let runtimes = join_all(movies.iter().map(|movie| provider.fetch_metadata(movie.id))).await;

    movies
        .into_iter()
        .zip(runtimes)
        .filter(|(movie, details)| match details {
            Ok(details) => filters.runtime_matches(details.runtime),
            Err(e) => {
                tracing::warn!(
                    movie_id = %movie.id,
                    error = %e,
                    provider = provider.name(),
                    "Runtime lookup failed, keeping search result"
                );
                true
            }
        })
        .map(|(movie, _)| movie)
        .collect()
}

/// Best-rated movies directed by `person_id`
pub async fn directed_movies(
    provider: Arc<dyn CatalogProvider>,
    person_id: u64,
) -> AppResult<Vec<MovieSummary>> {
    provider.directed_movies(person_id).await
}
