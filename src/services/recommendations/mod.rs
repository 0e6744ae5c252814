use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::{
    cache::MetadataCache,
    models::{ItemMetadata, MovieId},
    services::catalog::CatalogProvider,
};

pub mod candidates;
pub mod merge;
pub mod signals;

pub use candidates::{fetch_candidates, CandidatePools};
pub use merge::merge;
pub use signals::{extract_signals, SignalTallies, TopSignals};

/// Tunables for favourite-driven recommendations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Favourites, taken from the front of the list, whose metadata is inspected
    pub sample_size: usize,
    /// Maximum number of ids returned
    pub result_cap: usize,
    /// Billed cast members counted per movie
    pub cast_depth: usize,
    pub top_genres: usize,
    pub top_directors: usize,
    pub top_cast: usize,
    pub top_keywords: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            sample_size: 10,
            result_cap: 10,
            cast_depth: 5,
            top_genres: 3,
            top_directors: 2,
            top_cast: 3,
            top_keywords: 2,
        }
    }
}

/// Builds recommendations from a user's favourite movies
///
/// 1. Fetch metadata for the first `sample_size` favourites (through the cache)
/// 2. Tally genres, directors, top-billed cast and keywords
/// 3. Discover popular movies for the strongest signals of each category
/// 4. Merge: keyword candidates alone if any, else genre, cast, director in that order
///
/// Network failures never escape; they shrink the input of the next step instead.
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<dyn CatalogProvider>,
    cache: MetadataCache,
    settings: RecommendationSettings,
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        cache: MetadataCache,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            catalog,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &RecommendationSettings {
        &self.settings
    }

    /// Recommended movie ids, never containing a favourite or a duplicate
    ///
    /// An empty result means no recommendation could be built; substituting a
    /// default list is left to the caller.
    pub async fn recommend(&self, favourites: &[MovieId]) -> Vec<MovieId> {
        let sample = &favourites[..favourites.len().min(self.settings.sample_size)];
        let items = self.sample_metadata(sample).await;

        let tallies = extract_signals(&items, self.settings.cast_depth);
        if tallies.is_empty() {
            tracing::info!(
                favourites = favourites.len(),
                sampled = items.len(),
                "No signals found in favourites, skipping discovery"
            );
            return vec![];
        }

        let top = tallies.top_signals(&self.settings);
        tracing::debug!(?top, "Selected top signals");

        let pools = fetch_candidates(self.catalog.as_ref(), &top).await;

        let exclude: HashSet<MovieId> = favourites.iter().copied().collect();
        let recommendations = merge(&pools, &exclude, self.settings.result_cap);

        tracing::info!(
            favourites = favourites.len(),
            sampled = items.len(),
            keyword_candidates = pools.by_keyword.len(),
            genre_candidates = pools.by_genre.len(),
            cast_candidates = pools.by_cast.len(),
            director_candidates = pools.by_director.len(),
            recommendations = recommendations.len(),
            "Recommendations built"
        );

        recommendations
    }

    /// Metadata for one movie, served from the cache when possible
    pub async fn metadata(&self, id: MovieId) -> crate::error::AppResult<ItemMetadata> {
        let catalog = self.catalog.clone();
        self.cache
            .get_or_fetch(id, || async move { catalog.fetch_metadata(id).await })
            .await
    }

    /// Fetches all sampled favourites concurrently, keeping input order and
    /// dropping the ones that failed
    async fn sample_metadata(&self, sample: &[MovieId]) -> Vec<ItemMetadata> {
        let results = join_all(sample.iter().map(|id| self.metadata(*id))).await;

        sample
            .iter()
            .zip(results)
            .filter_map(|(id, result)| match result {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::warn!(
                        movie_id = %id,
                        error = %e,
                        provider = self.catalog.name(),
                        "Metadata fetch failed, skipping favourite"
                    );
                    None
                }
            })
            .collect()
    }
}
