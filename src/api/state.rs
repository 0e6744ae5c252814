use std::sync::Arc;

use crate::{
    cache::MetadataCache,
    config::Config,
    models::MovieId,
    services::{
        CatalogProvider, FavouritesStore, HttpFavouritesStore, RecommendationSettings,
        Recommender, TmdbProvider,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub favourites: Arc<dyn FavouritesStore>,
    pub recommender: Recommender,
    /// Served when no recommendation could be built
    pub fallback_ids: Arc<Vec<MovieId>>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        favourites: Arc<dyn FavouritesStore>,
        settings: RecommendationSettings,
        fallback_ids: Vec<MovieId>,
    ) -> Self {
        let recommender = Recommender::new(catalog.clone(), MetadataCache::new(), settings);

        Self {
            catalog,
            favourites,
            recommender,
            fallback_ids: Arc::new(fallback_ids),
        }
    }

    /// Wires the TMDB catalog and the favourites backend from configuration
    pub fn from_config(config: &Config) -> Self {
        let catalog = TmdbProvider::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_language.clone(),
        );
        let favourites = HttpFavouritesStore::new(config.favourites_api_url.clone());

        Self::new(
            Arc::new(catalog),
            Arc::new(favourites),
            config.recommendation_settings(),
            config.fallback_ids(),
        )
    }
}
