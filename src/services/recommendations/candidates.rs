use crate::{
    models::{DiscoverFilter, MovieId, SignalCategory},
    services::catalog::CatalogProvider,
};

use super::signals::TopSignals;

/// Discovery results per signal category, in the order the catalog returned them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePools {
    pub by_keyword: Vec<MovieId>,
    pub by_genre: Vec<MovieId>,
    pub by_cast: Vec<MovieId>,
    pub by_director: Vec<MovieId>,
}

impl CandidatePools {
    pub fn get(&self, category: SignalCategory) -> &[MovieId] {
        match category {
            SignalCategory::Keyword => &self.by_keyword,
            SignalCategory::Genre => &self.by_genre,
            SignalCategory::Cast => &self.by_cast,
            SignalCategory::Director => &self.by_director,
        }
    }
}

/// Runs the four discovery queries concurrently and waits for all of them
///
/// A category with no top signals is not queried. A failed query leaves only its
/// own pool empty.
pub async fn fetch_candidates(catalog: &dyn CatalogProvider, top: &TopSignals) -> CandidatePools {
    let (by_keyword, by_genre, by_cast, by_director) = tokio::join!(
        discover_or_empty(catalog, SignalCategory::Keyword, top),
        discover_or_empty(catalog, SignalCategory::Genre, top),
        discover_or_empty(catalog, SignalCategory::Cast, top),
        discover_or_empty(catalog, SignalCategory::Director, top),
    );

    CandidatePools {
        by_keyword,
        by_genre,
        by_cast,
        by_director,
    }
}

async fn discover_or_empty(
    catalog: &dyn CatalogProvider,
    category: SignalCategory,
    top: &TopSignals,
) -> Vec<MovieId> {
    let ids = top.ids(category);
    if ids.is_empty() {
        return vec![];
    }

    let filter = DiscoverFilter::new(category, ids.to_vec());
    match catalog.discover(&filter).await {
        Ok(movies) => movies.into_iter().map(|movie| movie.id).collect(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                category = %category,
                provider = catalog.name(),
                "Discovery query failed, dropping category"
            );
            vec![]
        }
    }
}
