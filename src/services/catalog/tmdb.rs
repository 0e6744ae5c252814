/// TMDB catalog provider
///
/// API Flow:
/// 1. Metadata: /movie/{id}?append_to_response=credits,keywords
/// 2. Discovery: /discover/movie filtered on one of genres, keywords, cast or crew,
///    or on genre, release year and runtime for filtered browsing
/// 3. Search: /search/movie, /trending/movie/week
/// 4. Filmography: /person/{id}?append_to_response=combined_credits
use crate::{
    error::{AppError, AppResult},
    models::{
        DiscoverFilter, ItemMetadata, MovieId, MovieSummary, SearchFilters, SignalCategory,
        TmdbMovieDetails, TmdbPage, TmdbPersonCredits, TmdbPersonCrewCredit,
    },
    services::catalog::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashSet;

const SEARCH_LIMIT: usize = 20;
const MIN_DIRECTED_VOTES: u64 = 50;
const DIRECTED_LIMIT: usize = 10;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
        }
    }

    /// Issues a GET against the catalog and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    /// GET discover/movie, most popular first, first page only
    async fn discover_page(
        &self,
        filter_params: Vec<(&str, String)>,
    ) -> AppResult<Vec<MovieSummary>> {
        let mut params = vec![
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "false".to_string()),
            ("include_video", "false".to_string()),
            ("page", "1".to_string()),
        ];
        params.extend(filter_params);

        let page: TmdbPage<MovieSummary> = self.get_json("discover/movie", &params).await?;
        Ok(page.results)
    }

    /// Query parameters for filtered browsing; unset filters are left out
    fn search_filter_params(filters: &SearchFilters) -> Vec<(&'static str, String)> {
        [
            ("with_genres", filters.genre.map(|g| g.to_string())),
            ("primary_release_year", filters.year.map(|y| y.to_string())),
            ("with_runtime.gte", filters.min_runtime.map(|m| m.to_string())),
            ("with_runtime.lte", filters.max_runtime.map(|m| m.to_string())),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }

    /// Query parameter for a discovery filter
    ///
    /// Genres are comma-joined (all must match); keywords, cast and crew are
    /// pipe-joined (any may match).
    fn discover_param(filter: &DiscoverFilter) -> (&'static str, String) {
        let join = |separator: &str| {
            filter
                .ids
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(separator)
        };

        match filter.category {
            SignalCategory::Genre => ("with_genres", join(",")),
            SignalCategory::Keyword => ("with_keywords", join("|")),
            SignalCategory::Cast => ("with_cast", join("|")),
            SignalCategory::Director => ("with_crew", join("|")),
        }
    }

    /// Keeps well-voted movie director credits, best rated first
    fn rank_directed(credits: Vec<TmdbPersonCrewCredit>) -> Vec<MovieSummary> {
        let mut seen = HashSet::new();
        let mut movies: Vec<MovieSummary> = credits
            .into_iter()
            .filter(|c| c.job == "Director" || c.department == "Directing")
            .filter(|c| c.media_type.as_deref().map_or(true, |t| t == "movie"))
            .filter(|c| c.vote_count >= MIN_DIRECTED_VOTES)
            .filter(|c| seen.insert(c.id))
            .map(MovieSummary::from)
            .collect();

        movies.sort_by(|a, b| {
            b.vote_average
                .total_cmp(&a.vote_average)
                .then(b.vote_count.cmp(&a.vote_count))
                .then(b.popularity.total_cmp(&a.popularity))
        });
        movies.truncate(DIRECTED_LIMIT);
        movies
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_metadata(&self, id: MovieId) -> AppResult<ItemMetadata> {
        let details: TmdbMovieDetails = self
            .get_json(
                &format!("movie/{}", id),
                &[("append_to_response", "credits,keywords".to_string())],
            )
            .await?;

        let metadata = ItemMetadata::from(details);

        tracing::debug!(
            movie_id = %id,
            genres = metadata.genres.len(),
            directors = metadata.directors.len(),
            cast = metadata.cast.len(),
            keywords = metadata.keywords.len(),
            provider = "tmdb",
            "Metadata fetched"
        );

        Ok(metadata)
    }

    async fn discover(&self, filter: &DiscoverFilter) -> AppResult<Vec<MovieSummary>> {
        if filter.ids.is_empty() {
            return Ok(vec![]);
        }

        let results = self.discover_page(vec![Self::discover_param(filter)]).await?;

        tracing::info!(
            category = %filter.category,
            filter_ids = ?filter.ids,
            results = results.len(),
            provider = "tmdb",
            "Discovery query completed"
        );

        Ok(results)
    }

    async fn discover_movies(&self, filters: &SearchFilters) -> AppResult<Vec<MovieSummary>> {
        let mut results = self
            .discover_page(Self::search_filter_params(filters))
            .await?;
        results.truncate(SEARCH_LIMIT);

        tracing::info!(
            ?filters,
            results = results.len(),
            provider = "tmdb",
            "Filtered discovery completed"
        );

        Ok(results)
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page: TmdbPage<MovieSummary> = self
            .get_json(
                "search/movie",
                &[
                    ("query", query.trim().to_string()),
                    ("include_adult", "false".to_string()),
                    ("page", "1".to_string()),
                ],
            )
            .await?;

        let mut results = page.results;
        results.truncate(SEARCH_LIMIT);

        tracing::info!(
            query = %query,
            results = results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(results)
    }

    async fn trending_movies(&self) -> AppResult<Vec<MovieSummary>> {
        let page: TmdbPage<MovieSummary> = self.get_json("trending/movie/week", &[]).await?;
        let mut results = page.results;
        results.truncate(SEARCH_LIMIT);
        Ok(results)
    }

    async fn directed_movies(&self, person_id: u64) -> AppResult<Vec<MovieSummary>> {
        let person: TmdbPersonCredits = self
            .get_json(
                &format!("person/{}", person_id),
                &[("append_to_response", "combined_credits".to_string())],
            )
            .await?;

        Ok(Self::rank_directed(person.combined_credits.crew))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
