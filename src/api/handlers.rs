use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        ItemMetadata, MovieId, MovieSummary, RecommendationRequest, RecommendationResponse,
        SearchFilters,
    },
    services::title_search,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    genre: Option<u64>,
    year: Option<i32>,
    min_runtime: Option<u32>,
    max_runtime: Option<u32>,
}

impl SearchQuery {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            genre: self.genre,
            year: self.year,
            min_runtime: self.min_runtime,
            max_runtime: self.max_runtime,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommendations for an explicit list of favourites
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> Json<RecommendationResponse> {
    tracing::info!(
        request_id = %request_id,
        favourites = request.favourite_ids.len(),
        "Processing recommendation request"
    );

    Json(build_response(&state, &request.favourite_ids).await)
}

/// Recommendations for the signed-in user, favourites read from the account backend
pub async fn recommend_for_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> AppResult<Json<RecommendationResponse>> {
    let token = bearer_token(&headers)?;
    let favourites = state.favourites.favourite_ids(token).await?;

    tracing::info!(
        request_id = %request_id,
        favourites = favourites.len(),
        "Processing recommendation request for user"
    );

    Ok(Json(build_response(&state, &favourites).await))
}

/// Movie search with optional genre, year and runtime filters; trending movies
/// when neither a query nor a filter is given
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let filters = params.filters();
    let movies =
        title_search::search_titles(state.catalog.clone(), params.q.as_deref(), &filters).await?;
    Ok(Json(movies))
}

/// Metadata for one movie
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<ItemMetadata>> {
    let metadata = state.recommender.metadata(MovieId(id)).await?;
    Ok(Json(metadata))
}

/// Top-rated movies directed by a person
pub async fn director_movies(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Vec<MovieSummary>>> {
    let movies = title_search::directed_movies(state.catalog.clone(), id).await?;
    Ok(Json(movies))
}

/// Runs the recommender and substitutes the static list when it comes back empty
async fn build_response(state: &AppState, favourites: &[MovieId]) -> RecommendationResponse {
    let movie_ids = state.recommender.recommend(favourites).await;
    if !movie_ids.is_empty() {
        return RecommendationResponse {
            movie_ids,
            fallback: false,
            generated_at: Utc::now(),
        };
    }

    let exclude: HashSet<&MovieId> = favourites.iter().collect();
    let movie_ids = state
        .fallback_ids
        .iter()
        .filter(|id| !exclude.contains(id))
        .take(state.recommender.settings().result_cap)
        .copied()
        .collect();

    tracing::info!("Serving fallback recommendations");

    RecommendationResponse {
        movie_ids,
        fallback: true,
        generated_at: Utc::now(),
    }
}

fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}
