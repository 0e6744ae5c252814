use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::MovieId,
};

/// Source of a user's favourite movies
#[async_trait::async_trait]
pub trait FavouritesStore: Send + Sync {
    /// Favourite movie ids in the order the store keeps them
    async fn favourite_ids(&self, token: &str) -> AppResult<Vec<MovieId>>;
}

/// Favourites kept by the account backend, read with the user's bearer token
#[derive(Clone)]
pub struct HttpFavouritesStore {
    http_client: HttpClient,
    api_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FavouritesBody {
    List(Vec<serde_json::Value>),
    Paged { results: Vec<serde_json::Value> },
}

#[derive(Deserialize)]
struct FavouriteEntry {
    movie_id: MovieId,
}

impl HttpFavouritesStore {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Extracts movie ids from either a bare list or a paginated body
    fn parse_ids(body: FavouritesBody) -> Vec<MovieId> {
        let entries = match body {
            FavouritesBody::List(entries) => entries,
            FavouritesBody::Paged { results } => results,
        };

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<FavouriteEntry>(entry) {
                Ok(favourite) => Some(favourite.movie_id),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping favourite with unusable movie id");
                    None
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl FavouritesStore for HttpFavouritesStore {
    async fn favourite_ids(&self, token: &str) -> AppResult<Vec<MovieId>> {
        let url = format!("{}/favourites/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized(
                "Favourites backend rejected the token".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Favourites API returned status {}: {}",
                status, body
            )));
        }

        let body: FavouritesBody = response.json().await?;
        let ids = Self::parse_ids(body);

        tracing::debug!(favourites = ids.len(), "Favourites loaded");

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_reads_plain_list_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/favourites/"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "movie_id": 550},
                {"id": 2, "movie_id": "27205"},
                {"id": 3, "movie_id": "not-a-number"},
                {"id": 4, "movie_id": 238}
            ])))
            .mount(&server)
            .await;

        let store = HttpFavouritesStore::new(format!("{}/api/", server.uri()));
        let ids = store.favourite_ids("token-123").await.unwrap();

        assert_eq!(ids, vec![MovieId(550), MovieId(27205), MovieId(238)]);
    }

    #[tokio::test]
    async fn test_reads_paginated_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/favourites/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [{"movie_id": 680}]
            })))
            .mount(&server)
            .await;

        let store = HttpFavouritesStore::new(format!("{}/api", server.uri()));
        assert_eq!(store.favourite_ids("t").await.unwrap(), vec![MovieId(680)]);
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/favourites/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = HttpFavouritesStore::new(format!("{}/api", server.uri()));
        let result = store.favourite_ids("expired").await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/favourites/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = HttpFavouritesStore::new(format!("{}/api", server.uri()));
        let result = store.favourite_ids("t").await;

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
