use serde::Deserialize;

use crate::{models::MovieId, services::recommendations::RecommendationSettings};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language requested from TMDB
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Base URL of the backend that stores user favourites
    #[serde(default = "default_favourites_api_url")]
    pub favourites_api_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_sample_size")]
    pub recs_sample_size: usize,

    #[serde(default = "default_result_cap")]
    pub recs_result_cap: usize,

    #[serde(default = "default_cast_depth")]
    pub recs_cast_depth: usize,

    #[serde(default = "default_top_genres")]
    pub recs_top_genres: usize,

    #[serde(default = "default_top_directors")]
    pub recs_top_directors: usize,

    #[serde(default = "default_top_cast")]
    pub recs_top_cast: usize,

    #[serde(default = "default_top_keywords")]
    pub recs_top_keywords: usize,

    /// Static list served when no recommendation could be built
    #[serde(default = "default_fallback_ids")]
    pub recs_fallback_ids: Vec<u64>,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_favourites_api_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_sample_size() -> usize {
    RecommendationSettings::default().sample_size
}

fn default_result_cap() -> usize {
    RecommendationSettings::default().result_cap
}

fn default_cast_depth() -> usize {
    RecommendationSettings::default().cast_depth
}

fn default_top_genres() -> usize {
    RecommendationSettings::default().top_genres
}

fn default_top_directors() -> usize {
    RecommendationSettings::default().top_directors
}

fn default_top_cast() -> usize {
    RecommendationSettings::default().top_cast
}

fn default_top_keywords() -> usize {
    RecommendationSettings::default().top_keywords
}

fn default_fallback_ids() -> Vec<u64> {
    vec![238, 550, 680, 155, 424]
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Recommendation tunables taken from the `RECS_*` variables
    pub fn recommendation_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            sample_size: self.recs_sample_size,
            result_cap: self.recs_result_cap,
            cast_depth: self.recs_cast_depth,
            top_genres: self.recs_top_genres,
            top_directors: self.recs_top_directors,
            top_cast: self.recs_top_cast,
            top_keywords: self.recs_top_keywords,
        }
    }

    pub fn fallback_ids(&self) -> Vec<MovieId> {
        self.recs_fallback_ids.iter().copied().map(MovieId).collect()
    }
}
