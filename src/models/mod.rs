use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

/// Catalog identifier of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Favourites backends hand ids out either as numbers or as numeric strings
impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(MovieId(id)),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map(MovieId)
                .map_err(|_| serde::de::Error::custom(format!("invalid movie id '{}'", text))),
        }
    }
}

/// A genre, person or keyword as the catalog names it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub id: u64,
    pub name: String,
}

/// Metadata for one movie, reduced to what recommendation and display need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub id: MovieId,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    /// Running time in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    pub genres: Vec<NamedEntity>,
    /// Crew credited with the "Director" job
    pub directors: Vec<NamedEntity>,
    /// Acting credits in billing order
    pub cast: Vec<NamedEntity>,
    pub keywords: Vec<NamedEntity>,
}

/// A movie as it appears in catalog result lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl MovieSummary {
    /// Year of `release_date`, when it is a valid `YYYY-MM-DD` date
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|date| date.year())
    }
}

/// Signal categories extracted from favourites, one discovery query each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalCategory {
    Keyword,
    Genre,
    Cast,
    Director,
}

impl Display for SignalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalCategory::Keyword => "keyword",
            SignalCategory::Genre => "genre",
            SignalCategory::Cast => "cast",
            SignalCategory::Director => "director",
        };
        write!(f, "{}", name)
    }
}

/// Filter for a single discovery query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverFilter {
    pub category: SignalCategory,
    pub ids: Vec<u64>,
}

impl DiscoverFilter {
    pub fn new(category: SignalCategory, ids: Vec<u64>) -> Self {
        Self { category, ids }
    }
}

/// Optional filters for movie search
///
/// Without a query they drive a discovery query on their own. With a query they
/// narrow the search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub genre: Option<u64>,
    pub year: Option<i32>,
    pub min_runtime: Option<u32>,
    pub max_runtime: Option<u32>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none()
            && self.year.is_none()
            && self.min_runtime.is_none()
            && self.max_runtime.is_none()
    }

    pub fn has_runtime(&self) -> bool {
        self.min_runtime.is_some() || self.max_runtime.is_some()
    }

    /// Genre and release year checks, applied to search results
    pub fn matches(&self, movie: &MovieSummary) -> bool {
        if let Some(genre) = self.genre {
            if !movie.genre_ids.contains(&genre) {
                return false;
            }
        }
        match self.year {
            Some(year) => movie.release_year() == Some(year),
            None => true,
        }
    }

    /// Runtime bounds check; an unknown runtime is let through
    pub fn runtime_matches(&self, runtime: Option<u32>) -> bool {
        let Some(runtime) = runtime else {
            return true;
        };
        self.min_runtime.map_or(true, |min| runtime >= min)
            && self.max_runtime.map_or(true, |max| runtime <= max)
    }
}

/// Request body for recommendations built from explicit favourites
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub favourite_ids: Vec<MovieId>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub movie_ids: Vec<MovieId>,
    /// True when the static fallback list was served instead
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response of GET /movie/{id}?append_to_response=credits,keywords
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<NamedEntity>,
    #[serde(default)]
    pub credits: TmdbCredits,
    #[serde(default)]
    pub keywords: TmdbKeywords,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbKeywords {
    #[serde(default)]
    pub keywords: Vec<NamedEntity>,
}

impl From<TmdbMovieDetails> for ItemMetadata {
    fn from(details: TmdbMovieDetails) -> Self {
        let directors = details
            .credits
            .crew
            .into_iter()
            .filter(|member| member.job == "Director")
            .map(|member| NamedEntity {
                id: member.id,
                name: member.name,
            })
            .collect();

        // Stable sort keeps response order for entries without a billing position
        let mut cast = details.credits.cast;
        cast.sort_by_key(|member| member.order.unwrap_or(u32::MAX));
        let cast = cast
            .into_iter()
            .map(|member| NamedEntity {
                id: member.id,
                name: member.name,
            })
            .collect();

        ItemMetadata {
            id: MovieId(details.id),
            title: details.title,
            release_date: details.release_date.filter(|d| !d.is_empty()),
            overview: details.overview.filter(|o| !o.is_empty()),
            // TMDB reports 0 when the runtime is unknown
            runtime: details.runtime.filter(|minutes| *minutes > 0),
            genres: details.genres,
            directors,
            cast,
            keywords: details.keywords.keywords,
        }
    }
}

/// Paged list response (discover, search, trending)
#[derive(Debug, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Response of GET /person/{id}?append_to_response=combined_credits
#[derive(Debug, Deserialize)]
pub struct TmdbPersonCredits {
    #[serde(default)]
    pub combined_credits: TmdbCombinedCredits,
}

#[derive(Debug, Default, Deserialize)]
pub struct TmdbCombinedCredits {
    #[serde(default)]
    pub crew: Vec<TmdbPersonCrewCredit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPersonCrewCredit {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
}

impl From<TmdbPersonCrewCredit> for MovieSummary {
    fn from(credit: TmdbPersonCrewCredit) -> Self {
        MovieSummary {
            id: MovieId(credit.id),
            title: credit.title.or(credit.name).unwrap_or_default(),
            release_date: credit.release_date,
            poster_path: credit.poster_path,
            genre_ids: credit.genre_ids,
            popularity: credit.popularity,
            vote_average: credit.vote_average,
            vote_count: credit.vote_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_from_number_and_string() {
        let ids: Vec<MovieId> = serde_json::from_str(r#"[27205, "550", " 680 "]"#).unwrap();
        assert_eq!(ids, vec![MovieId(27205), MovieId(550), MovieId(680)]);
    }

    #[test]
    fn test_movie_id_rejects_garbage() {
        let result: Result<MovieId, _> = serde_json::from_str(r#""tt1375666""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_movie_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&MovieId(238)).unwrap(), "238");
    }

    #[test]
    fn test_movie_details_to_metadata() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "overview": "",
            "runtime": 148,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "credits": {
                "cast": [
                    {"id": 24045, "name": "Joseph Gordon-Levitt", "order": 1},
                    {"id": 6193, "name": "Leonardo DiCaprio", "order": 0}
                ],
                "crew": [
                    {"id": 525, "name": "Christopher Nolan", "job": "Director", "department": "Directing"},
                    {"id": 525, "name": "Christopher Nolan", "job": "Writer", "department": "Writing"},
                    {"id": 947, "name": "Hans Zimmer", "job": "Original Music Composer", "department": "Sound"}
                ]
            },
            "keywords": {"keywords": [{"id": 1566, "name": "dream"}]}
        }"#;

        let details: TmdbMovieDetails = serde_json::from_str(json).unwrap();
        let metadata = ItemMetadata::from(details);

        assert_eq!(metadata.id, MovieId(27205));
        assert_eq!(metadata.title, "Inception");
        assert_eq!(metadata.overview, None);
        assert_eq!(metadata.runtime, Some(148));
        assert_eq!(metadata.genres.len(), 2);
        assert_eq!(metadata.directors.len(), 1);
        assert_eq!(metadata.directors[0].id, 525);
        assert_eq!(metadata.cast[0].name, "Leonardo DiCaprio");
        assert_eq!(metadata.cast[1].name, "Joseph Gordon-Levitt");
        assert_eq!(metadata.keywords[0].name, "dream");
    }

    #[test]
    fn test_movie_details_without_appended_sections() {
        let details: TmdbMovieDetails = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        let metadata = ItemMetadata::from(details);

        assert!(metadata.genres.is_empty());
        assert!(metadata.directors.is_empty());
        assert!(metadata.cast.is_empty());
        assert!(metadata.keywords.is_empty());
    }

    #[test]
    fn test_person_credit_falls_back_to_name() {
        let credit: TmdbPersonCrewCredit = serde_json::from_str(
            r#"{"id": 9, "name": "Some Series", "job": "Director", "media_type": "tv"}"#,
        )
        .unwrap();

        let summary = MovieSummary::from(credit);
        assert_eq!(summary.title, "Some Series");
        assert_eq!(summary.vote_count, 0);
    }

    fn summary(genre_ids: &[u64], release_date: Option<&str>) -> MovieSummary {
        MovieSummary {
            id: MovieId(1),
            title: "Heat".to_string(),
            release_date: release_date.map(str::to_string),
            poster_path: None,
            genre_ids: genre_ids.to_vec(),
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
        }
    }

    #[test]
    fn test_release_year() {
        assert_eq!(summary(&[], Some("1995-12-15")).release_year(), Some(1995));
        assert_eq!(summary(&[], Some("")).release_year(), None);
        assert_eq!(summary(&[], None).release_year(), None);
    }

    #[test]
    fn test_search_filters_match_genre_and_year() {
        let filters = SearchFilters {
            genre: Some(80),
            year: Some(1995),
            ..SearchFilters::default()
        };

        assert!(filters.matches(&summary(&[28, 80], Some("1995-12-15"))));
        assert!(!filters.matches(&summary(&[28], Some("1995-12-15"))));
        assert!(!filters.matches(&summary(&[80], Some("1996-01-01"))));
        assert!(!filters.matches(&summary(&[80], None)));
        assert!(SearchFilters::default().matches(&summary(&[], None)));
    }

    #[test]
    fn test_search_filters_runtime_bounds() {
        let filters = SearchFilters {
            min_runtime: Some(90),
            max_runtime: Some(120),
            ..SearchFilters::default()
        };

        assert!(filters.has_runtime());
        assert!(filters.runtime_matches(Some(90)));
        assert!(filters.runtime_matches(Some(120)));
        assert!(!filters.runtime_matches(Some(89)));
        assert!(!filters.runtime_matches(Some(170)));
        assert!(filters.runtime_matches(None));
        assert!(SearchFilters::default().is_empty());
    }

    #[test]
    fn test_signal_category_display() {
        assert_eq!(SignalCategory::Keyword.to_string(), "keyword");
        assert_eq!(SignalCategory::Director.to_string(), "director");
    }
}
