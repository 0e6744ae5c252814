pub mod catalog;
pub mod favourites;
pub mod recommendations;
pub mod title_search;

pub use catalog::{CatalogProvider, TmdbProvider};
pub use favourites::{FavouritesStore, HttpFavouritesStore};
pub use recommendations::{RecommendationSettings, Recommender};
