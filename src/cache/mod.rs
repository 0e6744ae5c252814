pub mod metadata;

pub use metadata::MetadataCache;
