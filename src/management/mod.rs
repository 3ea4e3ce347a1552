mod genre_metadata;

pub use genre_metadata::CacheError;
pub use genre_metadata::DEFAULT_GENRE_METADATA_FILE;
pub use genre_metadata::GenerationReport;
pub use genre_metadata::GenreMetadataManager;
