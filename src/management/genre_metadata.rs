use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::time::sleep;

use crate::{
    info,
    llm::{CompletionModel, LlmError, MUSIC_ANALYST_PROMPT, ObjectRequest},
    params::schema,
    types::GenreMetadata,
    warning,
};

pub const DEFAULT_GENRE_METADATA_FILE: &str = "genre-metadata.json";

#[derive(Debug)]
pub enum CacheError {
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::IoError(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerdeError(err)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::IoError(e) => write!(f, "{}", e),
            CacheError::SerdeError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Flat JSON file of generated genre metadata, keyed by genre name.
///
/// The file is a best-effort cache: it is rewritten as a whole and carries no
/// schema version.
pub struct GenreMetadataManager {
    path: PathBuf,
    entries: Vec<GenreMetadata>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub reused: usize,
    pub generated: usize,
    pub failed: Vec<String>,
}

impl GenreMetadataManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let content = async_fs::read_to_string(&path).await?;
        let entries: Vec<GenreMetadata> = serde_json::from_str(&content)?;
        Ok(Self { path, entries })
    }

    /// Loads the file, falling back to an empty cache when it is missing or
    /// unreadable.
    pub async fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path).await {
            Ok(manager) => manager,
            Err(e) => {
                warning!(
                    "Cannot load genre metadata from {}: {}",
                    path.display(),
                    e
                );
                Self::new(path)
            }
        }
    }

    pub async fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn find(&self, genre: &str) -> Option<&GenreMetadata> {
        self.entries.iter().find(|m| m.genre == genre)
    }

    pub fn entries(&self) -> &[GenreMetadata] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Rebuilds the cache for `genres`, in catalog order.
    ///
    /// Existing entries are reused as they are; missing ones are generated
    /// one at a time with `delay` between requests. Genres that fail to
    /// generate are left out and listed in the report. Entries for genres not
    /// in `genres` are dropped.
    pub async fn refresh<L, S>(&mut self, llm: &L, genres: &[S], delay: Duration) -> GenerationReport
    where
        L: CompletionModel,
        S: AsRef<str>,
    {
        let mut report = GenerationReport::default();
        let mut refreshed = Vec::with_capacity(genres.len());

        for genre in genres {
            let genre = genre.as_ref();

            if let Some(existing) = self.find(genre) {
                refreshed.push(existing.clone());
                report.reused += 1;
                continue;
            }

            info!("Generating metadata for genre: {}", genre);

            match generate_one(llm, genre).await {
                Ok(metadata) => {
                    refreshed.push(metadata);
                    report.generated += 1;
                }
                Err(e) => {
                    warning!("Error generating metadata for genre {}: {}", genre, e);
                    report.failed.push(genre.to_string());
                }
            }

            if !delay.is_zero() {
                sleep(delay).await;
            }
        }

        self.entries = refreshed;
        report
    }
}

#[derive(Debug)]
enum GenerateError {
    Llm(LlmError),
    Schema(serde_json::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Llm(e) => write!(f, "{}", e),
            GenerateError::Schema(e) => write!(f, "response does not match the schema: {}", e),
        }
    }
}

async fn generate_one<L: CompletionModel>(
    llm: &L,
    genre: &str,
) -> Result<GenreMetadata, GenerateError> {
    let request = ObjectRequest {
        schema_name: schema::GENRE_METADATA_SCHEMA,
        schema: schema::genre_metadata(),
        system: MUSIC_ANALYST_PROMPT,
        prompt: format!("Generate metadata for the genre \"{}\"", genre),
    };

    let value = llm
        .generate_object(request)
        .await
        .map_err(GenerateError::Llm)?;
    let mut metadata: GenreMetadata =
        serde_json::from_value(value).map_err(GenerateError::Schema)?;

    // keyed by catalog name regardless of how the model spelled it
    metadata.genre = genre.to_string();
    Ok(metadata)
}
